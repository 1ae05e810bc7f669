//! Raw observation to fixed-shape feature vector.
//!
//! Pure arithmetic apart from the lag features: no real lag history is
//! available at inference time, so the lag columns are synthesized from the
//! current bar with bounded multiplicative jitter drawn from the injected RNG.

use crate::domain::market::observation::MarketObservation;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FeatureVector};
use rand::Rng;

/// Max relative jitter applied to lagged open/close prices.
pub const PRICE_LAG_JITTER: f64 = 0.01;
/// Max relative jitter applied to lagged volume.
pub const VOLUME_LAG_JITTER: f64 = 0.05;
pub const LAG_DEPTH: usize = 3;

pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derives the full feature vector in `FEATURE_NAMES` order.
    ///
    /// Never fails; open-denominator ratios are 0 when `open == 0` and the
    /// high/low ratio is 1 when `low == 0`.
    pub fn derive<R: Rng + ?Sized>(obs: &MarketObservation, rng: &mut R) -> FeatureVector {
        let price_change = obs.close - obs.open;
        let range = obs.range();
        let range_pct = ratio_or(range, obs.open, 0.0);
        let volume_price_ratio = ratio_or(obs.volume, obs.open, 0.0);

        let sentiment = obs.sentiment;
        let direction = if sentiment > 0.0 {
            1.0
        } else if sentiment < 0.0 {
            -1.0
        } else {
            0.0
        };

        let mut values = [0.0; FEATURE_COUNT];
        let head = [
            obs.open,
            obs.high,
            obs.low,
            obs.close,
            obs.volume,
            price_change,
            range,
            range_pct,
            volume_price_ratio,
            sentiment,
            sentiment.abs(),
            direction,
            sentiment * range_pct,
        ];
        values[..head.len()].copy_from_slice(&head);

        let mut idx = head.len();
        for _ in 0..LAG_DEPTH {
            values[idx] = jitter(obs.close, PRICE_LAG_JITTER, rng);
            values[idx + 1] = jitter(obs.open, PRICE_LAG_JITTER, rng);
            values[idx + 2] = jitter(obs.volume, VOLUME_LAG_JITTER, rng);
            values[idx + 3] = sentiment;
            idx += 4;
        }

        values[idx] = ratio_or(price_change, obs.open, 0.0);
        values[idx + 1] = range_pct;
        values[idx + 2] = ratio_or(obs.high, obs.low, 1.0);

        FeatureVector::from_values(values)
    }
}

/// `num / den`, or `default` when the denominator is exactly zero.
pub(crate) fn ratio_or(num: f64, den: f64, default: f64) -> f64 {
    if den == 0.0 { default } else { num / den }
}

fn jitter<R: Rng + ?Sized>(value: f64, bound: f64, rng: &mut R) -> f64 {
    value * (1.0 + rng.random_range(-bound..=bound))
}
