use crate::application::ml::feature_deriver::ratio_or;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ml::prediction::{ConfidenceScore, PredictionSet};
use statrs::statistics::Statistics;

const AGREEMENT_WEIGHT: f64 = 0.7;
const QUALITY_WEIGHT: f64 = 0.3;
/// Agreement used when the predictions average to exactly zero.
const NEUTRAL_AGREEMENT: f64 = 0.5;
const QUALITY_FLOOR: f64 = 0.3;
const RANGE_PENALTY: f64 = 5.0;

/// Scores a prediction set by model agreement and input quality.
///
/// The fallback penalty is not applied here; the scorer has no visibility
/// into which ensemble path produced the predictions.
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn score(predictions: &PredictionSet, features: &FeatureVector) -> ConfidenceScore {
        let agreement = Self::agreement(&predictions.values());
        let quality = Self::quality(features);
        ConfidenceScore::new(AGREEMENT_WEIGHT * agreement + QUALITY_WEIGHT * quality)
    }

    /// `max(0, 1 - stdev / mean)` over every slot, population stdev.
    pub fn agreement(values: &[f64]) -> f64 {
        if values.is_empty() {
            return NEUTRAL_AGREEMENT;
        }
        let mean = values.iter().mean();
        if mean == 0.0 {
            return NEUTRAL_AGREEMENT;
        }
        let std_dev = values.iter().population_std_dev();
        (1.0 - std_dev / mean).max(0.0)
    }

    /// Lower relative range means higher quality, within [0.3, 1.0].
    pub fn quality(features: &FeatureVector) -> f64 {
        let range_pct = ratio_or(features.high() - features.low(), features.open(), 0.0);
        (1.0 - RANGE_PENALTY * range_pct).clamp(QUALITY_FLOOR, 1.0)
    }
}
