//! Headline sentiment from keyword counts, nudged by the bar that accompanies it.
//!
//! Keywords are matched as lowercase substrings, so "rising" also counts
//! "rise" and "up" matches inside "update".

use crate::domain::market::observation::MarketObservation;
use rand::Rng;

const POSITIVE_KEYWORDS: &[&str] = &[
    "bull",
    "bullish",
    "rise",
    "rising",
    "increase",
    "up",
    "gain",
    "gains",
    "growth",
    "positive",
    "surge",
    "rally",
    "boom",
    "breakthrough",
    "adoption",
    "institutional",
    "investment",
    "buy",
    "buying",
    "support",
    "strong",
    "record",
    "high",
    "milestone",
    "success",
    "approve",
    "approved",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "bear",
    "bearish",
    "fall",
    "falling",
    "decrease",
    "down",
    "drop",
    "crash",
    "decline",
    "negative",
    "sell",
    "selling",
    "dump",
    "fear",
    "uncertainty",
    "regulation",
    "ban",
    "banned",
    "hack",
    "hacked",
    "scam",
    "fraud",
    "low",
    "bottom",
    "concern",
    "warning",
    "risk",
    "volatile",
    "bubble",
];

/// Only count when the headline is already positive.
const CRYPTO_POSITIVE_KEYWORDS: &[(&str, f64)] = &[
    ("bitcoin", 0.1),
    ("btc", 0.1),
    ("cryptocurrency", 0.1),
    ("blockchain", 0.1),
    ("etf", 0.1),
    ("halving", 0.1),
];

const CRYPTO_NEGATIVE_KEYWORDS: &[(&str, f64)] = &[
    ("regulation", -0.15),
    ("tax", -0.15),
    ("government", -0.15),
    ("central bank", -0.15),
];

const KEYWORD_WEIGHT: f64 = 0.2;
const WIDE_RANGE_THRESHOLD: f64 = 0.05;
const WIDE_RANGE_BONUS: f64 = 0.05;
const VOLATILE_RANGE_PENALTY: f64 = -0.1;
const VOLUME_SCALE: f64 = 10_000.0;
const MAX_VOLUME_FACTOR: f64 = 0.1;

pub struct KeywordSentimentScorer;

impl KeywordSentimentScorer {
    pub fn new() -> Self {
        Self
    }

    fn count_matches(text: &str, keywords: &[&str]) -> usize {
        keywords.iter().filter(|kw| text.contains(*kw)).count()
    }

    fn crypto_adjustment(text: &str, positive_count: usize) -> f64 {
        let mut adjustment = 0.0;
        if positive_count > 0 {
            for (keyword, weight) in CRYPTO_POSITIVE_KEYWORDS {
                if text.contains(keyword) {
                    adjustment += weight;
                }
            }
        }
        for (keyword, weight) in CRYPTO_NEGATIVE_KEYWORDS {
            if text.contains(keyword) {
                adjustment += weight;
            }
        }
        adjustment
    }

    /// Score a headline in `[-1, 1]`, rounded to two decimals.
    ///
    /// Blank headlines are neutral. A saturated score is pulled back by a
    /// random factor in `[0.85, 0.99]` drawn from `rng`.
    pub fn score<R: Rng + ?Sized>(
        &self,
        headline: &str,
        obs: &MarketObservation,
        rng: &mut R,
    ) -> f64 {
        if headline.trim().is_empty() {
            return 0.0;
        }

        let text = headline.to_lowercase();
        let positive_count = Self::count_matches(&text, POSITIVE_KEYWORDS);
        let negative_count = Self::count_matches(&text, NEGATIVE_KEYWORDS);

        let mut score = (positive_count as f64 - negative_count as f64) * KEYWORD_WEIGHT;

        if obs.open > 0.0 && obs.range() / obs.open > WIDE_RANGE_THRESHOLD {
            score += if text.contains("volatile") {
                VOLATILE_RANGE_PENALTY
            } else {
                WIDE_RANGE_BONUS
            };
        }

        let volume_factor = (obs.volume / VOLUME_SCALE).min(MAX_VOLUME_FACTOR);
        if positive_count > negative_count {
            score += volume_factor;
        } else if negative_count > positive_count {
            score -= volume_factor;
        }

        score += Self::crypto_adjustment(&text, positive_count);

        let mut score = score.clamp(-1.0, 1.0);
        if score.abs() == 1.0 {
            score *= rng.random_range(0.85..=0.99);
        }

        (score * 100.0).round() / 100.0
    }
}

impl Default for KeywordSentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}
