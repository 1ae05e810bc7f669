//! Configuration loading from environment variables.
//!
//! Every value has a default, so an empty environment yields a usable config.
//! Command-line flags in the `predict` binary override the model directory
//! and the seed.

use crate::application::ml::pipeline::DEFAULT_FALLBACK_PENALTY;
use crate::domain::ml::prediction::PerformanceMetrics;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_DIR: &str = "model";

/// Offline evaluation of the shipped ensemble, reported alongside each prediction.
pub const DEFAULT_METRICS: PerformanceMetrics = PerformanceMetrics {
    rmse: 97.08,
    mae: 52.16,
    r2: 0.995,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorEnvConfig {
    pub model_dir: PathBuf,
    pub metrics: PerformanceMetrics,
    pub fallback_confidence_penalty: f64,
    /// Fixed seed for lag jitter and sentiment randomization; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PredictorEnvConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            metrics: DEFAULT_METRICS,
            fallback_confidence_penalty: DEFAULT_FALLBACK_PENALTY,
            seed: None,
        }
    }
}

impl PredictorEnvConfig {
    pub fn from_env() -> Result<Self> {
        let model_dir = env::var("PRICECAST_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_DIR));

        let metrics = PerformanceMetrics {
            rmse: Self::parse_f64("PRICECAST_METRIC_RMSE", DEFAULT_METRICS.rmse)?,
            mae: Self::parse_f64("PRICECAST_METRIC_MAE", DEFAULT_METRICS.mae)?,
            r2: Self::parse_f64("PRICECAST_METRIC_R2", DEFAULT_METRICS.r2)?,
        };

        let fallback_confidence_penalty = Self::parse_f64(
            "PRICECAST_FALLBACK_CONFIDENCE_PENALTY",
            DEFAULT_FALLBACK_PENALTY,
        )?;
        if !(0.0..=1.0).contains(&fallback_confidence_penalty) {
            anyhow::bail!(
                "PRICECAST_FALLBACK_CONFIDENCE_PENALTY must be within [0, 1], got {}",
                fallback_confidence_penalty
            );
        }

        let seed = match env::var("PRICECAST_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("Failed to parse PRICECAST_SEED")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            model_dir,
            metrics,
            fallback_confidence_penalty,
            seed,
        })
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}
