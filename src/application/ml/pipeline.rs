use crate::application::ml::confidence::ConfidenceScorer;
use crate::application::ml::ensemble::EnsemblePredictor;
use crate::application::ml::explainability::ExplainabilityReporter;
use crate::application::ml::feature_deriver::FeatureDeriver;
use crate::domain::errors::PipelineError;
use crate::domain::market::observation::MarketObservation;
use crate::domain::ml::feature_registry::FEATURE_SCHEMA_VERSION;
use crate::domain::ml::prediction::PredictionResult;
use crate::domain::ml::registry::ModelRegistry;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, error};

/// Confidence multiplier applied when no base model contributed.
pub const DEFAULT_FALLBACK_PENALTY: f64 = 0.7;

/// Feature derivation, ensemble inference, confidence and explainability in one call.
///
/// Stateless apart from the shared read-only registry; clone freely across
/// requests.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    registry: Arc<ModelRegistry>,
    fallback_penalty: f64,
}

impl PredictionPipeline {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            fallback_penalty: DEFAULT_FALLBACK_PENALTY,
        }
    }

    pub fn with_fallback_penalty(mut self, penalty: f64) -> Self {
        self.fallback_penalty = penalty;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Runs the full pipeline for one observation.
    ///
    /// Model faults degrade inside the ensemble; only a feature schema the
    /// loaded models were not built for is reported as an error.
    pub fn run<R: Rng + ?Sized>(
        &self,
        observation: &MarketObservation,
        rng: &mut R,
    ) -> Result<PredictionResult, PipelineError> {
        self.check_schema()?;

        let features = FeatureDeriver::derive(observation, rng);
        let ensemble = EnsemblePredictor::predict(&features, &self.registry);
        let score = ConfidenceScorer::score(&ensemble.predictions, &features);

        let confidence = if ensemble.using_fallback {
            score.value() * self.fallback_penalty
        } else {
            score.value()
        };

        let report = ExplainabilityReporter::explain(&self.registry);

        debug!(
            "Prediction {:.2} (confidence {:.3}, fallback={}, importance={:?})",
            ensemble.predictions.final_prediction(),
            confidence,
            ensemble.using_fallback,
            report.source
        );

        Ok(PredictionResult {
            prediction: ensemble.predictions.final_prediction(),
            confidence,
            per_model_predictions: ensemble.predictions,
            feature_importance: report.entries,
            using_fallback: ensemble.using_fallback,
        })
    }

    fn check_schema(&self) -> Result<(), PipelineError> {
        match self.registry.schema_version() {
            Some(expected) if expected != FEATURE_SCHEMA_VERSION => {
                error!(
                    "Model artifacts were built for feature schema v{}, deriver produces v{}",
                    expected, FEATURE_SCHEMA_VERSION
                );
                Err(PipelineError::SchemaVersionMismatch {
                    expected,
                    actual: FEATURE_SCHEMA_VERSION,
                })
            }
            _ => Ok(()),
        }
    }
}
