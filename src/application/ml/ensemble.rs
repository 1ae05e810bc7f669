use crate::application::ml::feature_deriver::ratio_or;
use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ml::model::{FeatureScaler, ModelHandle, ModelId};
use crate::domain::ml::prediction::PredictionSet;
use crate::domain::ml::registry::ModelRegistry;
use tracing::{debug, info, warn};

/// Multipliers used to spread the trend fallback across the base slots.
pub const FALLBACK_BASE_B_FACTOR: f64 = 0.98;
pub const FALLBACK_BASE_C_FACTOR: f64 = 1.02;
/// Trend fallback never predicts below this fraction of the bar's low.
pub const FALLBACK_LOW_FLOOR: f64 = 0.9;
const SENTIMENT_WEIGHT: f64 = 0.1;
const VOLATILITY_WEIGHT: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleOutput {
    pub predictions: PredictionSet,
    /// True iff no base model was present and the trend estimate was used.
    pub using_fallback: bool,
}

/// Stacked ensemble: three base regressors blended by a meta regressor.
///
/// - No base present: deterministic trend estimate for every slot
/// - Base absent or failing: that slot echoes the `Close` feature
/// - Meta absent or failing: mean of the base slots
pub struct EnsemblePredictor;

impl EnsemblePredictor {
    pub fn predict(features: &FeatureVector, registry: &ModelRegistry) -> EnsembleOutput {
        if !registry.has_any_base() {
            let fallback = trend_fallback(features);
            info!(
                "No base models available. Using trend fallback: {:.2}",
                fallback
            );

            let mut predictions = PredictionSet::new();
            predictions.insert(ModelId::BaseA, fallback);
            predictions.insert(ModelId::BaseB, fallback * FALLBACK_BASE_B_FACTOR);
            predictions.insert(ModelId::BaseC, fallback * FALLBACK_BASE_C_FACTOR);
            predictions.insert(ModelId::Meta, fallback);
            return EnsembleOutput {
                predictions,
                using_fallback: true,
            };
        }

        let close = features.close();
        let mut predictions = PredictionSet::new();

        let base_a = call_or_default(
            ModelId::BaseA,
            registry.handle(ModelId::BaseA),
            close,
            |model| predict_with_schema(model, features, registry.scaler()),
        );
        predictions.insert(ModelId::BaseA, base_a);

        for id in [ModelId::BaseB, ModelId::BaseC] {
            let value = call_or_default(id, registry.handle(id), close, |model| {
                model.predict(features.values())
            });
            predictions.insert(id, value);
        }

        let bases_mean = predictions.mean();
        let stacked = [
            predictions.get(ModelId::BaseA).unwrap_or(close),
            predictions.get(ModelId::BaseB).unwrap_or(close),
            predictions.get(ModelId::BaseC).unwrap_or(close),
        ];
        let meta = call_or_default(
            ModelId::Meta,
            registry.handle(ModelId::Meta),
            bases_mean,
            |model| model.predict(&stacked),
        );
        predictions.insert(ModelId::Meta, meta);

        EnsembleOutput {
            predictions,
            using_fallback: false,
        }
    }
}

/// Trend-based estimate used when no base model is loaded.
///
/// `close * (1 + trend + 0.1 * sentiment - 0.05 * volatility)`, floored at
/// 90% of the low.
pub fn trend_fallback(features: &FeatureVector) -> f64 {
    let open = features.open();
    let close = features.close();
    let trend = ratio_or(close - open, open, 0.0);
    let volatility = ratio_or(features.high() - features.low(), open, 0.0);

    let prediction = close
        * (1.0 + trend + features.sentiment() * SENTIMENT_WEIGHT
            - volatility * VOLATILITY_WEIGHT);
    prediction.max(features.low() * FALLBACK_LOW_FLOOR)
}

/// Runs `call` against a present handle, or substitutes `default`.
///
/// Absence, an error, or a non-finite output all yield `default`; failures
/// are logged so the caller can observe them.
fn call_or_default<F>(id: ModelId, handle: Option<&dyn ModelHandle>, default: f64, call: F) -> f64
where
    F: FnOnce(&dyn ModelHandle) -> Result<f64, ModelError>,
{
    let Some(model) = handle else {
        debug!("{} not loaded, using {:.2}", id, default);
        return default;
    };

    let outcome = call(model).and_then(|value| {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFinite {
                model: model.name().to_string(),
                value,
            })
        }
    });

    match outcome {
        Ok(value) => value,
        Err(e) => {
            warn!(
                "{} ({}) prediction failed: {}. Falling back to {:.2}",
                id,
                model.name(),
                e,
                default
            );
            default
        }
    }
}

/// Reindexes onto the model's declared columns, scales if a scaler is loaded, then predicts.
fn predict_with_schema(
    model: &dyn ModelHandle,
    features: &FeatureVector,
    scaler: Option<&dyn FeatureScaler>,
) -> Result<f64, ModelError> {
    let schema = model.expected_schema().ok_or_else(|| ModelError::MissingSchema {
        model: model.name().to_string(),
    })?;

    let missing = schema.missing_from_derived();
    if !missing.is_empty() {
        debug!(
            "{} expects {} features not derived, zero-filling: {:?}",
            model.name(),
            missing.len(),
            missing
        );
    }

    let row = features.reindex(schema);
    let row = match scaler {
        Some(scaler) => scaler.transform(&row)?,
        None => row,
    };
    model.predict(&row)
}
