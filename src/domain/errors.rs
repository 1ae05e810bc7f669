use thiserror::Error;

/// Errors raised by a single model handle or the input scaler.
///
/// None of these abort a prediction: the ensemble substitutes a documented
/// fallback value for the failing slot and logs the error.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{model} inference failed: {reason}")]
    InferenceFailed { model: String, reason: String },

    #[error("{model} expects {expected} features, got {actual}")]
    ShapeMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("{model} does not declare an expected feature schema")]
    MissingSchema { model: String },

    #[error("{model} returned no prediction")]
    EmptyOutput { model: String },

    #[error("{model} produced a non-finite prediction: {value}")]
    NonFinite { model: String, value: f64 },

    #[error("Scaler transform failed: {reason}")]
    TransformFailed { reason: String },

    #[error("Invalid model artifact: {reason}")]
    InvalidArtifact { reason: String },
}

/// Hard failures of the prediction pipeline.
///
/// Only an irrecoverable feature-schema fault lands here; every model-layer
/// fault degrades instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Feature schema mismatch: models expect v{expected}, deriver produces v{actual}")]
    SchemaVersionMismatch { expected: u32, actual: u32 },
}

/// Rejections produced by the caller-side observation validator.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing or invalid required field: {field}")]
    InvalidField { field: &'static str },

    #[error("Price values must be positive: {field} = {value}")]
    NonPositivePrice { field: &'static str, value: f64 },

    #[error("Volume must be non-negative: {value}")]
    NegativeVolume { value: f64 },

    #[error("High price cannot be less than low price: high {high} < low {low}")]
    InvertedRange { high: f64, low: f64 },

    #[error("Sentiment must lie in [-1, 1]: {value}")]
    SentimentOutOfRange { value: f64 },
}
