pub mod confidence;
pub mod ensemble;
pub mod explainability;
pub mod feature_deriver;
pub mod pipeline;

pub use confidence::ConfidenceScorer;
pub use ensemble::{EnsembleOutput, EnsemblePredictor};
pub use explainability::ExplainabilityReporter;
pub use feature_deriver::FeatureDeriver;
pub use pipeline::PredictionPipeline;
