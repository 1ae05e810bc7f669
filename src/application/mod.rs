pub mod ml;
pub mod prediction_service;

pub use prediction_service::PredictionService;
