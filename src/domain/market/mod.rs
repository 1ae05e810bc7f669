pub mod observation;

pub use observation::{MarketObservation, PredictionRequest};
