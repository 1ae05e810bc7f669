pub mod response;

pub use response::{ErrorResponse, PredictionResponse, ResponseStatus};
