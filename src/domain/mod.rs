// Raw market input
pub mod market;

// Feature schema, model contracts and prediction values
pub mod ml;

// Input checks ahead of the pipeline
pub mod validation;

// Domain-specific error types
pub mod errors;
