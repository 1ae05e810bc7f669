pub mod feature_registry;
pub mod model;
pub mod prediction;
pub mod registry;
