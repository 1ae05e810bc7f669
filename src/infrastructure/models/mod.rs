pub mod boosted_trees;
pub mod loader;
pub mod scaler;
pub mod smartcore_regressor;

pub use boosted_trees::{BoostedTreesArtifact, BoostedTreesHandle, RegressionTree};
pub use loader::{ModelLoader, ModelManifest};
pub use scaler::StandardScalerHandle;
pub use smartcore_regressor::{
    ForestRegressorHandle, LinearMetaHandle, RegressorArtifact, RidgeRegressorHandle,
    SmartcoreRegressor,
};
