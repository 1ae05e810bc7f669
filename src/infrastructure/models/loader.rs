//! Artifact loading for the model registry.
//!
//! Each artifact is optional. A missing file leaves its slot absent with a
//! warning; an unreadable file leaves it absent with an error log. Only a
//! corrupt manifest fails the whole load, since it carries the feature schema
//! contract.

use super::boosted_trees::{BoostedTreesArtifact, BoostedTreesHandle};
use super::scaler::StandardScalerHandle;
use super::smartcore_regressor::{
    ForestModel, LinearModel, RegressorArtifact, RidgeModel, SmartcoreRegressor,
};
use crate::domain::ml::model::{FeatureScaler, ModelHandle, ModelId, ModelSlot};
use crate::domain::ml::registry::ModelRegistry;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const FOREST_ARTIFACT: &str = "random_forest_model.json";
pub const RIDGE_ARTIFACT: &str = "ridge_model.json";
pub const BOOSTED_ARTIFACT: &str = "xgboost_model.json";
pub const META_ARTIFACT: &str = "meta_model.json";
pub const SCALER_ARTIFACT: &str = "scaler.json";
pub const MANIFEST: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub schema_version: u32,
}

pub struct ModelLoader {
    model_dir: PathBuf,
}

impl ModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn load(&self) -> Result<ModelRegistry> {
        if !self.model_dir.exists() {
            warn!(
                "Models directory not found at {:?}. All predictions will use the trend fallback.",
                self.model_dir
            );
            return Ok(ModelRegistry::empty());
        }

        let mut builder = ModelRegistry::builder()
            .with_slot(
                ModelId::BaseA,
                self.load_slot(FOREST_ARTIFACT, |path| {
                    let artifact: RegressorArtifact<ForestModel> = read_json(path)?;
                    let handle = SmartcoreRegressor::from_artifact("random_forest", artifact)?;
                    Ok(Arc::new(handle) as Arc<dyn ModelHandle>)
                }),
            )
            .with_slot(
                ModelId::BaseB,
                self.load_slot(RIDGE_ARTIFACT, |path| {
                    let artifact: RegressorArtifact<RidgeModel> = read_json(path)?;
                    let handle = SmartcoreRegressor::from_artifact("ridge", artifact)?;
                    Ok(Arc::new(handle) as Arc<dyn ModelHandle>)
                }),
            )
            .with_slot(
                ModelId::BaseC,
                self.load_slot(BOOSTED_ARTIFACT, |path| {
                    let artifact: BoostedTreesArtifact = read_json(path)?;
                    let handle = BoostedTreesHandle::from_artifact("xgboost", artifact)?;
                    Ok(Arc::new(handle) as Arc<dyn ModelHandle>)
                }),
            )
            .with_slot(
                ModelId::Meta,
                self.load_slot(META_ARTIFACT, |path| {
                    let artifact: RegressorArtifact<LinearModel> = read_json(path)?;
                    let handle = SmartcoreRegressor::from_artifact("meta_model", artifact)?;
                    Ok(Arc::new(handle) as Arc<dyn ModelHandle>)
                }),
            )
            .with_scaler_slot(self.load_slot(SCALER_ARTIFACT, |path| {
                let scaler: StandardScalerHandle = read_json(path)?;
                scaler.validate()?;
                Ok(Arc::new(scaler) as Arc<dyn FeatureScaler>)
            }));

        let manifest_path = self.model_dir.join(MANIFEST);
        if manifest_path.exists() {
            let manifest: ModelManifest = read_json(&manifest_path)
                .context("Model manifest is present but unreadable")?;
            info!("Model manifest declares feature schema v{}", manifest.schema_version);
            builder = builder.with_schema_version(manifest.schema_version);
        }

        let registry = builder.build();
        info!(
            "Loaded {}/3 base models (meta: {}, scaler: {})",
            registry.available_bases(),
            registry.is_available(ModelId::Meta),
            registry.scaler().is_some()
        );
        Ok(registry)
    }

    fn load_slot<T, F>(&self, file_name: &str, build: F) -> ModelSlot<T>
    where
        T: ?Sized,
        F: FnOnce(&Path) -> Result<Arc<T>>,
    {
        let path = self.model_dir.join(file_name);
        if !path.exists() {
            warn!("Model artifact not found at {:?}. Slot left empty.", path);
            return ModelSlot::Absent;
        }

        match build(&path) {
            Ok(handle) => {
                info!("Successfully loaded model artifact from {:?}", path);
                ModelSlot::Present(handle)
            }
            Err(e) => {
                error!("Failed to load model artifact {:?}: {:#}", path, e);
                ModelSlot::Absent
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to deserialize {:?}", path))
}
