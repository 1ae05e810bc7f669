use crate::domain::ml::model::{FeatureScaler, ModelHandle, ModelId, ModelSlot};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Read-only set of loaded artifacts, shared across prediction calls.
///
/// Every `ModelId` always has a slot; absence is a slot state, not a missing key.
#[derive(Clone)]
pub struct ModelRegistry {
    models: BTreeMap<ModelId, ModelSlot<dyn ModelHandle>>,
    scaler: ModelSlot<dyn FeatureScaler>,
    schema_version: Option<u32>,
}

impl ModelRegistry {
    /// Registry with no artifacts at all; predictions take the trend fallback.
    pub fn empty() -> Self {
        ModelRegistryBuilder::default().build()
    }

    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    pub fn slot(&self, id: ModelId) -> Option<&ModelSlot<dyn ModelHandle>> {
        self.models.get(&id)
    }

    pub fn handle(&self, id: ModelId) -> Option<&dyn ModelHandle> {
        self.models.get(&id).and_then(ModelSlot::as_present)
    }

    pub fn scaler(&self) -> Option<&dyn FeatureScaler> {
        self.scaler.as_present()
    }

    pub fn is_available(&self, id: ModelId) -> bool {
        self.handle(id).is_some()
    }

    pub fn available_bases(&self) -> usize {
        ModelId::BASES
            .iter()
            .filter(|id| self.is_available(**id))
            .count()
    }

    pub fn has_any_base(&self) -> bool {
        self.available_bases() > 0
    }

    /// Feature schema version declared by the artifact manifest, if any.
    pub fn schema_version(&self) -> Option<u32> {
        self.schema_version
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.models)
            .field("scaler", &self.scaler)
            .field("schema_version", &self.schema_version)
            .finish()
    }
}

#[derive(Default)]
pub struct ModelRegistryBuilder {
    models: BTreeMap<ModelId, ModelSlot<dyn ModelHandle>>,
    scaler: ModelSlot<dyn FeatureScaler>,
    schema_version: Option<u32>,
}

impl ModelRegistryBuilder {
    pub fn with_model(mut self, id: ModelId, handle: Arc<dyn ModelHandle>) -> Self {
        self.models.insert(id, ModelSlot::Present(handle));
        self
    }

    pub fn with_slot(mut self, id: ModelId, slot: ModelSlot<dyn ModelHandle>) -> Self {
        self.models.insert(id, slot);
        self
    }

    pub fn with_scaler(mut self, scaler: Arc<dyn FeatureScaler>) -> Self {
        self.scaler = ModelSlot::Present(scaler);
        self
    }

    pub fn with_scaler_slot(mut self, slot: ModelSlot<dyn FeatureScaler>) -> Self {
        self.scaler = slot;
        self
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = Some(version);
        self
    }

    pub fn build(mut self) -> ModelRegistry {
        for id in ModelId::ALL {
            self.models.entry(id).or_default();
        }
        ModelRegistry {
            models: self.models,
            scaler: self.scaler,
            schema_version: self.schema_version,
        }
    }
}
