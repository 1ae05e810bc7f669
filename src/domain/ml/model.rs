use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::ExpectedSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Slot identifiers of the stacked ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    /// Random-forest-like regressor; reindexes onto its declared schema.
    BaseA,
    /// Linear regressor over the full derived vector.
    BaseB,
    /// Gradient-boosted regressor over the full derived vector.
    BaseC,
    /// Stacking regressor over the three base predictions.
    Meta,
}

impl ModelId {
    pub const BASES: [ModelId; 3] = [ModelId::BaseA, ModelId::BaseB, ModelId::BaseC];
    pub const ALL: [ModelId; 4] = [
        ModelId::BaseA,
        ModelId::BaseB,
        ModelId::BaseC,
        ModelId::Meta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseA => "base_a",
            Self::BaseB => "base_b",
            Self::BaseC => "base_c",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only inference contract of a loaded model artifact.
pub trait ModelHandle: Send + Sync {
    /// Predict a single value from one input row.
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError>;

    /// Ordered input columns the model was fit on, if the artifact declares them.
    fn expected_schema(&self) -> Option<&ExpectedSchema> {
        None
    }

    /// Per-feature importances aligned with `expected_schema`, if available.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Pre-fit input normalizer. Only `transform` is ever called.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Either a loaded artifact or its documented absence.
pub enum ModelSlot<T: ?Sized> {
    Absent,
    Present(Arc<T>),
}

impl<T: ?Sized> ModelSlot<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(handle) => Some(handle.as_ref()),
            Self::Absent => None,
        }
    }
}

impl<T: ?Sized> From<Option<Arc<T>>> for ModelSlot<T> {
    fn from(handle: Option<Arc<T>>) -> Self {
        match handle {
            Some(h) => Self::Present(h),
            None => Self::Absent,
        }
    }
}

impl<T: ?Sized> Default for ModelSlot<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T: ?Sized> Clone for ModelSlot<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Present(handle) => Self::Present(Arc::clone(handle)),
            Self::Absent => Self::Absent,
        }
    }
}

// Manual Debug: trait objects behind the Arc don't implement it
impl<T: ?Sized> fmt::Debug for ModelSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(_) => write!(f, "Present"),
            Self::Absent => write!(f, "Absent"),
        }
    }
}
