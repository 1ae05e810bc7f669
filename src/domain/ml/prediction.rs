use crate::domain::ml::model::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-slot predictions of one inference call. Created fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionSet {
    values: BTreeMap<ModelId, f64>,
}

impl PredictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ModelId, value: f64) {
        self.values.insert(id, value);
    }

    pub fn get(&self, id: ModelId) -> Option<f64> {
        self.values.get(&id).copied()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, f64)> + '_ {
        self.values.iter().map(|(id, v)| (*id, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean of every slot currently filled.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.values().sum::<f64>() / self.values.len() as f64
    }

    /// The blended estimate; falls back to the mean if the meta slot was never filled.
    pub fn final_prediction(&self) -> f64 {
        self.get(ModelId::Meta).unwrap_or_else(|| self.mean())
    }
}

/// Bounded agreement/quality score in [0.5, 0.95].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 0.95;

    /// Clamps into the valid range; non-finite input maps to the floor.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(Self::MIN, Self::MAX))
        } else {
            Self(Self::MIN)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

impl FeatureImportance {
    pub fn new(feature: impl Into<String>, importance: f64) -> Self {
        Self {
            feature: feature.into(),
            importance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceSource {
    /// Introspected from the random-forest-like model.
    Model,
    /// Hardcoded calibration table.
    Static,
}

/// Ranked importances, at most ten entries, weights summing to at most one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportanceReport {
    pub entries: Vec<FeatureImportance>,
    pub source: ImportanceSource,
}

impl FeatureImportanceReport {
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.importance).sum()
    }
}

/// Offline evaluation metrics reported next to each prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Aggregated output of one pipeline run; the sole hand-off to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: f64,
    pub confidence: f64,
    #[serde(rename = "individual_predictions")]
    pub per_model_predictions: PredictionSet,
    pub feature_importance: Vec<FeatureImportance>,
    pub using_fallback: bool,
}
