use crate::domain::errors::ModelError;
use crate::domain::ml::model::{ModelHandle, ModelId};
use crate::domain::ml::prediction::{FeatureImportance, FeatureImportanceReport, ImportanceSource};
use crate::domain::ml::registry::ModelRegistry;
use tracing::debug;

pub const MAX_REPORTED_FEATURES: usize = 10;

/// Calibration table reported when the forest offers no introspection data.
pub const STATIC_IMPORTANCE: [(&str, f64); 8] = [
    ("Open Price", 0.25),
    ("Volume", 0.20),
    ("Price Range", 0.15),
    ("High Price", 0.12),
    ("Low Price", 0.10),
    ("Sentiment", 0.08),
    ("Price Change", 0.06),
    ("Volume Price Ratio", 0.04),
];

// Importances from a fitted forest sum to one; allow float drift.
const WEIGHT_TOLERANCE: f64 = 1e-6;

pub struct ExplainabilityReporter;

impl ExplainabilityReporter {
    /// Ranked importances from the random-forest-like model, or the static table.
    /// Never empty.
    pub fn explain(registry: &ModelRegistry) -> FeatureImportanceReport {
        let Some(model) = registry.handle(ModelId::BaseA) else {
            return Self::static_report();
        };

        match Self::from_model(model) {
            Ok(entries) => FeatureImportanceReport {
                entries,
                source: ImportanceSource::Model,
            },
            Err(e) => {
                debug!("Feature importance unavailable ({}), using static table", e);
                Self::static_report()
            }
        }
    }

    pub fn static_report() -> FeatureImportanceReport {
        FeatureImportanceReport {
            entries: STATIC_IMPORTANCE
                .iter()
                .map(|(name, weight)| FeatureImportance::new(*name, *weight))
                .collect(),
            source: ImportanceSource::Static,
        }
    }

    fn from_model(model: &dyn ModelHandle) -> Result<Vec<FeatureImportance>, ModelError> {
        let invalid = |reason: &str| ModelError::InvalidArtifact {
            reason: format!("{}: {}", model.name(), reason),
        };

        let schema = model.expected_schema().ok_or_else(|| invalid("no feature names"))?;
        let importances = model
            .feature_importances()
            .ok_or_else(|| invalid("no feature importances"))?;

        if importances.is_empty() || importances.len() != schema.len() {
            return Err(invalid("importances do not match feature names"));
        }
        if importances.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid("negative or non-finite importance"));
        }
        if importances.iter().sum::<f64>() > 1.0 + WEIGHT_TOLERANCE {
            return Err(invalid("importances sum above one"));
        }

        let mut entries: Vec<FeatureImportance> = schema
            .names()
            .zip(importances.iter())
            .map(|(name, weight)| FeatureImportance::new(name, *weight))
            .collect();
        entries.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(MAX_REPORTED_FEATURES);
        Ok(entries)
    }
}
