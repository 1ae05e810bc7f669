use pricecast::application::ml::PredictionPipeline;
use pricecast::domain::errors::{ModelError, PipelineError};
use pricecast::domain::market::observation::MarketObservation;
use pricecast::domain::ml::feature_registry::{ExpectedSchema, FEATURE_COUNT};
use pricecast::domain::ml::model::{ModelHandle, ModelId};
use pricecast::domain::ml::registry::ModelRegistry;
use pricecast::infrastructure::models::{
    BoostedTreesArtifact, ModelLoader, ModelManifest, RegressionTree,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn btc_bar() -> MarketObservation {
    MarketObservation::new(45000.0, 46000.0, 44000.0, 45000.0, 1500.0)
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(2024)
}

/// Echoes one named column of its declared schema.
struct ColumnModel {
    schema: ExpectedSchema,
    column: usize,
    importances: Vec<f64>,
}

impl ModelHandle for ColumnModel {
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        Ok(row[self.column] * 1.01)
    }

    fn expected_schema(&self) -> Option<&ExpectedSchema> {
        Some(&self.schema)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }

    fn name(&self) -> &str {
        "column"
    }
}

struct ScaledClose(f64);

impl ModelHandle for ScaledClose {
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != FEATURE_COUNT {
            return Err(ModelError::ShapeMismatch {
                model: "scaled_close".to_string(),
                expected: FEATURE_COUNT,
                actual: row.len(),
            });
        }
        // Close is the fourth derived column
        Ok(row[3] * self.0)
    }

    fn name(&self) -> &str {
        "scaled_close"
    }
}

/// 0.5 * a + 0.3 * b + 0.2 * c
struct WeightedMeta;

impl ModelHandle for WeightedMeta {
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        Ok(0.5 * row[0] + 0.3 * row[1] + 0.2 * row[2])
    }

    fn name(&self) -> &str {
        "weighted_meta"
    }
}

fn full_registry() -> ModelRegistry {
    let base_a = ColumnModel {
        schema: ExpectedSchema::from_names(vec!["Open".to_string(), "Close".to_string()]),
        column: 1,
        importances: vec![0.6, 0.4],
    };
    ModelRegistry::builder()
        .with_model(ModelId::BaseA, Arc::new(base_a))
        .with_model(ModelId::BaseB, Arc::new(ScaledClose(0.99)))
        .with_model(ModelId::BaseC, Arc::new(ScaledClose(1.03)))
        .with_model(ModelId::Meta, Arc::new(WeightedMeta))
        .build()
}

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "pricecast-it-{}-{}-{}",
        tag,
        std::process::id(),
        nanos
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_empty_registry_uses_trend_fallback() {
    let pipeline = PredictionPipeline::new(Arc::new(ModelRegistry::empty()));
    let result = pipeline.run(&btc_bar(), &mut rng()).unwrap();

    assert!(result.using_fallback);
    assert!((result.prediction - 44900.0).abs() < 1e-6, "got {}", result.prediction);
    assert!(result.prediction >= 0.9 * 44000.0);

    let preds = &result.per_model_predictions;
    assert_eq!(preds.get(ModelId::Meta), preds.get(ModelId::BaseA));
    assert!((preds.get(ModelId::BaseB).unwrap() - 44900.0 * 0.98).abs() < 1e-6);
    assert!((preds.get(ModelId::BaseC).unwrap() - 44900.0 * 1.02).abs() < 1e-6);

    // 0.7 * clamp(0.7 * agreement + 0.3 * quality)
    assert!((result.confidence - 0.6464).abs() < 1e-3, "got {}", result.confidence);

    // Static table, since no model can be introspected
    assert_eq!(result.feature_importance.len(), 8);
    assert_eq!(result.feature_importance[0].feature, "Open Price");
}

#[test]
fn test_bullish_sentiment_lifts_fallback() {
    let pipeline = PredictionPipeline::new(Arc::new(ModelRegistry::empty()));
    let neutral = pipeline.run(&btc_bar(), &mut rng()).unwrap();
    let bullish = pipeline
        .run(&btc_bar().with_sentiment(1.0), &mut rng())
        .unwrap();

    let lift = bullish.prediction - neutral.prediction;
    assert!((lift - 4500.0).abs() < 1e-6, "got {}", lift);
}

#[test]
fn test_full_registry_blends_through_meta() {
    let pipeline = PredictionPipeline::new(Arc::new(full_registry()));
    let result = pipeline.run(&btc_bar(), &mut rng()).unwrap();

    assert!(!result.using_fallback);

    let preds = &result.per_model_predictions;
    let a = preds.get(ModelId::BaseA).unwrap();
    let b = preds.get(ModelId::BaseB).unwrap();
    let c = preds.get(ModelId::BaseC).unwrap();
    assert!((a - 45450.0).abs() < 1e-6);
    assert!((b - 44550.0).abs() < 1e-6);
    assert!((c - 46350.0).abs() < 1e-6);

    let mean = (a + b + c) / 3.0;
    let meta = preds.get(ModelId::Meta).unwrap();
    assert!((meta - (0.5 * a + 0.3 * b + 0.2 * c)).abs() < 1e-6);
    assert!((meta - mean).abs() > 1.0);
    assert_eq!(result.prediction, meta);

    assert!((0.5..=0.95).contains(&result.confidence));
    assert_eq!(result.feature_importance[0].feature, "Open");
    assert_eq!(result.feature_importance[0].importance, 0.6);
}

#[test]
fn test_failing_meta_degrades_to_mean() {
    let registry = ModelRegistry::builder()
        .with_model(ModelId::BaseB, Arc::new(ScaledClose(1.0)))
        .with_model(ModelId::BaseC, Arc::new(ScaledClose(1.0)))
        // Meta rejects the three-wide stacked row
        .with_model(ModelId::Meta, Arc::new(ScaledClose(1.0)))
        .build();
    let pipeline = PredictionPipeline::new(Arc::new(registry));
    let result = pipeline.run(&btc_bar(), &mut rng()).unwrap();

    assert!(!result.using_fallback);
    assert!((result.prediction - 45000.0).abs() < 1e-6);
}

#[test]
fn test_artifacts_loaded_from_disk() {
    let dir = scratch_dir("disk");
    let boosted = BoostedTreesArtifact {
        n_features: FEATURE_COUNT,
        base_score: 45000.0,
        trees: vec![RegressionTree::stump(100.0)],
    };
    fs::write(
        dir.join("xgboost_model.json"),
        serde_json::to_string(&boosted).unwrap(),
    )
    .unwrap();
    fs::write(dir.join("ridge_model.json"), "not a model").unwrap();

    let registry = ModelLoader::new(&dir).load().unwrap();
    assert!(registry.is_available(ModelId::BaseC));
    assert!(!registry.is_available(ModelId::BaseB));

    let pipeline = PredictionPipeline::new(Arc::new(registry));
    let result = pipeline.run(&btc_bar(), &mut rng()).unwrap();

    let preds = &result.per_model_predictions;
    assert!(!result.using_fallback);
    assert_eq!(preds.get(ModelId::BaseA), Some(45000.0));
    assert_eq!(preds.get(ModelId::BaseB), Some(45000.0));
    assert_eq!(preds.get(ModelId::BaseC), Some(45100.0));
    assert!((result.prediction - 135100.0 / 3.0).abs() < 1e-6);
    assert!((result.confidence - 0.9327).abs() < 1e-3, "got {}", result.confidence);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_manifest_version_mismatch_is_fatal() {
    let dir = scratch_dir("manifest");
    let manifest = ModelManifest { schema_version: 99 };
    fs::write(
        dir.join("manifest.json"),
        serde_json::to_string(&manifest).unwrap(),
    )
    .unwrap();

    let registry = ModelLoader::new(&dir).load().unwrap();
    let pipeline = PredictionPipeline::new(Arc::new(registry));
    let err = pipeline.run(&btc_bar(), &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::SchemaVersionMismatch {
            expected: 99,
            actual: 1
        }
    ));

    fs::remove_dir_all(&dir).ok();
}
