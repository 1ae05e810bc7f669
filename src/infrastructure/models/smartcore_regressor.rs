use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::ExpectedSchema;
use crate::domain::ml::model::ModelHandle;
use serde::{Deserialize, Serialize};
use smartcore::api::Predictor;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use smartcore::linear::ridge_regression::RidgeRegression;

pub type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type RidgeModel = RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type LinearModel = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random-forest base regressor; reindexed onto its declared feature names.
pub type ForestRegressorHandle = SmartcoreRegressor<ForestModel>;
/// Ridge base regressor over the full derived vector.
pub type RidgeRegressorHandle = SmartcoreRegressor<RidgeModel>;
/// Linear stacking regressor over the three base predictions.
pub type LinearMetaHandle = SmartcoreRegressor<LinearModel>;

/// On-disk form of a smartcore model plus the metadata smartcore doesn't keep.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegressorArtifact<M> {
    /// Ordered input columns; required for reindexing models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Input width when no feature names are declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
    pub model: M,
}

/// Adapts any fitted smartcore regressor to the `ModelHandle` contract.
pub struct SmartcoreRegressor<M> {
    name: String,
    n_features: usize,
    schema: Option<ExpectedSchema>,
    importances: Option<Vec<f64>>,
    model: M,
}

impl<M> SmartcoreRegressor<M> {
    pub fn new(name: impl Into<String>, model: M, n_features: usize) -> Self {
        Self {
            name: name.into(),
            n_features,
            schema: None,
            importances: None,
            model,
        }
    }

    /// Declares the ordered input columns; also fixes the input width.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.n_features = names.len();
        self.schema = Some(ExpectedSchema::from_names(names));
        self
    }

    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.importances = Some(importances);
        self
    }

    pub fn from_artifact(
        name: impl Into<String>,
        artifact: RegressorArtifact<M>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let handle = match (artifact.feature_names, artifact.n_features) {
            (Some(names), declared) => {
                if let Some(n) = declared {
                    if n != names.len() {
                        return Err(ModelError::InvalidArtifact {
                            reason: format!(
                                "{}: n_features {} disagrees with {} feature names",
                                name,
                                n,
                                names.len()
                            ),
                        });
                    }
                }
                Self::new(name, artifact.model, 0).with_feature_names(names)
            }
            (None, Some(n)) => Self::new(name, artifact.model, n),
            (None, None) => {
                return Err(ModelError::InvalidArtifact {
                    reason: format!("{}: artifact declares neither feature_names nor n_features", name),
                });
            }
        };

        Ok(match artifact.feature_importances {
            Some(importances) => handle.with_importances(importances),
            None => handle,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

impl<M> ModelHandle for SmartcoreRegressor<M>
where
    M: Predictor<DenseMatrix<f64>, Vec<f64>> + Send + Sync,
{
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                model: self.name.clone(),
                expected: self.n_features,
                actual: row.len(),
            });
        }

        // Single-row 2-D input
        let input = DenseMatrix::from_2d_vec(&vec![row.to_vec()]).map_err(|e| {
            ModelError::InferenceFailed {
                model: self.name.clone(),
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;

        let predictions = self
            .model
            .predict(&input)
            .map_err(|e| ModelError::InferenceFailed {
                model: self.name.clone(),
                reason: e.to_string(),
            })?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| ModelError::EmptyOutput {
                model: self.name.clone(),
            })
    }

    fn expected_schema(&self) -> Option<&ExpectedSchema> {
        self.schema.as_ref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;
    use smartcore::linear::linear_regression::LinearRegressionParameters;
    use smartcore::linear::ridge_regression::RidgeRegressionParameters;

    /// y = 2 * x0 + x1 + 1 on a small grid.
    fn training_data() -> (DenseMatrix<f64>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for i in 0..6 {
            for j in 0..4 {
                let (x0, x1) = (i as f64, j as f64 * 0.5);
                rows.push(vec![x0, x1]);
                targets.push(2.0 * x0 + x1 + 1.0);
            }
        }
        (DenseMatrix::from_2d_vec(&rows).unwrap(), targets)
    }

    fn linear_handle() -> LinearMetaHandle {
        let (x, y) = training_data();
        let model: LinearModel =
            LinearRegression::fit(&x, &y, LinearRegressionParameters::default()).unwrap();
        SmartcoreRegressor::new("linear", model, 2)
    }

    #[test]
    fn test_linear_predicts_fitted_relation() {
        let handle = linear_handle();
        let pred = handle.predict(&[3.0, 1.0]).unwrap();
        assert!((pred - 8.0).abs() < 1e-6, "got {}", pred);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let handle = linear_handle();
        assert!(matches!(
            handle.predict(&[1.0, 2.0, 3.0]),
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_ridge_handle_predicts() {
        let (x, y) = training_data();
        let model: RidgeModel = RidgeRegression::fit(
            &x,
            &y,
            RidgeRegressionParameters::default().with_alpha(0.001),
        )
        .unwrap();
        let handle = SmartcoreRegressor::new("ridge", model, 2);

        let pred = handle.predict(&[2.0, 0.5]).unwrap();
        assert!((pred - 5.5).abs() < 0.1, "got {}", pred);
    }

    #[test]
    fn test_forest_declares_schema_and_importances() {
        let (x, y) = training_data();
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(8)
            .with_max_depth(4)
            .with_min_samples_split(2);
        let model: ForestModel = RandomForestRegressor::fit(&x, &y, params).unwrap();
        let handle = SmartcoreRegressor::new("forest", model, 0)
            .with_feature_names(vec!["Open".to_string(), "Close".to_string()])
            .with_importances(vec![0.7, 0.3]);

        assert_eq!(handle.n_features(), 2);
        assert_eq!(handle.expected_schema().unwrap().len(), 2);
        assert_eq!(handle.feature_importances(), Some(&[0.7, 0.3][..]));

        let pred = handle.predict(&[5.0, 1.5]).unwrap();
        assert!(pred.is_finite());
        assert!((1.0..=13.0).contains(&pred), "got {}", pred);
    }

    #[test]
    fn test_artifact_requires_width() {
        let artifact = RegressorArtifact {
            feature_names: None,
            n_features: None,
            feature_importances: None,
            model: (),
        };
        assert!(SmartcoreRegressor::from_artifact("bad", artifact).is_err());
    }

    #[test]
    fn test_artifact_width_must_match_names() {
        let artifact = RegressorArtifact {
            feature_names: Some(vec!["Open".to_string()]),
            n_features: Some(2),
            feature_importances: None,
            model: (),
        };
        assert!(SmartcoreRegressor::from_artifact("bad", artifact).is_err());
    }

    #[test]
    fn test_artifact_round_trip_through_json() {
        let handle = linear_handle();
        let artifact = RegressorArtifact {
            feature_names: None,
            n_features: Some(2),
            feature_importances: None,
            model: &handle.model,
        };
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: RegressorArtifact<LinearModel> = serde_json::from_str(&json).unwrap();
        let restored = SmartcoreRegressor::from_artifact("restored", parsed).unwrap();

        let a = handle.predict(&[1.0, 1.0]).unwrap();
        let b = restored.predict(&[1.0, 1.0]).unwrap();
        assert!((a - b).abs() < 1e-9);
    }
}
