use crate::domain::errors::ModelError;
use crate::domain::ml::model::FeatureScaler;
use serde::{Deserialize, Serialize};

/// Pre-fit standardization: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerHandle {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScalerHandle {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::InvalidArtifact {
                reason: format!(
                    "scaler has {} means but {} scales",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }
}

impl FeatureScaler for StandardScalerHandle {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.mean.len() {
            return Err(ModelError::TransformFailed {
                reason: format!("expected {} columns, got {}", self.mean.len(), row.len()),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                // Constant columns were fit with zero variance
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizes_columns() {
        let scaler = StandardScalerHandle::new(vec![10.0, 0.0], vec![2.0, 0.0]).unwrap();
        assert_eq!(scaler.transform(&[14.0, 3.0]).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_width_mismatch_fails() {
        let scaler = StandardScalerHandle::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(ModelError::TransformFailed { .. })
        ));
    }

    #[test]
    fn test_inconsistent_artifact_rejected() {
        assert!(StandardScalerHandle::new(vec![0.0; 2], vec![1.0]).is_err());
    }
}
