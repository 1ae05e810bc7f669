//! Gradient-boosted regression trees evaluated from a JSON tree dump.
//!
//! Each tree uses the flat node layout of common GBM dumps: internal node
//! `i` splits on `split_feature[i]` at `threshold[i]`; a negative child `c`
//! refers to leaf `-c - 1`.

use crate::domain::errors::ModelError;
use crate::domain::ml::model::ModelHandle;
use serde::{Deserialize, Serialize};

fn default_shrinkage() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    #[serde(default)]
    pub split_feature: Vec<usize>,
    #[serde(default)]
    pub threshold: Vec<f64>,
    #[serde(default)]
    pub left_child: Vec<i32>,
    #[serde(default)]
    pub right_child: Vec<i32>,
    pub leaf_value: Vec<f64>,
    #[serde(default = "default_shrinkage")]
    pub shrinkage: f64,
}

impl RegressionTree {
    /// A tree with a single leaf, i.e. a constant contribution.
    pub fn stump(value: f64) -> Self {
        Self {
            split_feature: Vec::new(),
            threshold: Vec::new(),
            left_child: Vec::new(),
            right_child: Vec::new(),
            leaf_value: vec![value],
            shrinkage: 1.0,
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        let internal = self.split_feature.len();
        if self.threshold.len() != internal
            || self.left_child.len() != internal
            || self.right_child.len() != internal
        {
            return Err("split/child/threshold length mismatch".to_string());
        }
        if self.leaf_value.is_empty() {
            return Err("tree has no leaves".to_string());
        }
        if let Some(f) = self.split_feature.iter().find(|f| **f >= n_features) {
            return Err(format!("split on feature {} beyond width {}", f, n_features));
        }

        for node in 0..internal {
            for child in [self.left_child[node], self.right_child[node]] {
                if child < 0 {
                    let leaf = (-(child as i64) - 1) as usize;
                    if leaf >= self.leaf_value.len() {
                        return Err(format!("node {} points at missing leaf {}", node, leaf));
                    }
                } else {
                    // Children always follow their parent, so traversal terminates
                    let child = child as usize;
                    if child <= node || child >= internal {
                        return Err(format!("node {} has invalid child {}", node, child));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        if self.split_feature.is_empty() {
            return self.leaf_value[0] * self.shrinkage;
        }

        let mut node = 0usize;
        loop {
            let value = row[self.split_feature[node]];
            let child = if value <= self.threshold[node] {
                self.left_child[node]
            } else {
                self.right_child[node]
            };

            if child < 0 {
                let leaf = (-(child as i64) - 1) as usize;
                return self.leaf_value[leaf] * self.shrinkage;
            }
            node = child as usize;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTreesArtifact {
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

/// Additive tree ensemble: `base_score + sum(tree outputs)`.
#[derive(Debug)]
pub struct BoostedTreesHandle {
    name: String,
    artifact: BoostedTreesArtifact,
}

impl BoostedTreesHandle {
    /// Validates every tree up front so `predict` can index without checks.
    pub fn from_artifact(
        name: impl Into<String>,
        artifact: BoostedTreesArtifact,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if artifact.trees.is_empty() {
            return Err(ModelError::InvalidArtifact {
                reason: format!("{}: model contained no trees", name),
            });
        }
        for (idx, tree) in artifact.trees.iter().enumerate() {
            tree.validate(artifact.n_features)
                .map_err(|reason| ModelError::InvalidArtifact {
                    reason: format!("{}: tree {} invalid: {}", name, idx, reason),
                })?;
        }
        Ok(Self { name, artifact })
    }

    pub fn tree_count(&self) -> usize {
        self.artifact.trees.len()
    }
}

impl ModelHandle for BoostedTreesHandle {
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.artifact.n_features {
            return Err(ModelError::ShapeMismatch {
                model: self.name.clone(),
                expected: self.artifact.n_features,
                actual: row.len(),
            });
        }

        Ok(self.artifact.base_score
            + self
                .artifact
                .trees
                .iter()
                .map(|tree| tree.predict(row))
                .sum::<f64>())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
