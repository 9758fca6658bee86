use serde::{Deserialize, Serialize};
use crate::core::classifier::Classifier;
use crate::error::{ArtifactError, PredictError};
use crate::models::{ClassLabel, FeatureVector, ModelInfo};

/// Artifact layout version understood by this build
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Marks a missing child in the exported `children_left` / `children_right` arrays
const TREE_LEAF: i64 = -1;

/// Serialized random forest as exported from a fitted scikit-learn estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub format_version: u32,
    #[serde(default = "default_estimator")]
    pub estimator: String,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub classes: Vec<ClassLabel>,
    pub trees: Vec<TreeArtifact>,
}

fn default_estimator() -> String {
    "RandomForestClassifier".to_string()
}

/// Parallel node arrays of a single fitted tree (the `tree_` attribute layout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_artifact(
        tree_idx: usize,
        tree: &TreeArtifact,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ArtifactError> {
        let n_nodes = tree.children_left.len();
        let incompatible = |msg: String| ArtifactError::Incompatible(format!("tree {}: {}", tree_idx, msg));

        if n_nodes == 0 {
            return Err(incompatible("tree has no nodes".to_string()));
        }
        if tree.children_right.len() != n_nodes
            || tree.feature.len() != n_nodes
            || tree.threshold.len() != n_nodes
            || tree.value.len() != n_nodes
        {
            return Err(incompatible("node arrays have different lengths".to_string()));
        }

        let mut nodes = Vec::with_capacity(n_nodes);
        for idx in 0..n_nodes {
            let left = tree.children_left[idx];
            let right = tree.children_right[idx];

            if left == TREE_LEAF && right == TREE_LEAF {
                let row = &tree.value[idx];
                if row.len() != n_classes {
                    return Err(incompatible(format!(
                        "node {} has {} class values, expected {}",
                        idx,
                        row.len(),
                        n_classes
                    )));
                }
                if row.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(incompatible(format!("node {} has invalid class values", idx)));
                }
                nodes.push(Node::Leaf { proba: normalize(row) });
                continue;
            }

            // Children are stored in depth-first order, so they always follow their parent
            let in_range = |child: i64| child > idx as i64 && (child as usize) < n_nodes;
            if !in_range(left) || !in_range(right) {
                return Err(incompatible(format!("node {} has invalid children ({}, {})", idx, left, right)));
            }

            let feature = tree.feature[idx];
            if feature < 0 || feature as usize >= n_features {
                return Err(incompatible(format!(
                    "node {} splits on feature {} but the model has {} features",
                    idx, feature, n_features
                )));
            }

            let threshold = tree.threshold[idx];
            if threshold.is_nan() {
                return Err(incompatible(format!("node {} has a NaN threshold", idx)));
            }

            nodes.push(Node::Split {
                feature: feature as usize,
                threshold,
                left: left as usize,
                right: right as usize,
            });
        }

        Ok(Self { nodes })
    }

    /// Walk from the root to the leaf that `x` falls into
    fn leaf_proba(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return proba,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Leaf class counts (or fractions) as probabilities
fn normalize(row: &[f64]) -> Vec<f64> {
    let total: f64 = row.iter().sum();
    if total > 0.0 {
        row.iter().map(|v| v / total).collect()
    } else {
        vec![0.0; row.len()]
    }
}

/// Random forest classifier reconstructed from a [`ForestArtifact`]
///
/// Prediction averages per-tree leaf probabilities and picks the class with
/// the highest mean; the first class wins ties.
#[derive(Debug, Clone)]
pub struct RandomForest {
    estimator: String,
    n_features: usize,
    feature_names: Option<Vec<String>>,
    classes: Vec<ClassLabel>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ArtifactError> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::Incompatible(format!(
                "unsupported format_version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if artifact.n_features == 0 {
            return Err(ArtifactError::Incompatible("n_features must be at least 1".to_string()));
        }
        if artifact.classes.is_empty() {
            return Err(ArtifactError::Incompatible("classes must not be empty".to_string()));
        }
        if artifact.trees.is_empty() {
            return Err(ArtifactError::Incompatible("forest has no trees".to_string()));
        }
        if let Some(names) = &artifact.feature_names {
            if names.len() != artifact.n_features {
                return Err(ArtifactError::Incompatible(format!(
                    "{} feature names for {} features",
                    names.len(),
                    artifact.n_features
                )));
            }
        }

        let n_classes = artifact.classes.len();
        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| DecisionTree::from_artifact(idx, tree, artifact.n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            estimator: artifact.estimator,
            n_features: artifact.n_features,
            feature_names: artifact.feature_names,
            classes: artifact.classes,
            trees,
        })
    }

    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    /// Mean class probabilities across all trees for a single row
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, PredictError> {
        if features.len() != self.n_features {
            return Err(PredictError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
                estimator: self.estimator.clone(),
            });
        }

        // Trees are evaluated on float32 inputs
        let x = features
            .as_slice()
            .iter()
            .map(|&v| {
                let narrowed = v as f32;
                if narrowed.is_finite() {
                    Ok(narrowed as f64)
                } else {
                    Err(PredictError::Inference(
                        "Input X contains infinity or a value too large for dtype('float32').".to_string(),
                    ))
                }
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_proba(&x)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);

        Ok(proba)
    }

    /// Most probable class label for a single row
    pub fn predict_label(&self, features: &FeatureVector) -> Result<&ClassLabel, PredictError> {
        let proba = self.predict_proba(features)?;

        let mut best = 0;
        for (idx, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = idx;
            }
        }

        Ok(&self.classes[best])
    }
}

impl TryFrom<ForestArtifact> for RandomForest {
    type Error = ArtifactError;

    fn try_from(artifact: ForestArtifact) -> Result<Self, Self::Error> {
        Self::from_artifact(artifact)
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<i64, PredictError> {
        self.predict_label(features)?.to_integer()
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            estimator: self.estimator.clone(),
            n_features: self.n_features,
            n_classes: self.classes.len(),
            n_trees: self.trees.len(),
            feature_names: self.feature_names.clone(),
        }
    }
}
