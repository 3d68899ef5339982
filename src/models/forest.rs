//! Random forest classifier (the ensemble's tree model).
//!
//! Each tree is a flat node array rooted at index 0. A split sends a sample to
//! `left` when `x[feature] <= threshold`, otherwise to `right`. Leaves hold
//! per-class counts (or probabilities); the forest averages the normalized leaf
//! distributions of all trees and picks the most probable class.
//!
//! Children always sit after their parent in the array, which validation checks
//! so traversal cannot loop.

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, ModelId, OrderedFeatureVector, RawLabel};
use crate::math::argmax;
use crate::models::model::{Classifier, class_label, validate_classes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {idx}: feature {feature} out of range"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx}: non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx}: child {child} out of range"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "node {idx}: leaf has {} values for {n_classes} classes",
                            value.len()
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("node {idx}: leaf values must be finite and >= 0"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf reached by `x`.
    fn leaf(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                TreeNode::Leaf { .. } => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

fn default_n_features() -> usize {
    FEATURE_COUNT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<i64>,
    #[serde(default = "default_n_features")]
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        validate_classes(&self.classes)?;
        if self.n_features != FEATURE_COUNT {
            return Err(format!(
                "forest trained on {} features, expected {FEATURE_COUNT}",
                self.n_features
            ));
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.classes.len())
                .map_err(|e| format!("tree {idx}: {e}"))?;
        }
        Ok(())
    }

    /// Averaged class probabilities for `x`.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(x);
            let total: f64 = leaf.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (p, v) in proba.iter_mut().zip(leaf) {
                *p += v / total;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }
}

impl Classifier for RandomForest {
    fn id(&self) -> ModelId {
        ModelId::TreeEnsemble
    }

    fn predict(&self, features: &OrderedFeatureVector) -> RawLabel {
        let proba = self.predict_proba(features.as_slice());
        class_label(&self.classes, argmax(&proba))
    }

    fn summary(&self) -> String {
        let max_depth = self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0);
        format!(
            "trees={} max_depth={} classes={:?}",
            self.trees.len(),
            max_depth,
            self.classes
        )
    }
}
