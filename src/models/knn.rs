//! k-nearest-neighbor classifier (the ensemble's distance-based model).
//!
//! The artifact stores the full training set in model order. Prediction:
//! 1. compute the Minkowski distance to every stored sample
//! 2. keep the `k` closest (ties broken by sample order)
//! 3. vote, either one vote per neighbor or weighted by inverse distance
//!
//! Inputs are consumed unscaled.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, ModelId, OrderedFeatureVector, RawLabel};
use crate::math::{argmax, minkowski};
use crate::models::model::{Classifier, class_label, validate_classes};

/// How neighbor votes are weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborWeights {
    #[default]
    Uniform,
    /// `1 / distance`; exact matches outvote everything else.
    Distance,
}

fn default_p() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnModel {
    pub k: usize,
    #[serde(default = "default_p")]
    pub p: f64,
    #[serde(default)]
    pub weights: NeighborWeights,
    pub classes: Vec<i64>,
    /// Training samples in model order.
    pub samples: Vec<Vec<f64>>,
    /// Class index (into `classes`) of each sample.
    pub labels: Vec<usize>,
}

impl KnnModel {
    pub fn validate(&self) -> Result<(), String> {
        validate_classes(&self.classes)?;
        if self.samples.is_empty() {
            return Err("no training samples".to_string());
        }
        if self.k == 0 || self.k > self.samples.len() {
            return Err(format!(
                "k={} must be in 1..={} (sample count)",
                self.k,
                self.samples.len()
            ));
        }
        if !(self.p.is_finite() && self.p >= 1.0) {
            return Err(format!("Minkowski p={} must be >= 1", self.p));
        }
        if self.labels.len() != self.samples.len() {
            return Err(format!(
                "{} labels for {} samples",
                self.labels.len(),
                self.samples.len()
            ));
        }
        for (idx, sample) in self.samples.iter().enumerate() {
            if sample.len() != FEATURE_COUNT {
                return Err(format!(
                    "sample {idx} has {} features, expected {FEATURE_COUNT}",
                    sample.len()
                ));
            }
            if sample.iter().any(|v| !v.is_finite()) {
                return Err(format!("sample {idx} contains non-finite values"));
            }
        }
        if let Some(bad) = self.labels.iter().find(|&&l| l >= self.classes.len()) {
            return Err(format!("label index {bad} out of range"));
        }
        Ok(())
    }

    fn neighbors(&self, x: &[f64]) -> Vec<(usize, f64)> {
        let mut dists: Vec<(usize, f64)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(idx, s)| (idx, minkowski(x, s, self.p)))
            .collect();
        // Stable sort keeps sample order among equal distances.
        dists.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        dists.truncate(self.k);
        dists
    }

    fn votes(&self, neighbors: &[(usize, f64)]) -> Vec<f64> {
        let mut votes = vec![0.0; self.classes.len()];
        match self.weights {
            NeighborWeights::Uniform => {
                for &(idx, _) in neighbors {
                    votes[self.labels[idx]] += 1.0;
                }
            }
            NeighborWeights::Distance => {
                let exact: Vec<usize> = neighbors
                    .iter()
                    .filter(|(_, d)| *d == 0.0)
                    .map(|(idx, _)| *idx)
                    .collect();
                if exact.is_empty() {
                    for &(idx, d) in neighbors {
                        votes[self.labels[idx]] += 1.0 / d;
                    }
                } else {
                    for idx in exact {
                        votes[self.labels[idx]] += 1.0;
                    }
                }
            }
        }
        votes
    }
}

impl Classifier for KnnModel {
    fn id(&self) -> ModelId {
        ModelId::Distance
    }

    fn predict(&self, features: &OrderedFeatureVector) -> RawLabel {
        let neighbors = self.neighbors(features.as_slice());
        let votes = self.votes(&neighbors);
        class_label(&self.classes, argmax(&votes))
    }

    fn summary(&self) -> String {
        format!(
            "k={} p={} weights={:?} samples={} classes={:?}",
            self.k,
            self.p,
            self.weights,
            self.samples.len(),
            self.classes
        )
    }
}
