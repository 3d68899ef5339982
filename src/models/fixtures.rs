//! In-memory artifacts shared by tests across the crate.

use std::path::Path;

use crate::domain::{ArtifactPaths, FEATURE_COUNT, ModelId, OrderedFeatureVector, RawLabel};
use crate::math::{Activation, MinMaxScaler};
use crate::models::{
    Classifier, DecisionTree, DenseLayer, KnnModel, NeighborWeights, NetworkArtifact, RandomForest,
    TreeNode,
};

/// Always answers with the same label.
#[derive(Debug, Clone)]
pub(crate) struct FixedClassifier {
    pub id: ModelId,
    pub label: RawLabel,
}

impl Classifier for FixedClassifier {
    fn id(&self) -> ModelId {
        self.id
    }

    fn predict(&self, _features: &OrderedFeatureVector) -> RawLabel {
        self.label
    }

    fn summary(&self) -> String {
        format!("fixed label {}", self.label)
    }
}

/// Model-order vector with only age (position 1) and glucose (position 7) set.
fn sample(age: f64, glucose: f64) -> Vec<f64> {
    let mut v = vec![0.0; FEATURE_COUNT];
    v[1] = age;
    v[7] = glucose;
    v
}

pub(crate) fn knn() -> KnnModel {
    KnnModel {
        k: 3,
        p: 2.0,
        weights: NeighborWeights::Uniform,
        classes: vec![0, 1],
        samples: vec![
            sample(25.0, 85.0),
            sample(35.0, 95.0),
            sample(45.0, 100.0),
            sample(70.0, 210.0),
            sample(78.0, 230.0),
            sample(82.0, 250.0),
        ],
        labels: vec![0, 0, 0, 1, 1, 1],
    }
}

/// Age above 60 and glucose above 180 is at risk.
pub(crate) fn forest() -> RandomForest {
    RandomForest {
        classes: vec![0, 1],
        n_features: FEATURE_COUNT,
        trees: vec![DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 1,
                    threshold: 60.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![95.0, 5.0],
                },
                TreeNode::Split {
                    feature: 7,
                    threshold: 180.0,
                    left: 3,
                    right: 4,
                },
                TreeNode::Leaf {
                    value: vec![70.0, 30.0],
                },
                TreeNode::Leaf {
                    value: vec![20.0, 80.0],
                },
            ],
        }],
    }
}

/// Risk rises with scaled age; decision boundary at age 50.
pub(crate) fn network() -> NetworkArtifact {
    let mut hidden = vec![vec![0.0]; FEATURE_COUNT];
    hidden[1][0] = 1.0;
    NetworkArtifact {
        classes: vec![0, 1],
        hidden_activation: Activation::Relu,
        output_activation: Activation::Logistic,
        layers: vec![
            DenseLayer {
                weights: hidden,
                biases: vec![0.0],
            },
            DenseLayer {
                weights: vec![vec![10.0]],
                biases: vec![-5.0],
            },
        ],
    }
}

pub(crate) fn scaler() -> MinMaxScaler {
    let mut data_min = vec![0.0; FEATURE_COUNT];
    let mut data_max = vec![1.0; FEATURE_COUNT];
    data_max[1] = 100.0;
    data_min[7] = 50.0;
    data_max[7] = 300.0;
    data_max[8] = 60.0;
    data_max[9] = 3.0;
    data_max[5] = 4.0;
    data_max[6] = 1.0;
    MinMaxScaler {
        data_min,
        data_max,
        feature_range: [0.0, 1.0],
    }
}

/// Write the fixture artifacts as JSON files under `dir`.
pub(crate) fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::from_dir(dir);
    write_json(&paths.distance, &knn());
    write_json(&paths.tree_ensemble, &forest());
    write_json(&paths.neural_network, &network());
    write_json(&paths.scaler, &scaler());
    paths
}

pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    let file = std::fs::File::create(path).unwrap();
    serde_json::to_writer_pretty(file, value).unwrap();
}
