//! Feed-forward neural network classifier with its paired min-max scaler.
//!
//! The artifact stores each dense layer as an `in x out` weight table plus a
//! bias vector. On load the tables are converted into `out x in` matrices so a
//! forward step is a single matrix-vector product:
//!
//! ```text
//! a_{l+1} = act(W_l * a_l + b_l)
//! ```
//!
//! Hidden layers share one activation; the output layer uses either a single
//! logistic unit (binary, threshold 0.5) or softmax over all classes.
//!
//! Unlike the other two models, inputs are scaled first with the scaler fitted
//! during training.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, ModelId, OrderedFeatureVector, RawLabel};
use crate::math::{Activation, MinMaxScaler, argmax};
use crate::models::model::{Classifier, class_label, validate_classes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// `weights[i][o]`: input `i` to output `o`.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

fn default_hidden() -> Activation {
    Activation::Relu
}

fn default_output() -> Activation {
    Activation::Logistic
}

/// Serialized network as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkArtifact {
    pub classes: Vec<i64>,
    #[serde(default = "default_hidden")]
    pub hidden_activation: Activation,
    #[serde(default = "default_output")]
    pub output_activation: Activation,
    pub layers: Vec<DenseLayer>,
}

/// A validated network ready for inference, paired with its scaler.
#[derive(Debug, Clone)]
pub struct ScaledNetwork {
    classes: Vec<i64>,
    hidden_activation: Activation,
    output_activation: Activation,
    layers: Vec<(DMatrix<f64>, DVector<f64>)>,
    scaler: MinMaxScaler,
}

impl ScaledNetwork {
    /// Validate both artifacts and build the inference form.
    pub fn new(artifact: NetworkArtifact, scaler: MinMaxScaler) -> Result<Self, String> {
        validate_classes(&artifact.classes)?;
        scaler.validate()?;
        if matches!(artifact.hidden_activation, Activation::Softmax) {
            return Err("softmax is not a valid hidden activation".to_string());
        }
        if !matches!(artifact.output_activation, Activation::Logistic | Activation::Softmax) {
            return Err(format!(
                "output activation must be logistic or softmax, got {:?}",
                artifact.output_activation
            ));
        }
        if artifact.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut layers = Vec::with_capacity(artifact.layers.len());
        let mut width = FEATURE_COUNT;
        for (idx, layer) in artifact.layers.iter().enumerate() {
            if layer.weights.len() != width {
                return Err(format!(
                    "layer {idx} expects {} inputs, previous layer produces {width}",
                    layer.weights.len()
                ));
            }
            let out = layer.biases.len();
            if out == 0 {
                return Err(format!("layer {idx} has no outputs"));
            }
            if let Some(row) = layer.weights.iter().position(|r| r.len() != out) {
                return Err(format!("layer {idx}: weight row {row} does not have {out} columns"));
            }
            let finite = layer.biases.iter().all(|v| v.is_finite())
                && layer.weights.iter().flatten().all(|v| v.is_finite());
            if !finite {
                return Err(format!("layer {idx} contains non-finite parameters"));
            }
            let w = DMatrix::from_fn(out, width, |r, c| layer.weights[c][r]);
            let b = DVector::from_column_slice(&layer.biases);
            layers.push((w, b));
            width = out;
        }

        let n_classes = artifact.classes.len();
        let outputs_ok = match artifact.output_activation {
            Activation::Logistic => width == 1 && n_classes == 2,
            _ => width == n_classes,
        };
        if !outputs_ok {
            return Err(format!(
                "{width} output units with {:?} output cannot encode {n_classes} classes",
                artifact.output_activation
            ));
        }

        Ok(Self {
            classes: artifact.classes,
            hidden_activation: artifact.hidden_activation,
            output_activation: artifact.output_activation,
            layers,
            scaler,
        })
    }

    /// Output-layer activations for an unscaled model-order vector.
    pub fn forward(&self, features: &OrderedFeatureVector) -> DVector<f64> {
        let scaled = self.scaler.transform(features.as_slice());
        let mut a = DVector::from_vec(scaled);
        let last = self.layers.len() - 1;
        for (idx, (w, b)) in self.layers.iter().enumerate() {
            let mut z = w * &a + b;
            let act = if idx == last {
                self.output_activation
            } else {
                self.hidden_activation
            };
            act.apply(&mut z);
            a = z;
        }
        a
    }
}

impl Classifier for ScaledNetwork {
    fn id(&self) -> ModelId {
        ModelId::NeuralNetwork
    }

    fn predict(&self, features: &OrderedFeatureVector) -> RawLabel {
        let out = self.forward(features);
        let idx = match self.output_activation {
            Activation::Logistic => Some(usize::from(out[0] > 0.5)),
            _ => argmax(out.as_slice()),
        };
        class_label(&self.classes, idx)
    }

    fn summary(&self) -> String {
        let widths: Vec<String> = std::iter::once(FEATURE_COUNT)
            .chain(self.layers.iter().map(|(w, _)| w.nrows()))
            .map(|n| n.to_string())
            .collect();
        format!(
            "layers={} hidden={:?} output={:?} classes={:?} (min-max scaled)",
            widths.join("-"),
            self.hidden_activation,
            self.output_activation,
            self.classes
        )
    }
}
