//! Activation functions and class-selection helpers for the classifiers.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Element-wise activation applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Identity,
    Logistic,
    Tanh,
    Relu,
    Softmax,
}

impl Activation {
    pub fn apply(self, z: &mut DVector<f64>) {
        match self {
            Activation::Identity => {}
            Activation::Logistic => z.apply(|v| *v = logistic(*v)),
            Activation::Tanh => z.apply(|v| *v = v.tanh()),
            Activation::Relu => z.apply(|v| *v = v.max(0.0)),
            Activation::Softmax => softmax_in_place(z),
        }
    }
}

/// Numerically stable logistic sigmoid.
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Infinite logits are clamped to the finite range first, so an overflowing
/// logit still wins instead of turning every score into NaN.
fn softmax_in_place(z: &mut DVector<f64>) {
    z.apply(|v| *v = v.clamp(f64::MIN, f64::MAX));
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    z.apply(|v| *v = (*v - max).exp());
    let sum = z.sum();
    if sum > 0.0 {
        *z /= sum;
    }
}

/// Index of the largest value; ties resolve to the lowest index.
///
/// Returns `None` for an empty slice or when every value is NaN.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}
