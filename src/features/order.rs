//! Submission order -> model order.
//!
//! The classifiers were trained on columns in a different order than the form
//! collects them. `MODEL_ORDER[i]` is the submission index whose value goes to
//! model position `i`:
//!
//! ```text
//! model pos : 0       1    2             3             4            5         6              7        8    9
//! field     : gender  age  hypertension  heartDisease  everMarried  workType  residenceType  glucose  bmi  smokingStatus
//! ```
//!
//! The table is versioned together with the training pipeline. Any change to the
//! form layout or to the training column order must bump `FEATURE_ORDER_VERSION`
//! and ship retrained artifacts at the same time.

use crate::domain::{FEATURE_COUNT, FeatureVector, FormField, OrderedFeatureVector};

/// Version tag of the permutation below.
pub const FEATURE_ORDER_VERSION: &str = "v1";

/// Submission index placed at each model position.
pub const MODEL_ORDER: [usize; FEATURE_COUNT] = [0, 7, 1, 2, 3, 6, 5, 9, 8, 4];

/// Form fields in model order.
pub fn model_order_fields() -> [FormField; FEATURE_COUNT] {
    MODEL_ORDER.map(|idx| FormField::ALL[idx])
}

/// Permute a normalized vector into model order.
pub fn remap(features: &FeatureVector) -> OrderedFeatureVector {
    let values = features.values();
    OrderedFeatureVector::from_permuted(MODEL_ORDER.map(|idx| values[idx]))
}

/// Inverse of `remap`: model order back to submission order.
pub fn restore(ordered: &OrderedFeatureVector) -> FeatureVector {
    let values = ordered.values();
    let mut out = [0.0; FEATURE_COUNT];
    for (model_pos, &submission_idx) in MODEL_ORDER.iter().enumerate() {
        out[submission_idx] = values[model_pos];
    }
    FeatureVector::from_validated(out)
}
