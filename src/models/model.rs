//! The classifier seam shared by every artifact kind.
//!
//! The ensemble relies on one primitive operation:
//! - predict a class label for a model-order feature vector
//!
//! Implementations are immutable after load so a single instance can serve
//! concurrent requests without locking.

use crate::domain::{ModelId, OrderedFeatureVector, RawLabel};

/// A loaded, validated classifier.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Which ensemble slot this classifier fills.
    fn id(&self) -> ModelId;

    /// Predict a class label. Infallible once the artifact passed validation.
    fn predict(&self, features: &OrderedFeatureVector) -> RawLabel;

    /// One-line description of the loaded artifact for diagnostics.
    fn summary(&self) -> String;
}

/// Map a winning class index to the artifact's class code.
pub(crate) fn class_label(classes: &[i64], idx: Option<usize>) -> RawLabel {
    // Validation guarantees `classes` is non-empty and sized to the outputs, so the
    // fallback only triggers when every score was NaN.
    match idx.and_then(|i| classes.get(i)) {
        Some(&code) => RawLabel(code),
        None => RawLabel(i64::MIN),
    }
}

/// Shared checks on a `classes` list.
pub(crate) fn validate_classes(classes: &[i64]) -> Result<(), String> {
    if classes.is_empty() {
        return Err("classes must not be empty".to_string());
    }
    for (i, c) in classes.iter().enumerate() {
        if classes[..i].contains(c) {
            return Err(format!("duplicate class code {c}"));
        }
    }
    Ok(())
}
