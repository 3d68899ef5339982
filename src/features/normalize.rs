//! Submission normalization.
//!
//! Turns a raw form map into a `FeatureVector`:
//! - **Strict count**: exactly `FEATURE_COUNT` entries
//! - **Strict values**: every field present, non-blank, and a finite number
//! - **Submission order**: values land at their `FormField` index regardless of
//!   the order the map was filled in
//!
//! Nothing here knows about model order; see `features::order`.

use crate::domain::{FEATURE_COUNT, FeatureVector, FormField, RawInputMap};
use crate::error::NormalizationError;

/// Parse and validate a raw submission.
pub fn normalize(raw: &RawInputMap) -> Result<FeatureVector, NormalizationError> {
    if raw.len() != FEATURE_COUNT {
        return Err(NormalizationError::WrongCount {
            expected: FEATURE_COUNT,
            actual: raw.len(),
        });
    }

    let mut values = [0.0; FEATURE_COUNT];
    for field in FormField::ALL {
        let value = raw
            .get_field(field)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NormalizationError::MissingField {
                field: field.wire_name().to_string(),
            })?;
        values[field.submission_index()] = parse_value(field, value)?;
    }

    let vector = FeatureVector::from_validated(values);
    tracing::debug!(values = ?vector.values(), "normalized submission");
    Ok(vector)
}

fn parse_value(field: FormField, value: &str) -> Result<f64, NormalizationError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(NormalizationError::NotNumeric {
            field: field.wire_name().to_string(),
            value: value.to_string(),
        }),
    }
}
