//! Min-max feature scaling with statistics captured at training time.
//!
//! ```text
//! x' = lo + (x - data_min) * (hi - lo) / (data_max - data_min)
//! ```
//!
//! A constant training column (`data_max == data_min`) uses a unit range so the
//! transform stays finite. Values outside the training range are not clipped.

use serde::{Deserialize, Serialize};

use crate::domain::FEATURE_COUNT;

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Fitted min-max scaler, one entry per model-order feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: [f64; 2],
}

impl MinMaxScaler {
    /// Check shapes and values; returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_min.len() != FEATURE_COUNT || self.data_max.len() != FEATURE_COUNT {
            return Err(format!(
                "scaler expects {FEATURE_COUNT} features, got data_min={} data_max={}",
                self.data_min.len(),
                self.data_max.len()
            ));
        }
        let [lo, hi] = self.feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(format!("invalid feature_range [{lo}, {hi}]"));
        }
        for (idx, (min, max)) in self.data_min.iter().zip(&self.data_max).enumerate() {
            if !(min.is_finite() && max.is_finite()) {
                return Err(format!("non-finite statistics for feature {idx}"));
            }
            if max < min {
                return Err(format!("data_max < data_min for feature {idx}"));
            }
        }
        Ok(())
    }

    /// Scale one vector. Assumes `validate` passed.
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        let [lo, hi] = self.feature_range;
        x.iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(&v, (&min, &max))| {
                let range = max - min;
                let range = if range == 0.0 { 1.0 } else { range };
                lo + (v - min) * (hi - lo) / range
            })
            .collect()
    }
}
