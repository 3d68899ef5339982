//! Synthetic submission generation for smoke-testing an artifact deployment.
//!
//! Values are drawn to look like real form entries:
//! - binary and categorical fields uniformly over their codes
//! - age, BMI, and glucose from clamped normal distributions
//!
//! A configurable share of submissions gets one field blanked so the
//! rejection path is exercised too.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FormField, RawInputMap};
use crate::error::{AppError, EXIT_INPUT};

/// Parameters for `generate_submissions`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Share of submissions (0..=1) with one blank field.
    pub invalid_share: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 100,
            seed: 42,
            invalid_share: 0.0,
        }
    }
}

/// Mean, standard deviation, and clamp range of a continuous field.
struct Continuous {
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
    decimals: usize,
}

const AGE: Continuous = Continuous {
    mean: 45.0,
    std: 20.0,
    min: 1.0,
    max: 95.0,
    decimals: 0,
};

const BMI: Continuous = Continuous {
    mean: 28.5,
    std: 7.0,
    min: 12.0,
    max: 70.0,
    decimals: 1,
};

const GLUCOSE: Continuous = Continuous {
    mean: 106.0,
    std: 45.0,
    min: 55.0,
    max: 280.0,
    decimals: 2,
};

/// Number of codes a categorical field takes (`0..n`).
fn category_count(field: FormField) -> Option<u32> {
    match field {
        FormField::Gender
        | FormField::Hypertension
        | FormField::HeartDisease
        | FormField::EverMarried
        | FormField::ResidenceType => Some(2),
        FormField::SmokingStatus => Some(4),
        FormField::WorkType => Some(5),
        FormField::Age | FormField::Bmi | FormField::Glucose => None,
    }
}

/// Generate `config.count` raw submissions. Same config, same output.
pub fn generate_submissions(config: &SampleConfig) -> Result<Vec<RawInputMap>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(EXIT_INPUT, "Sample count must be > 0."));
    }
    if !(0.0..=1.0).contains(&config.invalid_share) {
        return Err(AppError::new(EXIT_INPUT, "Invalid share must be between 0 and 1."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let mut raw = RawInputMap::new();
        for field in FormField::ALL {
            let value = match (category_count(field), field) {
                (Some(n), _) => rng.gen_range(0..n).to_string(),
                (None, FormField::Age) => continuous(&AGE, normal.sample(&mut rng)),
                (None, FormField::Bmi) => continuous(&BMI, normal.sample(&mut rng)),
                (None, _) => continuous(&GLUCOSE, normal.sample(&mut rng)),
            };
            raw.insert(field.wire_name(), value);
        }

        if rng.gen_bool(config.invalid_share) {
            let field = FormField::ALL[rng.gen_range(0..FormField::ALL.len())];
            raw.insert(field.wire_name(), "");
        }
        out.push(raw);
    }

    tracing::debug!(count = out.len(), seed = config.seed, "generated synthetic submissions");
    Ok(out)
}

fn continuous(dist: &Continuous, z: f64) -> String {
    let v = (dist.mean + dist.std * z).clamp(dist.min, dist.max);
    format!("{v:.prec$}", prec = dist.decimals)
}
