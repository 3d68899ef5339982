//! Export prediction results.
//!
//! - batch results as CSV (one row per submission, spreadsheet friendly)
//! - a single prediction as a JSON report for scripts and the web layer

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AssetKey, Decision, ModelId, PolicyKind, PredictionOutcome, RawLabel};
use crate::error::{AppError, EXIT_OUTPUT};

/// One line of the batch results CSV.
#[derive(Debug, Serialize)]
struct BatchRow<'a> {
    row: usize,
    decision: &'static str,
    label_text: &'a str,
    asset_key: &'static str,
    distance: Option<i64>,
    tree_ensemble: Option<i64>,
    neural_network: Option<i64>,
    error: Option<String>,
}

impl<'a> BatchRow<'a> {
    fn new(row: usize, outcome: &'a PredictionOutcome) -> Self {
        let label = |id: ModelId| {
            outcome
                .outputs
                .as_ref()
                .and_then(|o| o.get(id))
                .map(|l| l.0)
        };
        Self {
            row,
            decision: outcome.decision.as_str(),
            label_text: &outcome.presentation.label_text,
            asset_key: outcome.presentation.asset_key.as_str(),
            distance: label(ModelId::Distance),
            tree_ensemble: label(ModelId::TreeEnsemble),
            neural_network: label(ModelId::NeuralNetwork),
            error: outcome.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Write batch results to a CSV file. Rows are numbered from 1.
pub fn write_batch_csv(path: &Path, outcomes: &[PredictionOutcome]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_OUTPUT,
            format!("Failed to create results CSV '{}': {e}", path.display()),
        )
    })?;
    write_batch(file, outcomes)
}

/// Same as `write_batch_csv` for any writer.
pub fn write_batch<W: Write>(writer: W, outcomes: &[PredictionOutcome]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(writer);
    for (idx, outcome) in outcomes.iter().enumerate() {
        writer
            .serialize(BatchRow::new(idx + 1, outcome))
            .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write results CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to flush results CSV: {e}")))?;
    Ok(())
}

/// JSON report of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub label_text: String,
    pub asset_key: AssetKey,
    pub decision: Decision,
    pub policy: PolicyKind,
    pub outputs: BTreeMap<ModelId, RawLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl PredictionReport {
    pub fn new(outcome: &PredictionOutcome, policy: PolicyKind, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            label_text: outcome.presentation.label_text.clone(),
            asset_key: outcome.presentation.asset_key,
            decision: outcome.decision,
            policy,
            outputs: outcome
                .outputs
                .as_ref()
                .map(|o| o.iter().collect())
                .unwrap_or_default(),
            error: outcome.error.as_ref().map(|e| e.to_string()),
            evaluated_at,
        }
    }
}

pub fn report_to_json(report: &PredictionReport) -> Result<String, AppError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to serialize report: {e}")))
}

/// Write a JSON report file.
pub fn write_report_json(path: &Path, report: &PredictionReport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_OUTPUT,
            format!("Failed to create report JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}
