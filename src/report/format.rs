//! Formatted terminal output for the `stroke` binary.
//!
//! Formatting lives here so the pipeline stays free of presentation details
//! and output changes stay in one file.

use crate::domain::{Decision, ModelId, PolicyKind, PredictionOutcome, PredictorConfig, RawLabel};
use crate::ensemble::ModelSummary;
use crate::features::{FEATURE_ORDER_VERSION, model_order_fields};

/// Decision counts over many submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionTally {
    pub no_risk: usize,
    pub at_risk: usize,
    pub error: usize,
    /// Submissions each model labelled at-risk.
    pub risk_votes: [usize; 3],
}

impl DecisionTally {
    pub fn from_outcomes(outcomes: &[PredictionOutcome]) -> Self {
        let mut tally = Self::default();
        for outcome in outcomes {
            match outcome.decision {
                Decision::NoRisk => tally.no_risk += 1,
                Decision::AtRisk => tally.at_risk += 1,
                Decision::Error => tally.error += 1,
            }
            if let Some(outputs) = &outcome.outputs {
                for (slot, id) in ModelId::ALL.iter().enumerate() {
                    if outputs.get(*id) == Some(RawLabel::AT_RISK) {
                        tally.risk_votes[slot] += 1;
                    }
                }
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.no_risk + self.at_risk + self.error
    }
}

/// One prediction: decision, presentation, and per-model labels.
pub fn format_outcome(outcome: &PredictionOutcome, policy: PolicyKind) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", outcome.presentation.label_text));
    out.push_str(&format!("asset   : {}\n", outcome.presentation.asset_key.as_str()));
    out.push_str(&format!("decision: {} (policy={policy:?})\n", outcome.decision.as_str()));

    match (&outcome.outputs, &outcome.error) {
        (_, Some(err)) => out.push_str(&format!("rejected: {err}\n")),
        (Some(outputs), None) => {
            out.push_str("\nModel outputs:\n");
            for id in ModelId::ALL {
                let label = outputs
                    .get(id)
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!("  {:<20} {label}\n", id.display_name()));
            }
        }
        (None, None) => {}
    }
    out
}

/// What `stroke check` found in the artifact directory.
pub fn format_check(models: &[ModelSummary], config: &PredictorConfig) -> String {
    let mut out = String::new();
    out.push_str("=== stroke - artifact check ===\n");
    out.push_str(&format!("distance      : {}\n", config.artifacts.distance.display()));
    out.push_str(&format!("tree ensemble : {}\n", config.artifacts.tree_ensemble.display()));
    out.push_str(&format!("neural network: {}\n", config.artifacts.neural_network.display()));
    out.push_str(&format!("scaler        : {}\n", config.artifacts.scaler.display()));
    out.push_str(&format!("policy        : {:?}\n", config.policy));
    if config.policy == PolicyKind::Weighted {
        let weights: Vec<String> = ModelId::ALL
            .iter()
            .map(|id| format!("{}={}", id.name(), config.weights.get(id).copied().unwrap_or(1.0)))
            .collect();
        out.push_str(&format!(
            "weights       : {} (threshold {})\n",
            weights.join(", "),
            config.threshold
        ));
    }

    let fields: Vec<&str> = model_order_fields().iter().map(|f| f.wire_name()).collect();
    out.push_str(&format!(
        "feature order : {FEATURE_ORDER_VERSION} [{}]\n",
        fields.join(", ")
    ));

    out.push_str("\nLoaded models:\n");
    for m in models {
        out.push_str(&format!("- {:<20} {}\n", m.id.display_name(), m.detail));
    }
    out
}

/// Decision counts, e.g. after `stroke sample` or `stroke batch`.
pub fn format_tally(title: &str, tally: &DecisionTally) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {title} ===\n"));
    out.push_str(&format!("submissions: {}\n", tally.total()));
    out.push_str(&format!("{:<10} {:>6} {:>7}\n", "decision", "count", "share"));
    for (name, count) in [
        (Decision::NoRisk.as_str(), tally.no_risk),
        (Decision::AtRisk.as_str(), tally.at_risk),
        (Decision::Error.as_str(), tally.error),
    ] {
        out.push_str(&format!("{name:<10} {count:>6} {:>6.1}%\n", pct(count, tally.total())));
    }

    out.push_str("\nAt-risk votes per model:\n");
    for (slot, id) in ModelId::ALL.iter().enumerate() {
        out.push_str(&format!("  {:<20} {:>6}\n", id.display_name(), tally.risk_votes[slot]));
    }
    out
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}
