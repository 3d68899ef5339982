//! Command-line parsing for the stroke-risk predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline; `app` turns these structs into a `PredictorConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{ModelId, PolicyKind};
use crate::io::parse_field_arg;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stroke", version, about = "Stroke-risk ensemble predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate one submission and print its label and asset.
    Predict(PredictArgs),
    /// Evaluate every row of a CSV file and write a results CSV.
    Batch(BatchArgs),
    /// Run seeded synthetic submissions through the pipeline and summarize.
    Sample(SampleArgs),
    /// Load the artifacts and describe what was loaded.
    Check(ModelArgs),
}

/// Where the artifacts live and how their outputs are combined.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Artifact directory (falls back to STROKE_ARTIFACT_DIR, then `models`).
    #[arg(long, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Decision policy.
    #[arg(long, value_enum, default_value_t = PolicyKind::Tree)]
    pub policy: PolicyKind,

    /// Vote weight for `--policy weighted`, as MODEL=WEIGHT (repeatable).
    #[arg(long = "weight", value_name = "MODEL=WEIGHT", value_parser = parse_weight_arg)]
    pub weights: Vec<(ModelId, f64)>,

    /// Risk share at or above which `--policy weighted` reports at-risk.
    #[arg(long, default_value_t = 0.5)]
    pub threshold: f64,
}

/// Output format for `predict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Form field as NAME=VALUE (repeatable, order kept).
    #[arg(short = 'f', long = "field", value_name = "NAME=VALUE", value_parser = parse_field_arg)]
    pub fields: Vec<(String, String)>,

    /// JSON object with the form fields (instead of --field).
    #[arg(long, value_name = "JSON", conflicts_with = "fields")]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the JSON report to a file.
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// CSV of submissions; the header row names the fields.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Results CSV to write.
    #[arg(long, value_name = "CSV")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of synthetic submissions.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of submissions (0..=1) with one field blanked.
    #[arg(long, default_value_t = 0.0)]
    pub invalid_share: f64,

    /// Also write per-submission results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Parse `MODEL=WEIGHT` where MODEL is `distance`, `tree_ensemble`, or `neural_network`.
pub fn parse_weight_arg(arg: &str) -> Result<(ModelId, f64), String> {
    let (name, weight) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected MODEL=WEIGHT, got {arg:?}"))?;
    let name = name.trim();
    let id = ModelId::ALL
        .into_iter()
        .find(|id| id.name() == name)
        .ok_or_else(|| {
            let known: Vec<&str> = ModelId::ALL.iter().map(|id| id.name()).collect();
            format!("unknown model {name:?} (expected one of {})", known.join(", "))
        })?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("weight must be a number, got {weight:?}"))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be finite and >= 0, got {weight}"));
    }
    Ok((id, weight))
}
