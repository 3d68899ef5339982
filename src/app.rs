//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments into a `PredictorConfig`
//! - loads the artifacts once
//! - runs submissions through the pipeline
//! - prints reports and writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, ModelArgs, OutputFormat, PredictArgs, SampleArgs};
use crate::data::{SampleConfig, generate_submissions};
use crate::domain::{ArtifactPaths, PredictorConfig, RawInputMap};
use crate::error::{AppError, EXIT_INPUT};
use crate::io::PredictionReport;
use crate::report::DecisionTally;

pub mod pipeline;

pub use pipeline::Predictor;

/// Environment variable naming the artifact directory.
pub const ARTIFACT_DIR_ENV: &str = "STROKE_ARTIFACT_DIR";
/// Artifact directory used when neither the CLI nor the environment names one.
pub const DEFAULT_ARTIFACT_DIR: &str = "models";

/// Entry point for the `stroke` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Batch(args) => handle_batch(args),
        Command::Sample(args) => handle_sample(args),
        Command::Check(args) => handle_check(args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = predictor_config_from_args(&args.model)?;
    let raw = match &args.input {
        Some(path) => crate::io::read_form_json(path)?,
        None => crate::io::raw_from_pairs(&args.fields),
    };
    if raw.is_empty() {
        return Err(AppError::new(
            EXIT_INPUT,
            "No form fields given. Use --field NAME=VALUE or --input FILE.json.",
        ));
    }

    let predictor = Predictor::from_config(&config)?;
    let outcome = predictor.evaluate(&raw);
    let report = PredictionReport::new(&outcome, predictor.policy(), chrono::Utc::now());

    match args.format {
        OutputFormat::Text => print!("{}", crate::report::format_outcome(&outcome, predictor.policy())),
        OutputFormat::Json => println!("{}", crate::io::report_to_json(&report)?),
    }
    if let Some(path) = &args.report {
        crate::io::write_report_json(path, &report)?;
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = predictor_config_from_args(&args.model)?;
    let raws = crate::io::read_batch_csv(&args.input)?;
    let predictor = Predictor::from_config(&config)?;

    let outcomes = predictor.evaluate_batch(&raws);
    crate::io::write_batch_csv(&args.output, &outcomes)?;
    tracing::info!(rows = outcomes.len(), output = %args.output.display(), "batch written");

    let title = format!("stroke - batch {}", args.input.display());
    print!("{}", crate::report::format_tally(&title, &DecisionTally::from_outcomes(&outcomes)));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = predictor_config_from_args(&args.model)?;
    let sample = SampleConfig {
        count: args.count,
        seed: args.seed,
        invalid_share: args.invalid_share,
    };
    let raws: Vec<RawInputMap> = generate_submissions(&sample)?;
    let predictor = Predictor::from_config(&config)?;

    let outcomes = predictor.evaluate_batch(&raws);
    if let Some(path) = &args.export {
        crate::io::write_batch_csv(path, &outcomes)?;
    }

    let title = format!("stroke - sample n={} seed={}", sample.count, sample.seed);
    print!("{}", crate::report::format_tally(&title, &DecisionTally::from_outcomes(&outcomes)));
    Ok(())
}

fn handle_check(args: ModelArgs) -> Result<(), AppError> {
    let config = predictor_config_from_args(&args)?;
    let predictor = Predictor::from_config(&config)?;
    let models = predictor.store().snapshot().describe();
    print!("{}", crate::report::format_check(&models, &config));
    Ok(())
}

/// Build the predictor configuration from CLI flags and the environment.
pub fn predictor_config_from_args(args: &ModelArgs) -> Result<PredictorConfig, AppError> {
    if !(0.0..=1.0).contains(&args.threshold) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Threshold must be between 0 and 1, got {}.", args.threshold),
        ));
    }

    dotenvy::dotenv().ok();
    let dir = artifact_dir(args.artifacts.as_deref(), std::env::var(ARTIFACT_DIR_ENV).ok());
    tracing::debug!(dir = %dir.display(), "artifact directory");

    let mut config = PredictorConfig::new(ArtifactPaths::from_dir(&dir));
    config.policy = args.policy;
    config.weights = args.weights.iter().copied().collect();
    config.threshold = args.threshold;
    Ok(config)
}

/// CLI flag, then environment, then `models`.
fn artifact_dir(cli: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(dir) = cli {
        return dir.to_path_buf();
    }
    match env {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
        _ => PathBuf::from(DEFAULT_ARTIFACT_DIR),
    }
}
