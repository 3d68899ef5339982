//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the form schema (`FormField`) and raw submissions (`RawInputMap`)
//! - feature vectors in submission and model order
//! - ensemble outputs, decisions, and presentation payloads
//! - startup configuration (`PredictorConfig`, `ArtifactPaths`)

pub mod types;

pub use types::*;
