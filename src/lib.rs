//! `stroke-risk` library crate.
//!
//! The binary (`stroke`) is a thin wrapper around this library so that:
//!
//! - the inference pipeline is testable without spawning processes
//! - a web layer can embed `app::Predictor` directly
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
