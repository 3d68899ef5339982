//! Ensemble execution and decision resolution.
//!
//! Responsibilities:
//!
//! - load the three classifiers once and run them per submission (`runner`)
//! - hold the loaded runner and swap it atomically on reload (`store`)
//! - reduce per-model labels to a decision (`policy`)

pub mod policy;
pub mod runner;
pub mod store;

pub use policy::*;
pub use runner::*;
pub use store::*;
