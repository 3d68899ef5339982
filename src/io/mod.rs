//! Input/output helpers.
//!
//! - classifier artifacts (JSON) with load-time validation (`artifacts`)
//! - raw submissions from flags, JSON, and CSV (`form`)
//! - result exports (CSV/JSON) (`export`)

pub mod artifacts;
pub mod export;
pub mod form;

pub use artifacts::*;
pub use export::*;
pub use form::*;
