//! Data sources other than user input.
//!
//! - seeded synthetic submissions for `stroke sample` (`sample`)

pub mod sample;

pub use sample::*;
