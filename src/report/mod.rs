//! Presentation: decisions to user-facing payloads, plus terminal formatting.
//!
//! `present` is the only thing the rendering layer needs; `format` holds the
//! text the `stroke` binary prints.

use crate::domain::{AssetKey, Decision, PresentationState};

pub mod format;

pub use format::*;

pub const NO_RISK_TEXT: &str = "No Risk of Stroke";
pub const AT_RISK_TEXT: &str = "Risk of Stroke";
pub const ERROR_TEXT: &str = "ERROR: Fill out all forms for stroke prediction";

/// Map a decision to its label and illustrative asset.
pub fn present(decision: Decision) -> PresentationState {
    let (text, asset_key) = match decision {
        Decision::NoRisk => (NO_RISK_TEXT, AssetKey::Happy),
        Decision::AtRisk => (AT_RISK_TEXT, AssetKey::Sad),
        Decision::Error => (ERROR_TEXT, AssetKey::Blank),
    };
    PresentationState {
        label_text: text.to_string(),
        asset_key,
    }
}
