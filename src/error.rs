//! Error types.
//!
//! Two layers:
//!
//! - domain errors (`NormalizationError`, `ModelLoadError`) carry structured
//!   detail and are matched on by the pipeline
//! - `AppError` is what the binary sees: a message plus a process exit code
//!
//! Exit codes:
//! - `2` invalid user input (flags, input files)
//! - `3` model artifacts could not be loaded
//! - `4` I/O failure while writing outputs

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for invalid user input.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for artifact load failures.
pub const EXIT_MODEL_LOAD: u8 = 3;
/// Exit code for output I/O failures.
pub const EXIT_OUTPUT: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ModelLoadError> for AppError {
    fn from(err: ModelLoadError) -> Self {
        AppError::new(EXIT_MODEL_LOAD, format!("Model artifacts unavailable: {err}"))
    }
}

impl From<NormalizationError> for AppError {
    fn from(err: NormalizationError) -> Self {
        AppError::new(EXIT_INPUT, format!("Invalid submission: {err}"))
    }
}

/// Which check rejected a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationErrorKind {
    MissingField,
    NotNumeric,
    WrongCount,
}

/// A submission that cannot be turned into a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    #[error("expected {expected} fields, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("missing value for field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` is not a finite number: {value:?}")]
    NotNumeric { field: String, value: String },
}

impl NormalizationError {
    pub fn kind(&self) -> NormalizationErrorKind {
        match self {
            NormalizationError::WrongCount { .. } => NormalizationErrorKind::WrongCount,
            NormalizationError::MissingField { .. } => NormalizationErrorKind::MissingField,
            NormalizationError::NotNumeric { .. } => NormalizationErrorKind::NotNumeric,
        }
    }
}

/// A classifier artifact that could not be located, read, or trusted.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid artifact {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl ModelLoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ModelLoadError::NotFound { path }
            | ModelLoadError::Read { path, .. }
            | ModelLoadError::Parse { path, .. }
            | ModelLoadError::Invalid { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_error_kinds() {
        let err = NormalizationError::WrongCount {
            expected: 10,
            actual: 9,
        };
        assert_eq!(err.kind(), NormalizationErrorKind::WrongCount);
        assert_eq!(err.to_string(), "expected 10 fields, got 9");

        let err = NormalizationError::NotNumeric {
            field: "age".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.kind(), NormalizationErrorKind::NotNumeric);
    }

    #[test]
    fn model_load_error_maps_to_exit_code() {
        let err = ModelLoadError::NotFound {
            path: PathBuf::from("models/knn.json"),
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), EXIT_MODEL_LOAD);
        assert!(app.to_string().contains("models/knn.json"));
    }
}
