use std::io;
use thiserror::Error;

/// Engine-wide error type.
///
/// Only start-up paths (bundle loading, configuration, classifier probing) and
/// the classifier backend boundary return it. Serving operations absorb every
/// variant into a documented fallback.
#[derive(Debug, Error)]
pub enum AppError {
    /// A data collection, file or model could not be loaded.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The learned classifier failed or produced an unusable output.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed start-up JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents configuration-related errors (e.g., unparsable environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors (e.g., out-of-range thresholds).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::DataUnavailable(s) => AppError::DataUnavailable(s.clone()),
            AppError::Inference(s) => AppError::Inference(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Json(e) => AppError::DataUnavailable(format!("JSON error: {}", e)),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Validation(s) => AppError::Validation(s.clone()),
            AppError::Internal(s) => AppError::Internal(s.clone()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}
