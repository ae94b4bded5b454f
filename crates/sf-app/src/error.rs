//! Error types for the sf-app service layer.

use std::path::PathBuf;

use sf_system::SystemError;

/// Application error type that wraps errors from the backend crates and
/// provides one error interface for every front-end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("System not found: {0}")]
    SystemNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<sf_project::ProjectError> for AppError {
    fn from(err: sf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<SystemError> for AppError {
    fn from(err: SystemError) -> Self {
        match err {
            SystemError::Configuration(err) => AppError::Configuration(err.to_string()),
            SystemError::Evaluation(err) => AppError::Evaluation(err.to_string()),
        }
    }
}
