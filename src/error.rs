//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkError>;

#[derive(Debug, Error)]
pub enum SkError {
    /// Malformed configuration or registry shape.
    #[error("{0}")]
    Config(String),

    /// A required configuration value could not be resolved.
    #[error("{0}")]
    MissingConfig(String),

    /// A skill directory or source descriptor failed validation.
    #[error("{0}")]
    ValidationFailed(String),

    /// The fetch collaborator subprocess failed.
    #[error("{0}")]
    Installer(String),

    /// One or more skills in an update batch failed.
    #[error("{0} skill update(s) failed")]
    UpdatesFailed(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialize: {0}")]
    Json(#[from] serde_json::Error),
}
