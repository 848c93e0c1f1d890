//! Error types for the prospect brief generator.
//!
//! Library crates use [`BriefError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all prospect brief operations.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The generation service failed, rejected the request, or returned
    /// a response without any text.
    #[error("generation failed: {0}")]
    Generation(String),

    /// A stage was handed empty input it depends on.
    #[error("contract violation in {stage}: {message}")]
    ContractViolation { stage: String, message: String },

    /// Secondary artifact could not be produced. Logged, never fatal.
    #[error("rendering degraded: {0}")]
    Rendering(String),

    /// Roster or case catalog could not be read.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BriefError>;

impl BriefError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a contract violation for the named stage.
    pub fn contract(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ContractViolation {
            stage: stage.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
