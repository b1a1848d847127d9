//! @ai:module:intent Define error types for string matching and eval tasks
//! @ai:module:layer domain
//! @ai:module:public_api MatchError, EvalError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Errors raised by the string matcher
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MatchError {
    #[error("Similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// @ai:intent Unified error type for eval task operations
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Extracted data does not match schema at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("{operation} failed: {message}")]
    Collaborator { operation: String, message: String },

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Invalid task phase transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl EvalError {
    /// @ai:intent Build a collaborator failure for a named operation
    /// @ai:effects pure
    pub fn collaborator(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Collaborator {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// @ai:intent Whether this error is a programmer error that must not be absorbed
    /// @ai:effects pure
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalError::Match(MatchError::InvalidThreshold(_)) | EvalError::InvalidTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_threshold_is_fatal() {
        let err: EvalError = MatchError::InvalidThreshold(1.5).into();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_collaborator_error_is_recoverable() {
        let err = EvalError::collaborator("navigation", "net::ERR_CONNECTION_RESET");
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "navigation failed: net::ERR_CONNECTION_RESET");
    }
}
