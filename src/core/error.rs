//! Error types for the flay library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using flay's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during scoring.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed syntax tree: the traversal depth bound was exceeded, which
    /// means the adapter handed over a degenerate or corrupted tree. Fatal to
    /// the one scope being traversed, never to the whole run.
    #[error("Structural error in {scope}: {message}")]
    Structural { scope: String, message: String },

    /// Invalid configuration (unknown node kind in an override, negative
    /// weight, inverted thresholds). Surfaced before any traversal begins.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse error from an adapter.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was cancelled; partial results were discarded.
    #[error("Scoring run cancelled")]
    Cancelled,
}

impl Error {
    /// Create a new structural error for the given scope.
    pub fn structural(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            scope: scope.into(),
            message: message.into(),
        }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::structural("Shop#buy", "depth bound exceeded");
        assert_eq!(
            err.to_string(),
            "Structural error in Shop#buy: depth bound exceeded"
        );

        let err = Error::config("negative weight for branch");
        assert_eq!(
            err.to_string(),
            "Configuration error: negative weight for branch"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::Parse {
            path: PathBuf::from("shop.rb"),
            message: "failed to parse".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error in shop.rb: failed to parse");
    }
}
