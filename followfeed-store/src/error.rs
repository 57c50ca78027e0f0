//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The settings file does not exist.
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The settings file exists but cannot be decoded.
    #[error("Settings file {} is corrupt: {reason}", path.display())]
    Corrupt {
        /// File that failed to decode.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A tagged value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A value has no JSON representation.
    #[error("{value} at '{key_path}' is not JSON serializable")]
    Unserializable {
        /// Dotted path of the offending value.
        key_path: String,
        /// Debug rendering of the offending value.
        value: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the settings file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
