//! Error types for the Timeverse environment adapters.

use thiserror::Error;
use timeverse_core::{SourceError, StoreError};

/// Errors raised while touching the filesystem or the embedded store.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A file or directory could not be read
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// A payload is not valid JSON for the expected shape
    #[error("JSON error in {path}: {message}")]
    Json { path: String, message: String },

    /// The sled database failed
    #[error("Storage error: {0}")]
    Sled(String),
}

impl EnvError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Creates a JSON error for `path`.
    pub fn json(path: impl std::fmt::Display, err: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<sled::Error> for EnvError {
    fn from(e: sled::Error) -> Self {
        Self::Sled(e.to_string())
    }
}

impl From<EnvError> for SourceError {
    fn from(e: EnvError) -> Self {
        match e {
            EnvError::Json { .. } => SourceError::malformed(e.to_string()),
            EnvError::Io { .. } | EnvError::Sled(_) => SourceError::unavailable(e.to_string()),
        }
    }
}

impl From<EnvError> for StoreError {
    fn from(e: EnvError) -> Self {
        match e {
            EnvError::Json { .. } => StoreError::Serialization(e.to_string()),
            EnvError::Io { .. } | EnvError::Sled(_) => StoreError::Backend(e.to_string()),
        }
    }
}
