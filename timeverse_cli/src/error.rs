//! Error types for the Timeverse CLI.

use thiserror::Error;
use timeverse_core::{RegistryError, StoreError};
use timeverse_env::EnvError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Env(#[from] EnvError),

    /// No universe or alias matches
    #[error("Unknown universe: {0}")]
    UnknownUniverse(String),

    /// Neither `cal:YYYY` nor a declared window id
    #[error("Unknown window: {0}")]
    UnknownWindow(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
