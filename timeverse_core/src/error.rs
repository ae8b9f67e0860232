//! Error types for the Timeverse core.
//!
//! Only structurally invalid input produces an error. Lookups that miss
//! (unknown id, unresolvable window, empty result) are `Option`/empty results.

use thiserror::Error;

use crate::model::Nanos;

/// Calendar conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// A calendar field is out of range (month 13, February 30, hour 24, ...)
    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    /// The instant cannot be represented by the calendar backend
    #[error("Instant out of supported range: {0}ns")]
    OutOfRange(Nanos),
}

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The string does not follow the UniverseId grammar
    #[error(
        "Invalid universe id '{0}': expected 'category:identifier[:year-or-range]' \
         (at least two non-empty, colon-separated segments)"
    )]
    InvalidUniverseId(String),

    /// An epoch, segment or window ends before it starts (strict mode only)
    #[error("Inverted interval '{name}' in {universe}: start {start} > end {end}")]
    InvertedInterval {
        universe: String,
        name: String,
        start: Nanos,
        end: Nanos,
    },

    /// A network carries neither a networkId nor a universeId
    #[error("Network '{0}' has neither networkId nor universeId")]
    MissingNetworkKey(String),

    /// Building a built-in entity failed
    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    /// The persistence collaborator failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Creates an invalid-id error.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidUniverseId(id.into())
    }
}

/// Configuration source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source exists but could not be read
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The source was read but its payload is not a valid batch
    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Creates an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates a malformed error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Persistence collaborator errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
