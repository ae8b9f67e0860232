//! Timeverse Environment Adapters
//!
//! Real-world implementations of the core's collaborator traits:
//! - [`JsonFileSource`] / [`JsonDirectorySource`]: configuration batches on disk
//! - [`SledUniverseStore`]: persistent universe storage in an embedded sled tree
//!
//! The core never depends on this crate; binaries wire the two together.

mod error;
mod files;
mod sled_store;

pub use error::EnvError;
pub use files::{load_registry_config, JsonDirectorySource, JsonFileSource};
pub use sled_store::SledUniverseStore;
