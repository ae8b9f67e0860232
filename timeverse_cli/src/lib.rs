//! Timeverse CLI
//!
//! Builds a registry from the built-in catalog, JSON files and an optional
//! sled store, then answers one query per invocation.

pub mod bootstrap;
pub mod cli;
pub mod commands;
mod error;

pub use bootstrap::{LoadedRegistry, RegistrySetup};
pub use cli::Args;
pub use commands::{execute, Command, CommandOutput};
pub use error::CliError;
