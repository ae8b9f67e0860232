//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

use crate::bootstrap::RegistrySetup;
use crate::commands::Command;

/// Timeverse: temporal universes on a shared nanosecond axis
#[derive(Parser, Debug)]
#[command(name = "timeverse")]
#[command(about = "Explore temporal universes, windows and reality levels", long_about = None)]
pub struct Args {
    /// JSON batch file to load after the built-in catalog (repeatable)
    #[arg(short, long = "config", global = true)]
    pub configs: Vec<PathBuf>,

    /// Directory of JSON batch files, loaded in file-name order
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Registry options as JSON
    #[arg(long, global = true)]
    pub registry_config: Option<PathBuf>,

    /// Sled database to hydrate from and persist to
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Skip the built-in catalog
    #[arg(long, global = true)]
    pub no_builtins: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn setup(&self) -> RegistrySetup {
        RegistrySetup {
            configs: self.configs.clone(),
            config_dir: self.config_dir.clone(),
            registry_config: self.registry_config.clone(),
            store: self.store.clone(),
            no_builtins: self.no_builtins,
        }
    }
}
