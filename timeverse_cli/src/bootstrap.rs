//! Registry construction from command line inputs.
//!
//! Sources are declared up front: the built-in catalog (unless disabled),
//! then each `--config` file in order, then the `--config-dir` directory.
//! An optional sled store is hydrated into the registry afterwards and then
//! receives the merged result.

use std::path::PathBuf;
use tracing::info;

use timeverse_core::{ConfigSource, InitReport, RegistryConfig, UniverseRegistry};
use timeverse_env::{load_registry_config, JsonDirectorySource, JsonFileSource, SledUniverseStore};

use crate::error::CliError;

/// Where the registry's contents come from
#[derive(Debug, Clone, Default)]
pub struct RegistrySetup {
    pub configs: Vec<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub registry_config: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub no_builtins: bool,
}

/// An initialized registry plus what happened while building it
#[derive(Debug)]
pub struct LoadedRegistry {
    pub registry: UniverseRegistry,
    pub report: InitReport,
    /// Universes newly taken from the store
    pub hydrated: usize,
}

impl RegistrySetup {
    pub fn sources(&self) -> Vec<Box<dyn ConfigSource>> {
        let mut sources: Vec<Box<dyn ConfigSource>> = self
            .configs
            .iter()
            .map(|path| Box::new(JsonFileSource::new(path)) as Box<dyn ConfigSource>)
            .collect();
        if let Some(dir) = &self.config_dir {
            sources.push(Box::new(JsonDirectorySource::new(dir)));
        }
        sources
    }

    pub fn registry_config(&self) -> Result<RegistryConfig, CliError> {
        let mut config = match &self.registry_config {
            Some(path) => load_registry_config(path)?,
            None => RegistryConfig::default(),
        };
        if self.no_builtins {
            config.include_builtin_catalog = false;
        }
        Ok(config)
    }

    pub fn load(&self) -> Result<LoadedRegistry, CliError> {
        let mut registry = UniverseRegistry::with_config(self.registry_config()?);
        let report = registry.initialize(&self.sources())?;

        let mut hydrated = 0;
        if let Some(path) = &self.store {
            let store = SledUniverseStore::open(path)?;
            hydrated = registry.hydrate_from(&store)?;
            let written = registry.persist_to(&store)?;
            info!(
                "Store {}: {} hydrated, {} written",
                path.display(),
                hydrated,
                written
            );
        }

        Ok(LoadedRegistry {
            registry,
            report,
            hydrated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtins_only() {
        let loaded = RegistrySetup::default().load().unwrap();
        assert_eq!(loaded.registry.stats().total_universes, 9);
        assert_eq!(loaded.report.loaded_sources, vec!["builtin".to_string()]);
        assert_eq!(loaded.hydrated, 0);
    }

    #[test]
    fn test_no_builtins() {
        let setup = RegistrySetup {
            no_builtins: true,
            ..Default::default()
        };
        assert!(setup.load().unwrap().registry.is_empty());
    }

    #[test]
    fn test_sources_in_declared_order() {
        let setup = RegistrySetup {
            configs: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
            config_dir: Some(PathBuf::from("extra")),
            ..Default::default()
        };
        let names: Vec<String> = setup.sources().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["a.json", "b.json", "extra/*.json"]);
    }

    #[test]
    fn test_missing_config_file_is_skipped() {
        let dir = tempdir().unwrap();
        let setup = RegistrySetup {
            configs: vec![dir.path().join("does_not_exist.json")],
            ..Default::default()
        };
        let loaded = setup.load().unwrap();
        assert_eq!(loaded.report.skipped_sources.len(), 1);
        assert_eq!(loaded.registry.stats().total_universes, 9);
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempdir().unwrap();
        let setup = RegistrySetup {
            store: Some(dir.path().join("db")),
            ..Default::default()
        };
        setup.load().unwrap();

        // Second run without built-ins finds everything in the store
        let reloaded = RegistrySetup {
            no_builtins: true,
            ..setup.clone()
        }
        .load()
        .unwrap();
        assert_eq!(reloaded.hydrated, 9);
        assert!(reloaded.registry.get_universe("bttf").is_some());
    }
}
