//! File-backed configuration sources.
//!
//! Both sources read the same JSON shape as [`ConfigBatch`]:
//! `{ "universes": [...], "networks": [...] }`, either key optional.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use timeverse_core::{ConfigBatch, ConfigSource, RegistryConfig, SourceError};

use crate::error::EnvError;

fn read_batch(path: &Path) -> Result<ConfigBatch, EnvError> {
    let text = fs::read_to_string(path).map_err(|e| EnvError::io(path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| EnvError::json(path.display(), e))
}

/// A single JSON batch file
///
/// A file that does not exist contributes nothing and is not an error.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError> {
        if !self.path.exists() {
            debug!("Config file {} not present", self.name);
            return Ok(None);
        }
        Ok(Some(read_batch(&self.path)?))
    }
}

/// Every `*.json` file of a directory, merged in file-name order
///
/// Unreadable or malformed files are skipped with a warning; the rest of the
/// directory still loads.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
    name: String,
}

impl JsonDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = format!("{}/*.json", dir.display());
        Self { dir, name }
    }

    /// JSON files of the directory, sorted by file name
    pub fn files(&self) -> Result<Vec<PathBuf>, EnvError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| EnvError::io(self.dir.display(), e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| EnvError::io(self.dir.display(), e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl ConfigSource for JsonDirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError> {
        if !self.dir.is_dir() {
            debug!("Config directory {} not present", self.dir.display());
            return Ok(None);
        }

        let files = self.files()?;
        if files.is_empty() {
            return Ok(None);
        }

        let mut merged = ConfigBatch::default();
        for file in files {
            match read_batch(&file) {
                Ok(batch) => {
                    debug!(
                        "Read {} universes, {} networks from {}",
                        batch.universes.len(),
                        batch.networks.len(),
                        file.display()
                    );
                    merged.universes.extend(batch.universes);
                    merged.networks.extend(batch.networks);
                    merged.malformed.extend(batch.malformed);
                }
                Err(e) => warn!("Skipping {}: {}", file.display(), e),
            }
        }
        Ok(Some(merged))
    }
}

/// Read a [`RegistryConfig`] from JSON; absent fields take their defaults
pub fn load_registry_config(path: impl AsRef<Path>) -> Result<RegistryConfig, EnvError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| EnvError::io(path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| EnvError::json(path.display(), e))
}
