//! Configuration sources consumed by [`UniverseRegistry::initialize`].
//!
//! The set of sources is decided by whoever constructs the registry; nothing
//! is discovered at runtime. File- and directory-backed sources live in
//! `timeverse_env`.
//!
//! [`UniverseRegistry::initialize`]: crate::UniverseRegistry::initialize

use crate::error::SourceError;
use crate::model::ConfigBatch;

/// A provider of zero or one configuration batch.
///
/// `Ok(None)` means "nothing here" (e.g. an optional file that does not
/// exist) and is not logged as a failure.
pub trait ConfigSource: Send + Sync {
    /// Human-readable name used in logs and the init report
    fn name(&self) -> &str;

    fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError>;
}

/// A batch held in memory
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    batch: ConfigBatch,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, batch: ConfigBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Parse a JSON payload up front
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, SourceError> {
        let batch: ConfigBatch = serde_json::from_str(json)?;
        Ok(Self::new(name, batch))
    }
}

impl ConfigSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError> {
        Ok(Some(self.batch.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_from_json() {
        let json = r#"{
            "universes": [{
                "universeId": "film:heat:1995",
                "type": "film",
                "identifiers": { "primary": "Heat" },
                "realityRelation": { "type": "inspired_by", "fictionalizationDegree": 0.6 }
            }]
        }"#;
        let source = StaticSource::from_json("inline", json).unwrap();
        let batch = source.load_batch().unwrap().unwrap();
        assert_eq!(source.name(), "inline");
        assert_eq!(batch.universes.len(), 1);
        assert!(batch.networks.is_empty());
    }

    #[test]
    fn test_static_source_sets_aside_bad_ids() {
        let json = r#"{ "universes": [{
            "universeId": "heat",
            "type": "film",
            "identifiers": { "primary": "Heat" },
            "realityRelation": { "type": "inspired_by", "fictionalizationDegree": 0.6 }
        }] }"#;
        let batch = StaticSource::from_json("bad", json).unwrap().load_batch().unwrap().unwrap();
        assert!(batch.universes.is_empty());
        assert_eq!(batch.malformed[0].item, "heat");
    }

    #[test]
    fn test_static_source_rejects_broken_json() {
        assert!(matches!(
            StaticSource::from_json("bad", "{ \"universes\": 3 }"),
            Err(SourceError::Malformed(_))
        ));
    }
}
