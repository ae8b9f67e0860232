//! Sled-backed universe store.
//!
//! One tree entry per universe: the key is the canonical id, the value is the
//! universe serialized as JSON (the same shape configuration files use).

use std::path::Path;
use tracing::debug;

use timeverse_core::{StoreError, Universe, UniverseId, UniverseStore};

use crate::error::EnvError;

/// Persistent store in an embedded key-value database
pub struct SledUniverseStore {
    db: sled::Db,
}

impl SledUniverseStore {
    /// Open (or create) a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EnvError> {
        let db = sled::open(path.as_ref())?;
        debug!("Opened universe store at {}", path.as_ref().display());
        Ok(Self { db })
    }

    /// Create a temporary store (for testing)
    #[cfg(test)]
    pub fn open_temp() -> Result<Self, EnvError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<Universe, EnvError> {
        serde_json::from_slice(value).map_err(|e| EnvError::json(String::from_utf8_lossy(key), e))
    }
}

impl UniverseStore for SledUniverseStore {
    fn put(&self, universe: &Universe) -> Result<(), StoreError> {
        let value = serde_json::to_vec(universe)?;
        self.db
            .insert(universe.universe_id.as_str().as_bytes(), value)
            .map_err(EnvError::from)?;
        self.db.flush().map_err(EnvError::from)?;
        Ok(())
    }

    fn get(&self, id: &UniverseId) -> Result<Option<Universe>, StoreError> {
        let key = id.as_str().as_bytes();
        match self.db.get(key).map_err(EnvError::from)? {
            Some(value) => Ok(Some(Self::decode(key, &value)?)),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> Result<Vec<Universe>, StoreError> {
        let mut universes = Vec::new();
        for result in self.db.iter() {
            let (key, value) = result.map_err(EnvError::from)?;
            universes.push(Self::decode(&key, &value)?);
        }
        Ok(universes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use timeverse_core::{RealityRelation, RealityRelationType, RegistryConfig, UniverseRegistry, UniverseType};

    fn heat() -> Universe {
        Universe::new(
            UniverseId::parse("film:heat:1995").unwrap(),
            UniverseType::Film,
            "Heat",
            RealityRelation::new(RealityRelationType::InspiredBy, 0.6),
        )
        .with_alias("heat1995")
    }

    #[test]
    fn test_put_get() {
        let store = SledUniverseStore::open_temp().unwrap();
        let universe = heat();

        store.put(&universe).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&universe.universe_id).unwrap(), Some(universe));

        let missing = UniverseId::parse("film:nothing:2000").unwrap();
        assert_eq!(store.get(&missing).unwrap(), None);
    }

    #[test]
    fn test_put_replaces() {
        let store = SledUniverseStore::open_temp().unwrap();
        let mut universe = heat();
        store.put(&universe).unwrap();
        universe.identifiers.primary = "Heat (director's cut)".to_string();
        store.put(&universe).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load_all().unwrap()[0].identifiers.primary, "Heat (director's cut)");
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universes.db");

        {
            let store = SledUniverseStore::open(&path).unwrap();
            store.put(&heat()).unwrap();
        }

        let store = SledUniverseStore::open(&path).unwrap();
        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].identifiers.aliases, vec!["heat1995".to_string()]);
    }

    #[test]
    fn test_corrupt_entry_is_serialization_error() {
        let store = SledUniverseStore::open_temp().unwrap();
        store.db.insert("film:broken:2000".as_bytes(), b"not json".to_vec()).unwrap();
        assert!(matches!(store.load_all(), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_registry_round_trip() {
        let store = SledUniverseStore::open_temp().unwrap();

        let mut registry = UniverseRegistry::new();
        registry.initialize(&[]).unwrap();
        let written = registry.persist_to(&store).unwrap();
        assert_eq!(written, store.len());

        let mut restored = UniverseRegistry::with_config(RegistryConfig {
            include_builtin_catalog: false,
            ..Default::default()
        });
        restored.hydrate_from(&store).unwrap();
        assert!(restored.get_universe("mp1964").is_some());
        assert_eq!(restored.stats().total_universes, registry.stats().total_universes);
        assert_eq!(store.search_views().unwrap().len(), written);
    }
}
