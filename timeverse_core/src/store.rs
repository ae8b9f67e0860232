//! Persistence collaborator interface.
//!
//! The registry never requires a store. It can be hydrated from one and can
//! write its contents to one; the store only has to round-trip the model
//! shapes. A sled-backed implementation lives in `timeverse_env`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::model::{Universe, UniverseId, UniverseSearchView};

/// Trait for universe storage
///
/// Implementations must be thread-safe.
pub trait UniverseStore: Send + Sync {
    /// Insert or replace a universe
    fn put(&self, universe: &Universe) -> Result<(), StoreError>;

    fn get(&self, id: &UniverseId) -> Result<Option<Universe>, StoreError>;

    /// Load every stored universe, ordered by id
    fn load_all(&self) -> Result<Vec<Universe>, StoreError>;

    /// Flattened projections of every stored universe
    fn search_views(&self) -> Result<Vec<UniverseSearchView>, StoreError> {
        Ok(self.load_all()?.iter().map(Universe::search_view).collect())
    }
}

/// In-memory store (tests, dry runs)
#[derive(Debug, Default)]
pub struct MemoryUniverseStore {
    universes: RwLock<BTreeMap<UniverseId, Universe>>,
}

impl MemoryUniverseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.universes.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UniverseStore for MemoryUniverseStore {
    fn put(&self, universe: &Universe) -> Result<(), StoreError> {
        let mut universes = self
            .universes
            .write()
            .map_err(|e| StoreError::Backend(format!("Lock poisoned: {}", e)))?;
        universes.insert(universe.universe_id.clone(), universe.clone());
        Ok(())
    }

    fn get(&self, id: &UniverseId) -> Result<Option<Universe>, StoreError> {
        let universes = self
            .universes
            .read()
            .map_err(|e| StoreError::Backend(format!("Lock poisoned: {}", e)))?;
        Ok(universes.get(id).cloned())
    }

    fn load_all(&self) -> Result<Vec<Universe>, StoreError> {
        let universes = self
            .universes
            .read()
            .map_err(|e| StoreError::Backend(format!("Lock poisoned: {}", e)))?;
        Ok(universes.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RealityRelation, RealityRelationType, UniverseType};

    #[test]
    fn test_memory_store_put_get() {
        let store = MemoryUniverseStore::new();
        let id = UniverseId::parse("film:heat:1995").unwrap();
        let universe = Universe::new(
            id.clone(),
            UniverseType::Film,
            "Heat",
            RealityRelation::new(RealityRelationType::InspiredBy, 0.6),
        );

        assert!(store.is_empty());
        store.put(&universe).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap(), Some(universe));

        let views = store.search_views().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].primary, "Heat");
    }
}
