//! Timeverse Core - temporal universes on a shared nanosecond axis
//!
//! Models films, missions, biographies and incidents as universes carrying
//! independent time coordinate systems, and answers three kinds of question:
//! 1. **Identity**: canonical ids, aliases and flattened epochs (the registry)
//! 2. **Presence**: which universes live inside a window, how windows align
//! 3. **Reality**: how far a universe (or a reference between two) sits from
//!    documented reality
//!
//! Lifecycle: construct a [`UniverseRegistry`], call
//! [`UniverseRegistry::initialize`] once with the configuration sources, then
//! query it read-only through [`WindowSearch`] and the reality functions.

pub mod catalog;
pub mod error;
pub mod model;
pub mod sources;
pub mod store;
pub mod timeverse_reality;
pub mod timeverse_registry;
pub mod timeverse_time;
pub mod timeverse_window;

// Re-export key types for convenience
pub use catalog::{builtin_catalog, BuiltinCatalog};
pub use error::{RegistryError, SourceError, StoreError, TimeError};
pub use model::{
    ConfigBatch, MalformedEntry, Nanos, Precision, RealityRelation, RealityRelationType, TemporalEpoch, TemporalLayer,
    TemporalWindow, Universe, UniverseId, UniverseNetwork, UniverseType,
};
pub use sources::{ConfigSource, StaticSource};
pub use store::{MemoryUniverseStore, UniverseStore};
pub use timeverse_reality::{analyze_reference, analyze_universe, RealityAnalysis, RealityCategory, ReferenceType};
pub use timeverse_registry::{InitReport, RegistryConfig, RegistryStats, UniverseRegistry};
pub use timeverse_window::{calculate_overlap, OverlapResult, SearchOptions, WindowAlignment, WindowSearch};
