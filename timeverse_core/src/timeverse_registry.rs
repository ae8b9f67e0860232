//! The "REGISTRY" Engine - canonical identity, aliases and epoch flattening
//!
//! The registry is an explicit object with a three-step lifecycle:
//! construct → [`UniverseRegistry::initialize`] → read-only queries.
//! Writers take `&mut self` and readers take `&self`, so the single-writer
//! initialization protocol is enforced by the borrow checker.
//!
//! Registration is first-write-wins on canonical id and last-write-wins on
//! aliases. Networks referencing universes that are not loaded yet leave a
//! [`NetworkPlaceholder`] behind, which a later real registration replaces.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::catalog::builtin_catalog;
use crate::error::RegistryError;
use crate::model::{
    ConfigBatch, Nanos, Precision, RealityRelation, RealityRelationType, TemporalEpoch, Universe,
    UniverseId, UniverseNetwork, UniverseType,
};
use crate::sources::ConfigSource;
use crate::store::UniverseStore;
use crate::timeverse_time::{create_epoch, CalendarDay};

/// Key of the baseline epoch injected into every universe
pub const UNIX_EPOCH_KEY: &str = "unix";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// What to do with a layer epoch that has no `epochId`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEpochIdPolicy {
    /// Flatten under `"<layer name>:<epoch key>"`
    AutoKey,
    /// Leave it out of the flattened map
    Skip,
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Load the built-in catalog during `initialize`
    pub include_builtin_catalog: bool,
    /// Add the `unix` reference epoch to every universe
    pub inject_baseline_epochs: bool,
    pub missing_epoch_ids: MissingEpochIdPolicy,
    /// Reject universes with an epoch, segment or window ending before it starts
    pub strict_intervals: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_builtin_catalog: true,
            inject_baseline_epochs: true,
            missing_epoch_ids: MissingEpochIdPolicy::AutoKey,
            strict_intervals: false,
        }
    }
}

// ============================================================================
// INDEX ENTRIES
// ============================================================================

/// Stand-in registered for a network member that is not loaded yet
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkPlaceholder {
    pub universe_id: UniverseId,
    pub network_key: String,
    pub network_name: String,
    pub description: Option<String>,
}

impl NetworkPlaceholder {
    /// Minimal valid universe view of this placeholder
    pub fn to_universe(&self) -> Universe {
        let mut universe = Universe::new(
            self.universe_id.clone(),
            UniverseType::Network,
            self.network_name.clone(),
            RealityRelation::new(RealityRelationType::InspiredBy, 0.5),
        );
        universe.metadata.extra.insert(
            "placeholderFor".to_string(),
            serde_json::Value::String(self.network_key.clone()),
        );
        if let Some(description) = &self.description {
            universe.metadata.extra.insert(
                "description".to_string(),
                serde_json::Value::String(description.clone()),
            );
        }
        universe
    }
}

#[derive(Debug, Clone)]
enum RegistryEntry {
    Universe(Universe),
    NetworkPlaceholder(NetworkPlaceholder),
}

/// Result of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    /// A network placeholder held the id and was replaced
    ReplacedPlaceholder,
    /// The id was already taken; nothing changed
    AlreadyRegistered,
}

// ============================================================================
// REPORTS
// ============================================================================

/// A configuration source that contributed nothing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSource {
    pub source: String,
    pub reason: String,
}

/// An item of an external batch that failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedItem {
    pub source: String,
    pub item: String,
    pub reason: String,
}

/// Summary of an `initialize` run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitReport {
    pub loaded_sources: Vec<String>,
    pub skipped_sources: Vec<SkippedSource>,
    pub rejected: Vec<RejectedItem>,
    pub universes_registered: usize,
    pub duplicates_ignored: usize,
    pub networks_registered: usize,
}

impl InitReport {
    fn record(&mut self, outcome: RegisterOutcome) {
        match outcome {
            RegisterOutcome::Registered | RegisterOutcome::ReplacedPlaceholder => {
                self.universes_registered += 1
            }
            RegisterOutcome::AlreadyRegistered => self.duplicates_ignored += 1,
        }
    }
}

/// Statistics about the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total_universes: usize,
    pub placeholders: usize,
    pub aliases: usize,
    pub networks: usize,
    pub total_layers: usize,
    pub total_epochs: usize,
    pub total_windows: usize,
    pub by_type: BTreeMap<String, usize>,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Canonical store of universes and networks
#[derive(Debug)]
pub struct UniverseRegistry {
    config: RegistryConfig,
    entries: BTreeMap<UniverseId, RegistryEntry>,
    aliases: HashMap<String, UniverseId>,
    networks: BTreeMap<String, UniverseNetwork>,
    baseline: BTreeMap<String, TemporalEpoch>,
    initialized: bool,
}

impl UniverseRegistry {
    /// Create an empty registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            aliases: HashMap::new(),
            networks: BTreeMap::new(),
            baseline: baseline_epochs(),
            initialized: false,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// True once `initialize` has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Load the built-in catalog, then each source in order
    ///
    /// Source failures and invalid items of external batches are logged and
    /// reported, never fatal. Only a broken built-in catalog fails the call.
    pub fn initialize(&mut self, sources: &[Box<dyn ConfigSource>]) -> Result<InitReport, RegistryError> {
        let mut report = InitReport::default();

        if self.config.include_builtin_catalog {
            let batch = builtin_catalog()?;
            info!(
                "Loading built-in catalog: {} universes, {} networks",
                batch.universes.len(),
                batch.networks.len()
            );
            for universe in batch.universes {
                let id = universe.universe_id.to_string();
                let outcome = self.register_universe(&id, universe)?;
                report.record(outcome);
            }
            for network in batch.networks {
                self.register_network(network)?;
                report.networks_registered += 1;
            }
            report.loaded_sources.push("builtin".to_string());
        }

        for source in sources {
            let name = source.name().to_string();
            match source.load_batch() {
                Ok(Some(batch)) => {
                    info!(
                        "Loading source '{}': {} universes, {} networks",
                        name,
                        batch.universes.len(),
                        batch.networks.len()
                    );
                    self.apply_batch(&name, batch, &mut report);
                    report.loaded_sources.push(name);
                }
                Ok(None) => {
                    debug!("Source '{}' provided no batch", name);
                    report.skipped_sources.push(SkippedSource {
                        source: name,
                        reason: "no batch".to_string(),
                    });
                }
                Err(e) => {
                    warn!("Skipping source '{}': {}", name, e);
                    report.skipped_sources.push(SkippedSource {
                        source: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.initialized = true;
        info!(
            "Registry initialized: {} universes, {} networks, {} sources skipped",
            self.entries.len(),
            self.networks.len(),
            report.skipped_sources.len()
        );
        Ok(report)
    }

    /// Register every item of an external batch, recording failures
    fn apply_batch(&mut self, source: &str, batch: ConfigBatch, report: &mut InitReport) {
        for entry in batch.malformed {
            warn!("Rejected malformed entry '{}' from '{}': {}", entry.item, source, entry.reason);
            report.rejected.push(RejectedItem {
                source: source.to_string(),
                item: entry.item,
                reason: entry.reason,
            });
        }

        for universe in batch.universes {
            let id = universe.universe_id.to_string();
            match self.register_universe(&id, universe) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!("Rejected universe '{}' from '{}': {}", id, source, e);
                    report.rejected.push(RejectedItem {
                        source: source.to_string(),
                        item: id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for network in batch.networks {
            let label = network.key().unwrap_or(&network.name).to_string();
            match self.register_network(network) {
                Ok(()) => report.networks_registered += 1,
                Err(e) => {
                    warn!("Rejected network '{}' from '{}': {}", label, source, e);
                    report.rejected.push(RejectedItem {
                        source: source.to_string(),
                        item: label,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Register a universe under `id`
    ///
    /// The registry is authoritative over identity: `universe.universe_id` is
    /// overwritten with the canonical id. Re-registering a taken id is a
    /// silent no-op reported as [`RegisterOutcome::AlreadyRegistered`].
    pub fn register_universe(&mut self, id: &str, mut universe: Universe) -> Result<RegisterOutcome, RegistryError> {
        let canonical = UniverseId::parse(id)?;

        let replacing_placeholder = match self.entries.get(&canonical) {
            Some(RegistryEntry::Universe(_)) => {
                debug!("Universe '{}' already registered, ignoring", canonical);
                return Ok(RegisterOutcome::AlreadyRegistered);
            }
            Some(RegistryEntry::NetworkPlaceholder(_)) => true,
            None => false,
        };

        if universe.universe_id != canonical {
            debug!(
                "Overriding declared id '{}' with canonical '{}'",
                universe.universe_id, canonical
            );
            universe.universe_id = canonical.clone();
        }

        if self.config.strict_intervals {
            check_intervals(&universe)?;
        }

        universe.epochs = self.flatten_epochs(&universe);

        for alias in &universe.identifiers.aliases {
            if let Some(previous) = self.aliases.insert(alias.clone(), canonical.clone()) {
                if previous != canonical {
                    debug!("Alias '{}' moved from '{}' to '{}'", alias, previous, canonical);
                }
            }
        }

        debug!(
            "Registered '{}' ({} layers, {} epochs)",
            canonical,
            universe.layers.len(),
            universe.epochs.len()
        );
        self.entries.insert(canonical, RegistryEntry::Universe(universe));

        Ok(if replacing_placeholder {
            RegisterOutcome::ReplacedPlaceholder
        } else {
            RegisterOutcome::Registered
        })
    }

    /// Merge declared, layer and baseline epochs into one map
    ///
    /// Precedence: the universe's own top-level entries, then layer epochs in
    /// layer order, then the baseline set.
    fn flatten_epochs(&self, universe: &Universe) -> BTreeMap<String, TemporalEpoch> {
        let mut epochs = universe.epochs.clone();

        for layer in &universe.layers {
            for (key, epoch) in &layer.epochs {
                let flat_key = match (&epoch.epoch_id, self.config.missing_epoch_ids) {
                    (Some(epoch_id), _) => epoch_id.clone(),
                    (None, MissingEpochIdPolicy::AutoKey) => format!("{}:{}", layer.name, key),
                    (None, MissingEpochIdPolicy::Skip) => {
                        debug!(
                            "Skipping epoch '{}' of layer '{}' in '{}': no epochId",
                            key, layer.name, universe.universe_id
                        );
                        continue;
                    }
                };
                epochs.entry(flat_key).or_insert_with(|| epoch.clone());
            }
        }

        if self.config.inject_baseline_epochs {
            for (key, epoch) in &self.baseline {
                epochs.entry(key.clone()).or_insert_with(|| epoch.clone());
            }
        }

        epochs
    }

    /// Register a network and its placeholder side effects
    pub fn register_network(&mut self, network: UniverseNetwork) -> Result<(), RegistryError> {
        let key = network
            .key()
            .map(str::to_string)
            .ok_or_else(|| RegistryError::MissingNetworkKey(network.name.clone()))?;
        let pseudo_id = match (&network.network_id, &network.universe_id) {
            (None, Some(raw)) => Some(UniverseId::parse(raw)?),
            _ => None,
        };

        for member in &network.members {
            if self.resolve(member.as_str()).is_none() {
                debug!("Member '{}' of '{}' not loaded, registering placeholder", member, key);
                self.entries.insert(
                    member.clone(),
                    RegistryEntry::NetworkPlaceholder(NetworkPlaceholder {
                        universe_id: member.clone(),
                        network_key: key.clone(),
                        network_name: network.name.clone(),
                        description: network.description.clone(),
                    }),
                );
            }
        }

        if let Some(pseudo_id) = pseudo_id {
            if !self.entries.contains_key(&pseudo_id) {
                self.entries.insert(
                    pseudo_id.clone(),
                    RegistryEntry::NetworkPlaceholder(NetworkPlaceholder {
                        universe_id: pseudo_id,
                        network_key: key.clone(),
                        network_name: network.name.clone(),
                        description: network.description.clone(),
                    }),
                );
            }
        }

        debug!("Registered network '{}' ({} members)", key, network.members.len());
        self.networks.insert(key, network);
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Canonical id for an id or alias
    pub fn resolve(&self, id_or_alias: &str) -> Option<&UniverseId> {
        if let Some((id, _)) = self.entries.get_key_value(id_or_alias) {
            return Some(id);
        }
        self.aliases
            .get(id_or_alias)
            .filter(|id| self.entries.contains_key(*id))
    }

    /// Look up by canonical id, then by alias
    ///
    /// Placeholders come back as a minimal [`UniverseType::Network`] view.
    pub fn get_universe(&self, id_or_alias: &str) -> Option<Cow<'_, Universe>> {
        let id = self.resolve(id_or_alias)?;
        match self.entries.get(id)? {
            RegistryEntry::Universe(universe) => Some(Cow::Borrowed(universe)),
            RegistryEntry::NetworkPlaceholder(placeholder) => Some(Cow::Owned(placeholder.to_universe())),
        }
    }

    /// True if `id` is currently held by a network placeholder
    pub fn is_placeholder(&self, id: &str) -> bool {
        matches!(self.entries.get(id), Some(RegistryEntry::NetworkPlaceholder(_)))
    }

    /// Registered universes (placeholders excluded), ordered by id
    pub fn universes(&self) -> impl Iterator<Item = &Universe> {
        self.entries.values().filter_map(|entry| match entry {
            RegistryEntry::Universe(universe) => Some(universe),
            RegistryEntry::NetworkPlaceholder(_) => None,
        })
    }

    /// Snapshot of every entry, placeholders normalized
    pub fn get_all_universes(&self) -> Vec<Universe> {
        self.entries
            .values()
            .map(|entry| match entry {
                RegistryEntry::Universe(universe) => universe.clone(),
                RegistryEntry::NetworkPlaceholder(placeholder) => placeholder.to_universe(),
            })
            .collect()
    }

    pub fn get_network(&self, key: &str) -> Option<&UniverseNetwork> {
        self.networks.get(key)
    }

    pub fn networks(&self) -> impl Iterator<Item = &UniverseNetwork> {
        self.networks.values()
    }

    /// Networks listing `id_or_alias` as a member
    pub fn networks_containing(&self, id_or_alias: &str) -> Vec<&UniverseNetwork> {
        match self.resolve(id_or_alias) {
            Some(id) => self.networks.values().filter(|n| n.members.contains(id)).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            aliases: self.aliases.len(),
            networks: self.networks.len(),
            ..Default::default()
        };

        for entry in self.entries.values() {
            match entry {
                RegistryEntry::Universe(universe) => {
                    stats.total_universes += 1;
                    stats.total_layers += universe.layers.len();
                    stats.total_epochs += universe.epochs.len();
                    stats.total_windows += universe.temporal_windows.len();
                    *stats.by_type.entry(universe.universe_type.to_string()).or_default() += 1;
                }
                RegistryEntry::NetworkPlaceholder(_) => stats.placeholders += 1,
            }
        }

        stats
    }

    // ========================================================================
    // PERSISTENCE COLLABORATOR
    // ========================================================================

    /// Register every universe held by `store`
    ///
    /// Returns how many were newly registered.
    pub fn hydrate_from(&mut self, store: &dyn UniverseStore) -> Result<usize, RegistryError> {
        let mut registered = 0;
        for universe in store.load_all()? {
            let id = universe.universe_id.to_string();
            if self.register_universe(&id, universe)? != RegisterOutcome::AlreadyRegistered {
                registered += 1;
            }
        }
        info!("Hydrated {} universes from store", registered);
        Ok(registered)
    }

    /// Write every registered universe (placeholders excluded) to `store`
    pub fn persist_to(&self, store: &dyn UniverseStore) -> Result<usize, RegistryError> {
        let mut written = 0;
        for universe in self.universes() {
            store.put(universe)?;
            written += 1;
        }
        info!("Persisted {} universes to store", written);
        Ok(written)
    }
}

impl Default for UniverseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed baseline epoch set
fn baseline_epochs() -> BTreeMap<String, TemporalEpoch> {
    let mut baseline = BTreeMap::new();
    match create_epoch(
        CalendarDay::new(1970, 1, 1),
        CalendarDay::new(2038, 1, 19),
        Precision::Second,
        Some(UNIX_EPOCH_KEY),
        Some("Unix time reference (32-bit signed range)"),
    ) {
        Ok(unix) => {
            baseline.insert(UNIX_EPOCH_KEY.to_string(), unix);
        }
        Err(e) => warn!("Baseline epoch unavailable: {}", e),
    }
    baseline
}

fn inverted(universe: &Universe, name: &str, start: Nanos, end: Nanos) -> RegistryError {
    RegistryError::InvertedInterval {
        universe: universe.universe_id.to_string(),
        name: name.to_string(),
        start,
        end,
    }
}

fn check_intervals(universe: &Universe) -> Result<(), RegistryError> {
    for layer in &universe.layers {
        for (key, epoch) in &layer.epochs {
            if epoch.is_inverted() {
                let name = format!("{}:{}", layer.name, key);
                return Err(inverted(universe, &name, epoch.start_time, epoch.end_time));
            }
        }
    }
    for (key, epoch) in &universe.epochs {
        if epoch.is_inverted() {
            return Err(inverted(universe, key, epoch.start_time, epoch.end_time));
        }
    }
    for window in &universe.temporal_windows {
        if window.start_time > window.end_time {
            return Err(inverted(universe, &window.window_id, window.start_time, window.end_time));
        }
    }
    if let Some(structure) = &universe.temporal_structure {
        for segment in &structure.segments {
            if segment.start_time > segment.end_time {
                return Err(inverted(universe, &segment.segment_id, segment.start_time, segment.end_time));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::model::TemporalLayer;
    use crate::sources::StaticSource;
    use crate::store::MemoryUniverseStore;
    use crate::timeverse_time::datetime_to_nanoseconds;

    fn id(raw: &str) -> UniverseId {
        UniverseId::parse(raw).unwrap()
    }

    fn film(raw: &str, title: &str) -> Universe {
        Universe::new(
            id(raw),
            UniverseType::Film,
            title,
            RealityRelation::new(RealityRelationType::PureFiction, 0.8),
        )
    }

    struct FailingSource;

    impl ConfigSource for FailingSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError> {
            Err(SourceError::unavailable("package not installed"))
        }
    }

    struct EmptySource;

    impl ConfigSource for EmptySource {
        fn name(&self) -> &str {
            "empty"
        }

        fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError> {
            Ok(None)
        }
    }

    #[test]
    fn test_alias_lookup() {
        let mut registry = UniverseRegistry::new();
        let universe = film("disney:mary_poppins:1964", "Mary Poppins").with_alias("mp1964");
        registry.register_universe("disney:mary_poppins:1964", universe).unwrap();

        let by_alias = registry.get_universe("mp1964").unwrap();
        let by_id = registry.get_universe("disney:mary_poppins:1964").unwrap();
        assert_eq!(by_alias.universe_id, by_id.universe_id);
        assert_eq!(by_alias.identifiers.primary, "Mary Poppins");
    }

    #[test]
    fn test_unknown_lookup_is_none() {
        let registry = UniverseRegistry::new();
        assert!(registry.get_universe("film:nothing:2000").is_none());
        assert!(registry.get_universe("garbage").is_none());
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let mut registry = UniverseRegistry::new();
        let result = registry.register_universe("mary_poppins", film("film:x:1", "X"));
        assert!(matches!(result, Err(RegistryError::InvalidUniverseId(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_first_write_wins() {
        let mut registry = UniverseRegistry::new();
        let first = film("film:heat:1995", "Heat");
        let second = film("film:heat:1995", "Heat (remake)");

        assert_eq!(
            registry.register_universe("film:heat:1995", first).unwrap(),
            RegisterOutcome::Registered
        );
        assert_eq!(
            registry.register_universe("film:heat:1995", second).unwrap(),
            RegisterOutcome::AlreadyRegistered
        );
        assert_eq!(registry.get_universe("film:heat:1995").unwrap().identifiers.primary, "Heat");
    }

    #[test]
    fn test_registry_overrides_declared_id() {
        let mut registry = UniverseRegistry::new();
        registry
            .register_universe("film:canonical:2000", film("film:declared:2000", "X"))
            .unwrap();

        let universe = registry.get_universe("film:canonical:2000").unwrap();
        assert_eq!(universe.universe_id.as_str(), "film:canonical:2000");
        assert!(registry.get_universe("film:declared:2000").is_none());
    }

    #[test]
    fn test_alias_last_writer_wins() {
        let mut registry = UniverseRegistry::new();
        registry
            .register_universe("film:a:2000", film("film:a:2000", "A").with_alias("shared"))
            .unwrap();
        registry
            .register_universe("film:b:2000", film("film:b:2000", "B").with_alias("shared"))
            .unwrap();

        assert_eq!(registry.get_universe("shared").unwrap().identifiers.primary, "B");
    }

    #[test]
    fn test_epoch_flattening() {
        let mut registry = UniverseRegistry::new();
        let universe = film("film:layers:2000", "Layers")
            .with_layer(
                TemporalLayer::new("runtime")
                    .with_epoch("main", TemporalEpoch::new(0, 100, Precision::Second).with_id("layers_runtime")),
            )
            .with_layer(TemporalLayer::new("narrative").with_epoch("untitled", TemporalEpoch::new(5, 6, Precision::Day)));
        registry.register_universe("film:layers:2000", universe).unwrap();

        let stored = registry.get_universe("film:layers:2000").unwrap();
        assert!(stored.epochs.contains_key(UNIX_EPOCH_KEY));
        assert!(stored.epochs.contains_key("layers_runtime"));
        assert!(stored.epochs.contains_key("narrative:untitled"));
        assert_eq!(stored.epochs.len(), 3);

        let unix = &stored.epochs[UNIX_EPOCH_KEY];
        assert_eq!(unix.start_time, 0);
        assert_eq!(
            unix.end_time,
            datetime_to_nanoseconds(2038, 1, 19, 23, 59, 59, 999).unwrap()
        );
    }

    #[test]
    fn test_skip_policy_drops_unnamed_epochs() {
        let mut registry = UniverseRegistry::with_config(RegistryConfig {
            missing_epoch_ids: MissingEpochIdPolicy::Skip,
            inject_baseline_epochs: false,
            ..Default::default()
        });
        let universe = film("film:skip:2000", "Skip")
            .with_layer(TemporalLayer::new("narrative").with_epoch("untitled", TemporalEpoch::new(5, 6, Precision::Day)));
        registry.register_universe("film:skip:2000", universe).unwrap();

        assert!(registry.get_universe("film:skip:2000").unwrap().epochs.is_empty());
    }

    #[test]
    fn test_declared_epochs_beat_baseline() {
        let mut registry = UniverseRegistry::new();
        let mut universe = film("film:own:2000", "Own");
        universe
            .epochs
            .insert(UNIX_EPOCH_KEY.to_string(), TemporalEpoch::new(-1, 1, Precision::Nanosecond));
        registry.register_universe("film:own:2000", universe).unwrap();

        let stored = registry.get_universe("film:own:2000").unwrap();
        assert_eq!(stored.epochs[UNIX_EPOCH_KEY].start_time, -1);
    }

    #[test]
    fn test_strict_intervals() {
        let inverted_universe = film("film:inverted:2000", "Inverted").with_layer(
            TemporalLayer::new("runtime").with_epoch("main", TemporalEpoch::new(100, 0, Precision::Second)),
        );

        let mut lenient = UniverseRegistry::new();
        assert!(lenient
            .register_universe("film:inverted:2000", inverted_universe.clone())
            .is_ok());

        let mut strict = UniverseRegistry::with_config(RegistryConfig {
            strict_intervals: true,
            ..Default::default()
        });
        let result = strict.register_universe("film:inverted:2000", inverted_universe);
        assert!(matches!(result, Err(RegistryError::InvertedInterval { .. })));
    }

    #[test]
    fn test_network_placeholders() {
        let mut registry = UniverseRegistry::new();
        registry
            .register_universe("mission:apollo_11:1969", film("mission:apollo_11:1969", "Apollo 11"))
            .unwrap();

        let network = UniverseNetwork::new("network:apollo", "Apollo")
            .with_member(id("mission:apollo_11:1969"))
            .with_member(id("mission:apollo_12:1969"));
        registry.register_network(network).unwrap();

        assert!(registry.get_network("network:apollo").is_some());
        assert!(!registry.is_placeholder("mission:apollo_11:1969"));
        assert!(registry.is_placeholder("mission:apollo_12:1969"));

        let stand_in = registry.get_universe("mission:apollo_12:1969").unwrap();
        assert_eq!(stand_in.universe_type, UniverseType::Network);
        assert_eq!(stand_in.identifiers.primary, "Apollo");

        // A real registration replaces the placeholder
        let outcome = registry
            .register_universe("mission:apollo_12:1969", film("mission:apollo_12:1969", "Apollo 12"))
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::ReplacedPlaceholder);
        assert_eq!(registry.get_universe("mission:apollo_12:1969").unwrap().identifiers.primary, "Apollo 12");
    }

    #[test]
    fn test_network_without_id_uses_universe_id() {
        let mut registry = UniverseRegistry::new();
        let mut network = UniverseNetwork::new("unused", "Legacy");
        network.network_id = None;
        network.universe_id = Some("network:legacy".to_string());
        registry.register_network(network).unwrap();

        assert!(registry.get_network("network:legacy").is_some());
        assert!(registry.is_placeholder("network:legacy"));

        // An existing entry under that key is left alone
        let mut registry = UniverseRegistry::new();
        registry
            .register_universe("network:legacy", film("network:legacy", "Real"))
            .unwrap();
        let mut network = UniverseNetwork::new("unused", "Legacy");
        network.network_id = None;
        network.universe_id = Some("network:legacy".to_string());
        registry.register_network(network).unwrap();
        assert_eq!(registry.get_universe("network:legacy").unwrap().identifiers.primary, "Real");
    }

    #[test]
    fn test_network_with_bad_legacy_id_leaves_no_trace() {
        let mut registry = UniverseRegistry::new();
        let mut network = UniverseNetwork::new("unused", "Ghosts").with_member(id("mission:ghost:1999"));
        network.network_id = None;
        network.universe_id = Some("ghosts".to_string());

        assert!(matches!(
            registry.register_network(network),
            Err(RegistryError::InvalidUniverseId(_))
        ));
        assert!(!registry.is_placeholder("mission:ghost:1999"));
        assert!(registry.get_network("ghosts").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_network_without_key_is_rejected() {
        let mut registry = UniverseRegistry::new();
        let mut network = UniverseNetwork::new("x", "Nameless");
        network.network_id = None;
        assert!(matches!(
            registry.register_network(network),
            Err(RegistryError::MissingNetworkKey(_))
        ));
    }

    #[test]
    fn test_get_all_universes_is_a_snapshot() {
        let mut registry = UniverseRegistry::new();
        registry.register_universe("film:a:2000", film("film:a:2000", "A")).unwrap();

        let mut snapshot = registry.get_all_universes();
        snapshot[0].identifiers.primary = "mutated".to_string();
        assert_eq!(registry.get_universe("film:a:2000").unwrap().identifiers.primary, "A");
    }

    #[test]
    fn test_initialize_with_sources() {
        let mut registry = UniverseRegistry::new();
        let external = ConfigBatch {
            universes: vec![
                film("film:external:2020", "External").with_alias("ext"),
                // Same id as a built-in: cannot override it
                film("disney:mary_poppins:1964", "Impostor"),
            ],
            ..Default::default()
        };
        let sources: Vec<Box<dyn ConfigSource>> = vec![
            Box::new(FailingSource),
            Box::new(EmptySource),
            Box::new(StaticSource::new("inline", external)),
        ];

        let report = registry.initialize(&sources).unwrap();

        assert!(registry.is_initialized());
        assert_eq!(report.loaded_sources, vec!["builtin".to_string(), "inline".to_string()]);
        assert_eq!(report.skipped_sources.len(), 2);
        assert_eq!(report.duplicates_ignored, 1);
        assert!(registry.get_universe("ext").is_some());
        assert_eq!(registry.get_universe("mp1964").unwrap().identifiers.primary, "Mary Poppins");
    }

    #[test]
    fn test_initialize_without_sources() {
        let mut registry = UniverseRegistry::new();
        let report = registry.initialize(&[]).unwrap();
        assert_eq!(report.universes_registered, 9);
        assert!(registry.get_universe("apollo11").is_some());
        // Apollo 13 mission is only known through the network
        assert!(registry.is_placeholder("mission:apollo_13:1970"));
    }

    #[test]
    fn test_initialize_without_catalog() {
        let mut registry = UniverseRegistry::with_config(RegistryConfig {
            include_builtin_catalog: false,
            ..Default::default()
        });
        let report = registry.initialize(&[]).unwrap();
        assert!(registry.is_empty());
        assert!(report.loaded_sources.is_empty());
    }

    #[test]
    fn test_networks_containing() {
        let mut registry = UniverseRegistry::new();
        registry.initialize(&[]).unwrap();

        let networks = registry.networks_containing("apollo11");
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].name, "Apollo Program");
        assert!(registry.networks_containing("bttf").is_empty());
    }

    #[test]
    fn test_stats() {
        let mut registry = UniverseRegistry::new();
        registry.initialize(&[]).unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_universes, 9);
        assert_eq!(stats.placeholders, 1);
        assert_eq!(stats.networks, 1);
        assert_eq!(stats.by_type["film"], 5);
    }

    #[test]
    fn test_store_round_trip() {
        let mut source = UniverseRegistry::new();
        source.initialize(&[]).unwrap();

        let store = MemoryUniverseStore::new();
        assert_eq!(source.persist_to(&store).unwrap(), 9);

        let mut hydrated = UniverseRegistry::with_config(RegistryConfig {
            include_builtin_catalog: false,
            ..Default::default()
        });
        assert_eq!(hydrated.hydrate_from(&store).unwrap(), 9);
        assert_eq!(
            hydrated.get_universe("bttf").unwrap().epochs,
            source.get_universe("bttf").unwrap().epochs
        );
    }
}
