//! The Timeverse data model.
//!
//! A [`Universe`] is a self-contained temporal subject (a film, a mission, a
//! life) carrying one or more independent coordinate systems ([`TemporalLayer`]).
//! All timestamps are signed nanoseconds since 1970-01-01T00:00:00Z held in
//! `i128`, so pre-1678 and post-2262 instants stay exact.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use crate::error::RegistryError;

/// Signed nanoseconds since the Unix epoch.
pub type Nanos = i128;

const UNIVERSE_ID_PATTERN: &str = r"^[^:]+(?::[^:]+)+$";
const TEMPORAL_QUALIFIER_PATTERN: &str = r"^\d{4}(?:-\d{4})?$";

fn universe_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UNIVERSE_ID_PATTERN).expect("universe id pattern is valid"))
}

fn qualifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TEMPORAL_QUALIFIER_PATTERN).expect("qualifier pattern is valid"))
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Validated universe identifier: `category:identifier[:year-or-range]`
///
/// The only way to obtain one is [`UniverseId::parse`] (or deserialization,
/// which goes through it), so a `UniverseId` in hand is always well formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UniverseId(String);

impl UniverseId {
    /// Validate and wrap a raw identifier string.
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        if universe_id_regex().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(RegistryError::invalid_id(raw))
        }
    }

    /// Returns true if `raw` follows the identifier grammar.
    pub fn is_valid(raw: &str) -> bool {
        universe_id_regex().is_match(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading free-form category tag (`disney` in `disney:mary_poppins:1964`)
    pub fn category(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(':')
    }

    /// Trailing `YYYY` or `YYYY-YYYY` segment, if present
    pub fn temporal_qualifier(&self) -> Option<&str> {
        let last = self.0.rsplit(':').next()?;
        let segment_count = self.segments().count();
        (segment_count > 2 && qualifier_regex().is_match(last)).then_some(last)
    }
}

impl TryFrom<String> for UniverseId {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if universe_id_regex().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(RegistryError::invalid_id(value))
        }
    }
}

impl From<UniverseId> for String {
    fn from(id: UniverseId) -> Self {
        id.0
    }
}

impl std::str::FromStr for UniverseId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UniverseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by UniverseId be queried with raw strings
impl std::borrow::Borrow<str> for UniverseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Kind of temporal subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniverseType {
    Film,
    TvSeries,
    Book,
    HistoricalEvent,
    Mission,
    Biography,
    PersonalExperience,
    LegalTimeline,
    SecurityIncident,
    Network,
    #[serde(other)]
    Other,
}

impl UniverseType {
    pub fn name(&self) -> &'static str {
        match self {
            UniverseType::Film => "film",
            UniverseType::TvSeries => "tv_series",
            UniverseType::Book => "book",
            UniverseType::HistoricalEvent => "historical_event",
            UniverseType::Mission => "mission",
            UniverseType::Biography => "biography",
            UniverseType::PersonalExperience => "personal_experience",
            UniverseType::LegalTimeline => "legal_timeline",
            UniverseType::SecurityIncident => "security_incident",
            UniverseType::Network => "network",
            UniverseType::Other => "other",
        }
    }
}

impl fmt::Display for UniverseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for UniverseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "film" | "movie" => Ok(UniverseType::Film),
            "tv_series" | "tv" => Ok(UniverseType::TvSeries),
            "book" => Ok(UniverseType::Book),
            "historical_event" | "event" => Ok(UniverseType::HistoricalEvent),
            "mission" => Ok(UniverseType::Mission),
            "biography" => Ok(UniverseType::Biography),
            "personal_experience" => Ok(UniverseType::PersonalExperience),
            "legal_timeline" => Ok(UniverseType::LegalTimeline),
            "security_incident" | "incident" => Ok(UniverseType::SecurityIncident),
            "network" => Ok(UniverseType::Network),
            "other" => Ok(UniverseType::Other),
            _ => Err(format!("Unknown universe type: {}", s)),
        }
    }
}

/// Primary id plus alternate lookup strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseIdentifiers {
    pub primary: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Copyright / provenance information. Not used by any analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default)]
    pub public_domain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ============================================================================
// TEMPORAL ENTITIES
// ============================================================================

/// Calendar granularity. A display and rounding hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// How a zero-referenced epoch renders offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeFormat {
    /// `T-1h 30m`
    Duration,
    /// `T-01:30:00`
    Clock,
}

/// A bounded, precision-tagged interval within a layer
///
/// `start_time <= end_time` is expected but not enforced here; see
/// [`TemporalEpoch::is_inverted`] and `RegistryConfig::strict_intervals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalEpoch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: Nanos,
    pub end_time: Nanos,
    pub precision: Precision,
    /// Instant that offsets are measured from (T-0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_point: Option<Nanos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_format: Option<RelativeFormat>,
}

impl TemporalEpoch {
    pub fn new(start_time: Nanos, end_time: Nanos, precision: Precision) -> Self {
        Self {
            epoch_id: None,
            description: None,
            start_time,
            end_time,
            precision,
            zero_point: None,
            zero_event: None,
            before_prefix: None,
            after_prefix: None,
            relative_format: None,
        }
    }

    pub fn with_id(mut self, epoch_id: impl Into<String>) -> Self {
        self.epoch_id = Some(epoch_id.into());
        self
    }

    /// Anchor T-minus/T-plus addressing at `zero_point`
    pub fn with_zero_point(mut self, zero_point: Nanos, zero_event: impl Into<String>) -> Self {
        self.zero_point = Some(zero_point);
        self.zero_event = Some(zero_event.into());
        self
    }

    pub fn duration(&self) -> Nanos {
        self.end_time - self.start_time
    }

    pub fn is_inverted(&self) -> bool {
        self.start_time > self.end_time
    }
}

/// An independent temporal perspective on a universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalLayer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub epochs: BTreeMap<String, TemporalEpoch>,
}

impl TemporalLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            epochs: BTreeMap::new(),
        }
    }

    pub fn with_epoch(mut self, key: impl Into<String>, epoch: TemporalEpoch) -> Self {
        self.epochs.insert(key.into(), epoch);
        self
    }
}

/// A typed sub-interval (scene, phase, era)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalSegment {
    pub segment_id: String,
    pub start_time: Nanos,
    pub end_time: Nanos,
    pub segment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

fn full_certainty() -> f64 {
    1.0
}

/// A significant instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalKeyframe {
    pub keyframe_id: String,
    pub timestamp: Nanos,
    /// 0.0 - 1.0
    pub significance: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 0.0 - 1.0, defaults to 1.0
    #[serde(default = "full_certainty")]
    pub certainty: f64,
}

/// Hint for downstream windowing. Not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowingStrategy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_window_size: Option<Nanos>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalStructure {
    #[serde(default)]
    pub segments: Vec<TemporalSegment>,
    #[serde(default)]
    pub keyframes: Vec<TemporalKeyframe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowing_strategy: Option<WindowingStrategy>,
}

/// Alternate human-readable label for a window, e.g. `{format: "year", value: "1969"}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowAlias {
    pub format: String,
    pub value: String,
}

impl WindowAlias {
    pub fn new(format: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            value: value.into(),
        }
    }
}

/// A named, reusable time span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalWindow {
    pub window_id: String,
    pub start_time: Nanos,
    pub end_time: Nanos,
    pub precision: Precision,
    #[serde(default)]
    pub aliases: Vec<WindowAlias>,
}

impl TemporalWindow {
    pub fn duration(&self) -> Nanos {
        self.end_time - self.start_time
    }

    /// Half-open intersection: touching at a single instant does not count
    pub fn intersects(&self, start: Nanos, end: Nanos) -> bool {
        start < self.end_time && end > self.start_time
    }

    /// True if both windows carry an alias with the same format and value
    pub fn shares_alias_with(&self, other: &TemporalWindow) -> bool {
        self.aliases.iter().any(|a| other.aliases.contains(a))
    }
}

// ============================================================================
// REALITY RELATION
// ============================================================================

/// How a universe relates to documented reality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealityRelationType {
    Documentary,
    HistoricalFiction,
    InspiredBy,
    PureFiction,
    Metafiction,
}

impl RealityRelationType {
    pub fn name(&self) -> &'static str {
        match self {
            RealityRelationType::Documentary => "documentary",
            RealityRelationType::HistoricalFiction => "historical_fiction",
            RealityRelationType::InspiredBy => "inspired_by",
            RealityRelationType::PureFiction => "pure_fiction",
            RealityRelationType::Metafiction => "metafiction",
        }
    }
}

impl fmt::Display for RealityRelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RealityRelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "documentary" => Ok(RealityRelationType::Documentary),
            "historical_fiction" => Ok(RealityRelationType::HistoricalFiction),
            "inspired_by" => Ok(RealityRelationType::InspiredBy),
            "pure_fiction" => Ok(RealityRelationType::PureFiction),
            "metafiction" => Ok(RealityRelationType::Metafiction),
            _ => Err(format!("Unknown reality relation type: {}", s)),
        }
    }
}

/// A documented tie between a universe and a real-world referent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealityAnchor {
    pub real_event_id: String,
    pub relationship_type: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealityRelation {
    #[serde(rename = "type")]
    pub relation_type: RealityRelationType,
    /// Author-declared baseline, 0.0 (documented reality) - 1.0 (pure invention)
    pub fictionalization_degree: f64,
    #[serde(default)]
    pub reality_anchors: Vec<RealityAnchor>,
    #[serde(default)]
    pub historical_consultants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_historical_accuracy: Option<bool>,
}

impl RealityRelation {
    pub fn new(relation_type: RealityRelationType, fictionalization_degree: f64) -> Self {
        Self {
            relation_type,
            fictionalization_degree,
            reality_anchors: Vec::new(),
            historical_consultants: Vec::new(),
            claims_historical_accuracy: None,
        }
    }

    pub fn with_anchor(mut self, real_event_id: &str, relationship_type: &str, confidence: f64) -> Self {
        self.reality_anchors.push(RealityAnchor {
            real_event_id: real_event_id.to_string(),
            relationship_type: relationship_type.to_string(),
            confidence,
            evidence: Vec::new(),
        });
        self
    }
}

// ============================================================================
// UNIVERSE
// ============================================================================

/// Free-form metadata; `culturalSignificance` is the only field the core reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseMetadata {
    #[serde(
        default,
        alias = "cultural_significance",
        skip_serializing_if = "Option::is_none"
    )]
    pub cultural_significance: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The root entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Universe {
    pub universe_id: UniverseId,
    #[serde(rename = "type")]
    pub universe_type: UniverseType,
    pub identifiers: UniverseIdentifiers,
    pub reality_relation: RealityRelation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Attribution>,
    #[serde(default)]
    pub layers: Vec<TemporalLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_structure: Option<TemporalStructure>,
    #[serde(default)]
    pub temporal_windows: Vec<TemporalWindow>,
    /// Flattened epoch map, filled in by the registry
    #[serde(default)]
    pub epochs: BTreeMap<String, TemporalEpoch>,
    #[serde(default)]
    pub metadata: UniverseMetadata,
}

impl Universe {
    pub fn new(
        universe_id: UniverseId,
        universe_type: UniverseType,
        primary: impl Into<String>,
        reality_relation: RealityRelation,
    ) -> Self {
        Self {
            universe_id,
            universe_type,
            identifiers: UniverseIdentifiers {
                primary: primary.into(),
                aliases: Vec::new(),
            },
            reality_relation,
            attribution: None,
            layers: Vec::new(),
            temporal_structure: None,
            temporal_windows: Vec::new(),
            epochs: BTreeMap::new(),
            metadata: UniverseMetadata::default(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.identifiers.aliases.push(alias.into());
        self
    }

    pub fn with_layer(mut self, layer: TemporalLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_window(mut self, window: TemporalWindow) -> Self {
        self.temporal_windows.push(window);
        self
    }

    pub fn with_structure(mut self, structure: TemporalStructure) -> Self {
        self.temporal_structure = Some(structure);
        self
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.metadata.cultural_significance = Some(significance);
        self
    }

    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// All epochs of all layers, in layer order
    pub fn layer_epochs(&self) -> impl Iterator<Item = &TemporalEpoch> {
        self.layers.iter().flat_map(|layer| layer.epochs.values())
    }

    pub fn cultural_significance(&self) -> f64 {
        self.metadata.cultural_significance.unwrap_or(0.0)
    }

    /// Earliest start and latest end over layer epochs and declared windows
    pub fn temporal_extent(&self) -> Option<(Nanos, Nanos)> {
        let spans = self
            .layer_epochs()
            .map(|e| (e.start_time, e.end_time))
            .chain(self.temporal_windows.iter().map(|w| (w.start_time, w.end_time)));

        spans.fold(None, |acc, (start, end)| match acc {
            None => Some((start, end)),
            Some((lo, hi)) => Some((lo.min(start), hi.max(end))),
        })
    }

    /// Flattened projection used by stores and listings
    pub fn search_view(&self) -> UniverseSearchView {
        let extent = self.temporal_extent();
        UniverseSearchView {
            universe_id: self.universe_id.clone(),
            universe_type: self.universe_type,
            primary: self.identifiers.primary.clone(),
            aliases: self.identifiers.aliases.clone(),
            reality_type: self.reality_relation.relation_type,
            fictionalization_degree: self.reality_relation.fictionalization_degree,
            earliest_start: extent.map(|(start, _)| start),
            latest_end: extent.map(|(_, end)| end),
            cultural_significance: self.metadata.cultural_significance,
            layer_count: self.layers.len(),
        }
    }
}

/// Storage-friendly projection of a universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseSearchView {
    pub universe_id: UniverseId,
    pub universe_type: UniverseType,
    pub primary: String,
    pub aliases: Vec<String>,
    pub reality_type: RealityRelationType,
    pub fictionalization_degree: f64,
    pub earliest_start: Option<Nanos>,
    pub latest_end: Option<Nanos>,
    pub cultural_significance: Option<f64>,
    pub layer_count: usize,
}

// ============================================================================
// NETWORKS
// ============================================================================

/// Named sub-range of a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEra {
    pub era_id: String,
    pub name: String,
    pub start_time: Nanos,
    pub end_time: Nanos,
}

/// A named grouping of universes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Legacy key used when `network_id` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub members: BTreeSet<UniverseId>,
    #[serde(default)]
    pub eras: Vec<NetworkEra>,
}

impl UniverseNetwork {
    pub fn new(network_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            network_id: Some(network_id.into()),
            universe_id: None,
            name: name.into(),
            description: None,
            members: BTreeSet::new(),
            eras: Vec::new(),
        }
    }

    /// Adding an existing member is a no-op
    pub fn with_member(mut self, member: UniverseId) -> Self {
        self.members.insert(member);
        self
    }

    pub fn with_era(mut self, era: NetworkEra) -> Self {
        self.eras.push(era);
        self
    }

    /// Table key: `network_id`, falling back to `universe_id`
    pub fn key(&self) -> Option<&str> {
        self.network_id.as_deref().or(self.universe_id.as_deref())
    }

    /// First era containing `t` (inclusive bounds)
    pub fn era_at(&self, t: Nanos) -> Option<&NetworkEra> {
        self.eras.iter().find(|era| era.start_time <= t && t <= era.end_time)
    }
}

/// One payload from a configuration source
///
/// Deserialization is per entry: an item that does not parse (bad id, wrong
/// shape) lands in `malformed` instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawConfigBatch")]
pub struct ConfigBatch {
    #[serde(default)]
    pub universes: Vec<Universe>,
    #[serde(default)]
    pub networks: Vec<UniverseNetwork>,
    #[serde(skip)]
    pub malformed: Vec<MalformedEntry>,
}

/// A batch entry that could not be deserialized
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedEntry {
    /// Best-effort label: the entry's id or name, else its position
    pub item: String,
    pub reason: String,
}

#[derive(Deserialize)]
struct RawConfigBatch {
    #[serde(default)]
    universes: Vec<Box<RawValue>>,
    #[serde(default)]
    networks: Vec<Box<RawValue>>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EntryLabel {
    network_id: Option<String>,
    universe_id: Option<String>,
    name: Option<String>,
}

fn entry_label(kind: &str, index: usize, entry: &RawValue) -> String {
    let label: EntryLabel = serde_json::from_str(entry.get()).unwrap_or_default();
    label
        .network_id
        .or(label.universe_id)
        .or(label.name)
        .unwrap_or_else(|| format!("{}[{}]", kind, index))
}

fn parse_entries<T: DeserializeOwned>(kind: &str, raw: Vec<Box<RawValue>>, malformed: &mut Vec<MalformedEntry>) -> Vec<T> {
    let mut parsed = Vec::with_capacity(raw.len());
    for (index, entry) in raw.iter().enumerate() {
        match serde_json::from_str(entry.get()) {
            Ok(item) => parsed.push(item),
            Err(e) => malformed.push(MalformedEntry {
                item: entry_label(kind, index, entry),
                reason: e.to_string(),
            }),
        }
    }
    parsed
}

impl From<RawConfigBatch> for ConfigBatch {
    fn from(raw: RawConfigBatch) -> Self {
        let mut malformed = Vec::new();
        let universes = parse_entries("universes", raw.universes, &mut malformed);
        let networks = parse_entries("networks", raw.networks, &mut malformed);
        Self {
            universes,
            networks,
            malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> UniverseId {
        UniverseId::parse(raw).unwrap()
    }

    #[test]
    fn test_universe_id_grammar() {
        assert!(UniverseId::is_valid("disney:mary_poppins:1964"));
        assert!(UniverseId::is_valid("mission:apollo_11"));
        assert!(UniverseId::is_valid("biography:lincoln:1809-1865"));

        assert!(!UniverseId::is_valid("mary_poppins"));
        assert!(!UniverseId::is_valid("disney:"));
        assert!(!UniverseId::is_valid(":mary_poppins"));
        assert!(!UniverseId::is_valid("disney::1964"));
        assert!(!UniverseId::is_valid("disney:mary_poppins:"));
    }

    #[test]
    fn test_universe_id_category_is_free_form() {
        assert!(UniverseId::is_valid("Disney:mary_poppins"));
        assert!(UniverseId::is_valid("cinéma:amélie:2001"));
        assert!(UniverseId::is_valid("art-house.films:Night Train:1990"));
        assert_eq!(id("cinéma:amélie:2001").category(), "cinéma");
        assert_eq!(id("cinéma:amélie:2001").temporal_qualifier(), Some("2001"));
    }

    #[test]
    fn test_invalid_id_error_names_grammar() {
        let err = UniverseId::parse("nope").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("category:identifier"));
    }

    #[test]
    fn test_universe_id_accessors() {
        let mp = id("disney:mary_poppins:1964");
        assert_eq!(mp.category(), "disney");
        assert_eq!(mp.temporal_qualifier(), Some("1964"));

        let range = id("biography:lincoln:1809-1865");
        assert_eq!(range.temporal_qualifier(), Some("1809-1865"));

        // Two segments never carry a qualifier, even if numeric
        assert_eq!(id("year:1969").temporal_qualifier(), None);
        assert_eq!(id("mission:apollo_11").temporal_qualifier(), None);
    }

    #[test]
    fn test_universe_id_deserialization_validates() {
        let ok: Result<UniverseId, _> = serde_json::from_str("\"film:heat:1995\"");
        assert!(ok.is_ok());

        let bad: Result<UniverseId, _> = serde_json::from_str("\"heat\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_batch_keeps_valid_entries_around_bad_ones() {
        let json = r#"{
            "universes": [
                { "universeId": "film:heat:1995", "type": "film",
                  "identifiers": { "primary": "Heat" },
                  "realityRelation": { "type": "inspired_by", "fictionalizationDegree": 0.6 } },
                { "universeId": "heat", "type": "film",
                  "identifiers": { "primary": "Heat again" },
                  "realityRelation": { "type": "inspired_by", "fictionalizationDegree": 0.6 } },
                { "type": "film" }
            ],
            "networks": [
                { "networkId": "network:bad", "name": "Bad", "members": ["nope"] }
            ]
        }"#;

        let batch: ConfigBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.universes.len(), 1);
        assert!(batch.networks.is_empty());

        let items: Vec<&str> = batch.malformed.iter().map(|m| m.item.as_str()).collect();
        assert_eq!(items, vec!["heat", "universes[2]", "network:bad"]);
    }

    #[test]
    fn test_universe_json_shape() {
        let json = r#"{
            "universeId": "film:heat:1995",
            "type": "film",
            "identifiers": { "primary": "Heat", "aliases": ["heat1995"] },
            "realityRelation": { "type": "inspired_by", "fictionalizationDegree": 0.6 },
            "layers": [{
                "name": "runtime",
                "epochs": {
                    "main": { "epochId": "heat_runtime", "startTime": 0, "endTime": 10200000000000, "precision": "second" }
                }
            }],
            "metadata": { "cultural_significance": 0.7, "director": "Michael Mann" }
        }"#;

        let universe: Universe = serde_json::from_str(json).unwrap();
        assert_eq!(universe.universe_type, UniverseType::Film);
        assert_eq!(universe.identifiers.aliases, vec!["heat1995".to_string()]);
        assert_eq!(universe.reality_relation.relation_type, RealityRelationType::InspiredBy);
        assert_eq!(universe.metadata.cultural_significance, Some(0.7));
        assert_eq!(universe.metadata.extra["director"], "Michael Mann");
        assert_eq!(universe.layers[0].epochs["main"].end_time, 10_200_000_000_000);
    }

    #[test]
    fn test_unknown_universe_type_is_other() {
        let t: UniverseType = serde_json::from_str("\"podcast\"").unwrap();
        assert_eq!(t, UniverseType::Other);
    }

    #[test]
    fn test_keyframe_certainty_defaults_to_one() {
        let json = r#"{ "keyframeId": "k", "timestamp": -5, "significance": 0.5 }"#;
        let kf: TemporalKeyframe = serde_json::from_str(json).unwrap();
        assert_eq!(kf.certainty, 1.0);
        assert_eq!(kf.timestamp, -5);
    }

    #[test]
    fn test_network_members_deduplicate() {
        let network = UniverseNetwork::new("apollo", "Apollo Program")
            .with_member(id("mission:apollo_11:1969"))
            .with_member(id("mission:apollo_11:1969"))
            .with_member(id("mission:apollo_13:1970"));
        assert_eq!(network.members.len(), 2);
        assert_eq!(network.key(), Some("apollo"));
    }

    #[test]
    fn test_network_key_falls_back_to_universe_id() {
        let mut network = UniverseNetwork::new("x", "X");
        network.network_id = None;
        assert_eq!(network.key(), None);
        network.universe_id = Some("network:x".to_string());
        assert_eq!(network.key(), Some("network:x"));
    }

    #[test]
    fn test_temporal_extent_spans_layers_and_windows() {
        let universe = Universe::new(
            id("film:test:2000"),
            UniverseType::Film,
            "Test",
            RealityRelation::new(RealityRelationType::PureFiction, 0.9),
        )
        .with_layer(TemporalLayer::new("runtime").with_epoch("a", TemporalEpoch::new(10, 20, Precision::Second)))
        .with_window(TemporalWindow {
            window_id: "w".to_string(),
            start_time: -100,
            end_time: 15,
            precision: Precision::Year,
            aliases: vec![],
        });

        assert_eq!(universe.temporal_extent(), Some((-100, 20)));
        let view = universe.search_view();
        assert_eq!(view.earliest_start, Some(-100));
        assert_eq!(view.latest_end, Some(20));
        assert_eq!(view.layer_count, 1);
    }
}
