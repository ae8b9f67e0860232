//! The "WINDOW" Engine - temporal presence and window alignment
//!
//! Answers two questions over a registry:
//! - which universes have temporal presence inside a window
//! - how two windows line up, numerically and by shared aliases
//!
//! A window is either declared by some universe or synthesized from the
//! `cal:YYYY` shorthand. All intersection tests are half-open: two spans
//! touching at a single instant do not overlap.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::model::{
    Nanos, RealityRelationType, TemporalKeyframe, TemporalWindow, Universe, UniverseId, UniverseType,
};
use crate::timeverse_registry::UniverseRegistry;
use crate::timeverse_time::{calendar_year_window, is_within_range};

/// Prefix of synthetic calendar-year window ids
pub const CALENDAR_PREFIX: &str = "cal:";

// ============================================================================
// QUERY OPTIONS
// ============================================================================

/// Sort order on `metadata.cultural_significance` (missing counts as 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignificanceOrder {
    Ascending,
    Descending,
}

impl std::str::FromStr for SignificanceOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SignificanceOrder::Ascending),
            "desc" | "descending" => Ok(SignificanceOrder::Descending),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Post-filters applied after the overlap test
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Keep only these universe types
    pub types: Option<HashSet<UniverseType>>,
    /// Inclusive upper bound on the declared fictionalization degree
    pub max_fictionalization: Option<f64>,
    pub reality_type: Option<RealityRelationType>,
    pub sort: Option<SignificanceOrder>,
}

impl SearchOptions {
    pub fn with_type(mut self, universe_type: UniverseType) -> Self {
        self.types.get_or_insert_with(HashSet::new).insert(universe_type);
        self
    }

    pub fn with_max_fictionalization(mut self, max: f64) -> Self {
        self.max_fictionalization = Some(max);
        self
    }

    pub fn with_reality_type(mut self, reality_type: RealityRelationType) -> Self {
        self.reality_type = Some(reality_type);
        self
    }

    pub fn sorted(mut self, order: SignificanceOrder) -> Self {
        self.sort = Some(order);
        self
    }

    fn accepts(&self, universe: &Universe) -> bool {
        if let Some(types) = &self.types {
            if !types.contains(&universe.universe_type) {
                return false;
            }
        }
        if let Some(max) = self.max_fictionalization {
            if universe.reality_relation.fictionalization_degree > max {
                return false;
            }
        }
        if let Some(reality_type) = self.reality_type {
            if universe.reality_relation.relation_type != reality_type {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Intersection of window B with window A, relative to A
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapResult {
    /// Intersection / duration(A), rounded to two decimals, in [0, 1]
    pub percentage: f64,
    pub duration: Nanos,
}

impl OverlapResult {
    pub const NONE: OverlapResult = OverlapResult {
        percentage: 0.0,
        duration: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowAlignment {
    pub universe_id: UniverseId,
    pub window: TemporalWindow,
    pub overlap: OverlapResult,
    /// Both windows carry the same `{format, value}` alias
    pub semantic_alignment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeHit {
    pub universe_id: UniverseId,
    pub keyframe: TemporalKeyframe,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Read-only window queries over a registry
#[derive(Debug, Clone, Copy)]
pub struct WindowSearch<'r> {
    registry: &'r UniverseRegistry,
}

impl<'r> WindowSearch<'r> {
    pub fn new(registry: &'r UniverseRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a window id
    ///
    /// `cal:YYYY` (exactly four digits) is synthesized; anything else is
    /// looked up among the declared windows of every registered universe.
    pub fn get_window(&self, window_id: &str) -> Option<TemporalWindow> {
        self.locate_window(window_id).map(|(_, window)| window)
    }

    /// Window plus the universe declaring it (`None` for `cal:YYYY`)
    fn locate_window(&self, window_id: &str) -> Option<(Option<&'r UniverseId>, TemporalWindow)> {
        if let Some(year) = parse_calendar_year(window_id) {
            return calendar_year_window(year).ok().map(|w| (None, w));
        }

        self.registry.universes().find_map(|u| {
            u.temporal_windows
                .iter()
                .find(|w| w.window_id == window_id)
                .map(|w| (Some(&u.universe_id), w.clone()))
        })
    }

    /// True if any layer epoch or declared window of `universe` intersects `window`
    pub fn has_temporal_overlap(&self, universe: &Universe, window: &TemporalWindow) -> bool {
        universe
            .layer_epochs()
            .any(|epoch| window.intersects(epoch.start_time, epoch.end_time))
            || universe
                .temporal_windows
                .iter()
                .any(|own| window.intersects(own.start_time, own.end_time))
    }

    /// Universes with temporal presence in the named window
    ///
    /// An unresolvable window yields an empty list.
    pub fn find_universes_in_window(&self, window_id: &str, options: &SearchOptions) -> Vec<&'r Universe> {
        match self.get_window(window_id) {
            Some(window) => self.find_universes_overlapping(&window, options),
            None => {
                debug!("Window '{}' not found", window_id);
                Vec::new()
            }
        }
    }

    /// Universes with temporal presence in an arbitrary window
    pub fn find_universes_overlapping(&self, window: &TemporalWindow, options: &SearchOptions) -> Vec<&'r Universe> {
        let mut hits: Vec<&'r Universe> = self
            .registry
            .universes()
            .filter(|u| self.has_temporal_overlap(u, window))
            .filter(|u| options.accepts(u))
            .collect();

        if let Some(order) = options.sort {
            hits.sort_by(|a, b| {
                let ord = a
                    .cultural_significance()
                    .partial_cmp(&b.cultural_significance())
                    .unwrap_or(Ordering::Equal);
                match order {
                    SignificanceOrder::Ascending => ord,
                    SignificanceOrder::Descending => ord.reverse(),
                }
            });
        }

        debug!("{} universes overlap '{}'", hits.len(), window.window_id);
        hits
    }

    /// Every other declared window with a nonzero overlap against `window_id`
    ///
    /// Only the resolved source window itself is left out; a window of the
    /// same id declared by another universe is a regular candidate.
    pub fn get_window_alignments(&self, window_id: &str) -> Vec<WindowAlignment> {
        let Some((owner, source)) = self.locate_window(window_id) else {
            return Vec::new();
        };

        let mut alignments = Vec::new();
        for universe in self.registry.universes() {
            for candidate in &universe.temporal_windows {
                if owner == Some(&universe.universe_id) && candidate.window_id == source.window_id {
                    continue;
                }
                let overlap = calculate_overlap(&source, candidate);
                if overlap.duration > 0 {
                    alignments.push(WindowAlignment {
                        universe_id: universe.universe_id.clone(),
                        window: candidate.clone(),
                        overlap,
                        semantic_alignment: source.shares_alias_with(candidate),
                    });
                }
            }
        }
        alignments
    }

    /// Keyframes of every universe falling inside the window, by timestamp
    pub fn keyframes_in_window(&self, window_id: &str) -> Vec<KeyframeHit> {
        let Some(window) = self.get_window(window_id) else {
            return Vec::new();
        };

        let (start, end) = (window.start_time, window.end_time);
        let mut hits: Vec<KeyframeHit> = self
            .registry
            .universes()
            .filter_map(|u| u.temporal_structure.as_ref().map(|s| (u, s)))
            .flat_map(move |(u, structure)| {
                structure
                    .keyframes
                    .iter()
                    .filter(move |kf| is_within_range(kf.timestamp, start, end))
                    .map(move |kf| KeyframeHit {
                        universe_id: u.universe_id.clone(),
                        keyframe: kf.clone(),
                    })
            })
            .collect();

        hits.sort_by_key(|hit| hit.keyframe.timestamp);
        hits
    }
}

/// `cal:YYYY` → year; any other shape is not a calendar window
pub fn parse_calendar_year(window_id: &str) -> Option<i32> {
    let digits = window_id.strip_prefix(CALENDAR_PREFIX)?;
    if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Overlap of `b` with `a`, as a fraction of `a`
///
/// Asymmetric: swapping the arguments changes the percentage unless both
/// windows have the same duration. Disjoint or touching windows, and a
/// zero-length `a`, give [`OverlapResult::NONE`].
pub fn calculate_overlap(a: &TemporalWindow, b: &TemporalWindow) -> OverlapResult {
    let start = a.start_time.max(b.start_time);
    let end = a.end_time.min(b.end_time);
    if end <= start {
        return OverlapResult::NONE;
    }

    let duration = end - start;
    let base = a.duration();
    if base <= 0 {
        return OverlapResult::NONE;
    }

    let fraction = duration as f64 / base as f64;
    OverlapResult {
        percentage: ((fraction * 100.0).round() / 100.0).clamp(0.0, 1.0),
        duration,
    }
}
