//! The "REALITY" Engine - fictionalization gradient analysis
//!
//! Turns a universe's declared reality relation into a single comparable
//! level in [0, 1] (0 = documented reality, 1 = pure invention), a category
//! band, a confidence and the list of rules that fired. Works on plain
//! [`Universe`] values; no registry needed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{RealityRelationType, Universe};

const BASE_CONFIDENCE: f64 = 0.8;
const DOCUMENTARY_CONFIDENCE: f64 = 0.95;
/// Upper bound on the reduction anchors can apply
const MAX_ANCHOR_REDUCTION: f64 = 0.3;
const CONSULTANT_FACTOR: f64 = 0.9;
const ACCURACY_CLAIM_FACTOR: f64 = 0.8;

// ============================================================================
// CATEGORIES
// ============================================================================

/// Ten fixed bands over the final level (inclusive upper bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealityCategory {
    PureReality,
    DocumentedReality,
    InterpretedReality,
    DramatizedReality,
    InspiredFiction,
    HistoricalFiction,
    FantasyRealism,
    SoftFiction,
    HardFiction,
    PureFantasy,
}

impl RealityCategory {
    pub const ALL: [RealityCategory; 10] = [
        RealityCategory::PureReality,
        RealityCategory::DocumentedReality,
        RealityCategory::InterpretedReality,
        RealityCategory::DramatizedReality,
        RealityCategory::InspiredFiction,
        RealityCategory::HistoricalFiction,
        RealityCategory::FantasyRealism,
        RealityCategory::SoftFiction,
        RealityCategory::HardFiction,
        RealityCategory::PureFantasy,
    ];

    pub fn from_level(level: f64) -> Self {
        match level {
            l if l <= 0.05 => RealityCategory::PureReality,
            l if l <= 0.15 => RealityCategory::DocumentedReality,
            l if l <= 0.25 => RealityCategory::InterpretedReality,
            l if l <= 0.35 => RealityCategory::DramatizedReality,
            l if l <= 0.45 => RealityCategory::InspiredFiction,
            l if l <= 0.55 => RealityCategory::HistoricalFiction,
            l if l <= 0.65 => RealityCategory::FantasyRealism,
            l if l <= 0.75 => RealityCategory::SoftFiction,
            l if l <= 0.85 => RealityCategory::HardFiction,
            _ => RealityCategory::PureFantasy,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RealityCategory::PureReality => "pure_reality",
            RealityCategory::DocumentedReality => "documented_reality",
            RealityCategory::InterpretedReality => "interpreted_reality",
            RealityCategory::DramatizedReality => "dramatized_reality",
            RealityCategory::InspiredFiction => "inspired_fiction",
            RealityCategory::HistoricalFiction => "historical_fiction",
            RealityCategory::FantasyRealism => "fantasy_realism",
            RealityCategory::SoftFiction => "soft_fiction",
            RealityCategory::HardFiction => "hard_fiction",
            RealityCategory::PureFantasy => "pure_fantasy",
        }
    }
}

impl fmt::Display for RealityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RealityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RealityCategory::ALL
            .into_iter()
            .find(|c| c.name() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown reality category: {}", s))
    }
}

/// Outcome of a reality analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealityAnalysis {
    /// 0.0 (documented reality) - 1.0 (pure invention)
    pub level: f64,
    pub category: RealityCategory,
    pub confidence: f64,
    /// One entry per rule that fired, in order
    pub evidence: Vec<String>,
}

// ============================================================================
// SINGLE UNIVERSE
// ============================================================================

/// Analyze one universe's reality relation
pub fn analyze_universe(universe: &Universe) -> RealityAnalysis {
    let relation = &universe.reality_relation;
    let mut level = relation.fictionalization_degree;
    let mut confidence = BASE_CONFIDENCE;
    let mut evidence = Vec::new();

    match relation.relation_type {
        RealityRelationType::Documentary => {
            level = level.min(0.1);
            confidence = DOCUMENTARY_CONFIDENCE;
            evidence.push("Documentary: level capped at 0.1".to_string());
        }
        RealityRelationType::HistoricalFiction => {
            level = level.max(0.4);
            evidence.push("Historical fiction: level at least 0.4".to_string());
        }
        RealityRelationType::InspiredBy => {
            level = level.max(0.3);
            evidence.push("Inspired by real events: level at least 0.3".to_string());
        }
        RealityRelationType::PureFiction => {
            level = level.max(0.7);
            evidence.push("Pure fiction: level at least 0.7".to_string());
        }
        RealityRelationType::Metafiction => {
            level = level.max(0.8);
            evidence.push("Metafiction: level at least 0.8".to_string());
        }
    }

    let anchors = &relation.reality_anchors;
    if !anchors.is_empty() {
        let mean = anchors.iter().map(|a| a.confidence).sum::<f64>() / anchors.len() as f64;
        level *= 1.0 - mean * MAX_ANCHOR_REDUCTION;
        evidence.push(format!(
            "{} reality anchor(s), mean confidence {:.2}",
            anchors.len(),
            mean
        ));
    }

    if !relation.historical_consultants.is_empty() {
        level *= CONSULTANT_FACTOR;
        evidence.push(format!(
            "Historical consultants: {}",
            relation.historical_consultants.join(", ")
        ));
    }

    if relation.claims_historical_accuracy == Some(true) {
        level *= ACCURACY_CLAIM_FACTOR;
        evidence.push("Claims historical accuracy".to_string());
    }

    let category = RealityCategory::from_level(level);
    RealityAnalysis {
        level: level.clamp(0.0, 1.0),
        category,
        confidence,
        evidence,
    }
}

// ============================================================================
// CROSS-UNIVERSE REFERENCES
// ============================================================================

/// How one universe refers to another
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReferenceType {
    Documents,
    Depicts,
    Recreates,
    InspiredBy,
    Sublimated,
    Allegorizes,
    Parodies,
    Reinterprets,
    Mythologizes,
    Metafiction,
    /// Unlisted; combined as the plain average
    Other(String),
}

impl ReferenceType {
    pub fn name(&self) -> &str {
        match self {
            ReferenceType::Documents => "documents",
            ReferenceType::Depicts => "depicts",
            ReferenceType::Recreates => "recreates",
            ReferenceType::InspiredBy => "inspired_by",
            ReferenceType::Sublimated => "sublimated",
            ReferenceType::Allegorizes => "allegorizes",
            ReferenceType::Parodies => "parodies",
            ReferenceType::Reinterprets => "reinterprets",
            ReferenceType::Mythologizes => "mythologizes",
            ReferenceType::Metafiction => "metafiction",
            ReferenceType::Other(name) => name,
        }
    }

    /// Combined level from the two analyzed levels (unclamped)
    fn combine(&self, source: f64, target: f64) -> f64 {
        let average = (source + target) / 2.0;
        match self {
            ReferenceType::Documents | ReferenceType::Depicts => target,
            ReferenceType::Recreates => target + 0.1,
            ReferenceType::InspiredBy => target + 0.3,
            ReferenceType::Sublimated | ReferenceType::Allegorizes => (target + 0.4).max(0.6),
            ReferenceType::Parodies | ReferenceType::Reinterprets => average + 0.2,
            ReferenceType::Mythologizes => target.max(0.8),
            ReferenceType::Metafiction => 0.9,
            ReferenceType::Other(_) => average,
        }
    }
}

impl From<&str> for ReferenceType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "documents" => ReferenceType::Documents,
            "depicts" => ReferenceType::Depicts,
            "recreates" => ReferenceType::Recreates,
            "inspired_by" => ReferenceType::InspiredBy,
            "sublimated" => ReferenceType::Sublimated,
            "allegorizes" => ReferenceType::Allegorizes,
            "parodies" => ReferenceType::Parodies,
            "reinterprets" => ReferenceType::Reinterprets,
            "mythologizes" => ReferenceType::Mythologizes,
            "metafiction" => ReferenceType::Metafiction,
            _ => ReferenceType::Other(s.to_string()),
        }
    }
}

impl From<String> for ReferenceType {
    fn from(s: String) -> Self {
        ReferenceType::from(s.as_str())
    }
}

impl From<ReferenceType> for String {
    fn from(reference_type: ReferenceType) -> Self {
        reference_type.name().to_string()
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ReferenceType::from(s))
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Level of `source` when it refers to `target` in the given way
///
/// Confidence is the lower of the two individual confidences.
pub fn analyze_reference(source: &Universe, target: &Universe, reference_type: &ReferenceType) -> RealityAnalysis {
    let source_analysis = analyze_universe(source);
    let target_analysis = analyze_universe(target);

    let level = reference_type
        .combine(source_analysis.level, target_analysis.level)
        .clamp(0.0, 1.0);

    RealityAnalysis {
        level,
        category: RealityCategory::from_level(level),
        confidence: source_analysis.confidence.min(target_analysis.confidence),
        evidence: vec![
            format!("Source {} at {:.2}", source.universe_id, source_analysis.level),
            format!("Target {} at {:.2}", target.universe_id, target_analysis.level),
            format!("Reference type '{}'", reference_type),
        ],
    }
}

// ============================================================================
// COLLECTIONS
// ============================================================================

/// Universes whose analyzed level lies in `[min, max]`, ascending by level
pub fn find_universes_by_reality_level<'a>(
    universes: impl IntoIterator<Item = &'a Universe>,
    min: f64,
    max: f64,
    category: Option<RealityCategory>,
) -> Vec<(&'a Universe, RealityAnalysis)> {
    let mut matches: Vec<(&'a Universe, RealityAnalysis)> = universes
        .into_iter()
        .map(|u| (u, analyze_universe(u)))
        .filter(|(_, a)| a.level >= min && a.level <= max)
        .filter(|(_, a)| category.map_or(true, |c| a.category == c))
        .collect();

    matches.sort_by(|(_, a), (_, b)| a.level.partial_cmp(&b.level).unwrap_or(Ordering::Equal));
    matches
}

/// Count of universes per category
pub fn category_distribution<'a>(
    universes: impl IntoIterator<Item = &'a Universe>,
) -> BTreeMap<RealityCategory, usize> {
    let mut distribution = BTreeMap::new();
    for universe in universes {
        *distribution
            .entry(analyze_universe(universe).category)
            .or_insert(0) += 1;
    }
    distribution
}
