//! Subcommands of the `timeverse` binary.
//!
//! Every command produces a [`CommandOutput`]: a JSON document for `--json`
//! and plain text lines otherwise. Nothing here prints.

use clap::Subcommand;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use timeverse_core::timeverse_reality::{category_distribution, find_universes_by_reality_level};
use timeverse_core::timeverse_time::{format_duration, format_relative, format_timestamp};
use timeverse_core::timeverse_window::SignificanceOrder;
use timeverse_core::{
    analyze_reference, analyze_universe, InitReport, RealityCategory, RealityRelationType, ReferenceType,
    SearchOptions, Universe, UniverseRegistry, UniverseType, WindowSearch,
};

use crate::error::CliError;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List registered universes
    List {
        /// Only this universe type (film, mission, biography, ...)
        #[arg(long = "type")]
        universe_type: Option<UniverseType>,

        /// Only this reality relation (documentary, pure_fiction, ...)
        #[arg(long)]
        reality: Option<RealityRelationType>,

        /// Include network placeholders
        #[arg(long)]
        placeholders: bool,
    },

    /// Show one universe by id or alias
    Show { id: String },

    /// Universes with temporal presence in a window (cal:YYYY or a declared window id)
    Window {
        window: String,

        /// Keep only these types (repeatable)
        #[arg(long = "type")]
        types: Vec<UniverseType>,

        /// Inclusive upper bound on the declared fictionalization degree
        #[arg(long)]
        max_fiction: Option<f64>,

        #[arg(long)]
        reality: Option<RealityRelationType>,

        /// Sort by cultural significance (asc, desc)
        #[arg(long)]
        sort: Option<SignificanceOrder>,

        /// Also list keyframes inside the window
        #[arg(long)]
        keyframes: bool,
    },

    /// Declared windows overlapping a window
    Align { window: String },

    /// Universes by analyzed reality level
    Reality {
        #[arg(long, default_value = "0.0")]
        min: f64,

        #[arg(long, default_value = "1.0")]
        max: f64,

        #[arg(long)]
        category: Option<RealityCategory>,
    },

    /// Reality level of a reference from one universe to another
    Reference {
        source: String,
        target: String,
        /// documents, depicts, recreates, inspired_by, sublimated, allegorizes,
        /// parodies, reinterprets, mythologizes, metafiction, or any other label
        reference_type: ReferenceType,
    },

    /// Registry statistics
    Stats,
}

/// Rendered result of a command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub json: Value,
    pub lines: Vec<String>,
}

impl CommandOutput {
    fn new(json: Value, lines: Vec<String>) -> Self {
        Self { json, lines }
    }
}

/// Run `command` against an initialized registry
pub fn execute(command: &Command, registry: &UniverseRegistry, report: &InitReport) -> Result<CommandOutput, CliError> {
    match command {
        Command::List {
            universe_type,
            reality,
            placeholders,
        } => list(registry, *universe_type, *reality, *placeholders),
        Command::Show { id } => show(registry, id),
        Command::Window {
            window,
            types,
            max_fiction,
            reality,
            sort,
            keyframes,
        } => {
            let mut options = SearchOptions {
                max_fictionalization: *max_fiction,
                reality_type: *reality,
                sort: *sort,
                ..Default::default()
            };
            for t in types {
                options = options.with_type(*t);
            }
            window_search(registry, window, &options, *keyframes)
        }
        Command::Align { window } => align(registry, window),
        Command::Reality { min, max, category } => reality_levels(registry, *min, *max, *category),
        Command::Reference {
            source,
            target,
            reference_type,
        } => reference(registry, source, target, reference_type),
        Command::Stats => stats(registry, report),
    }
}

fn list(
    registry: &UniverseRegistry,
    universe_type: Option<UniverseType>,
    reality: Option<RealityRelationType>,
    placeholders: bool,
) -> Result<CommandOutput, CliError> {
    let universes: Vec<Universe> = if placeholders {
        registry.get_all_universes()
    } else {
        registry.universes().cloned().collect()
    };

    let views: Vec<_> = universes
        .iter()
        .filter(|u| universe_type.map_or(true, |t| u.universe_type == t))
        .filter(|u| reality.map_or(true, |r| u.reality_relation.relation_type == r))
        .map(Universe::search_view)
        .collect();

    let lines = views
        .iter()
        .map(|v| {
            format!(
                "{:<45} {:<18} {:<18} {:.2}  {}",
                v.universe_id.as_str(),
                v.universe_type.name(),
                v.reality_type.name(),
                v.fictionalization_degree,
                v.primary
            )
        })
        .collect();

    Ok(CommandOutput::new(serde_json::to_value(&views)?, lines))
}

fn show(registry: &UniverseRegistry, id: &str) -> Result<CommandOutput, CliError> {
    let universe = registry
        .get_universe(id)
        .ok_or_else(|| CliError::UnknownUniverse(id.to_string()))?;
    let analysis = analyze_universe(&universe);
    let networks: Vec<&str> = registry
        .networks_containing(id)
        .into_iter()
        .map(|n| n.name.as_str())
        .collect();
    let placeholder = registry.is_placeholder(universe.universe_id.as_str());

    let mut lines = vec![
        format!("{} ({})", universe.identifiers.primary, universe.universe_id),
        format!("  type:      {}", universe.universe_type),
        format!(
            "  reality:   {} (declared {:.2}) → {:.3} {} [confidence {:.2}]",
            universe.reality_relation.relation_type,
            universe.reality_relation.fictionalization_degree,
            analysis.level,
            analysis.category,
            analysis.confidence
        ),
    ];
    if placeholder {
        lines.push("  placeholder registered by a network".to_string());
    }
    if !universe.identifiers.aliases.is_empty() {
        lines.push(format!("  aliases:   {}", universe.identifiers.aliases.join(", ")));
    }
    if !networks.is_empty() {
        lines.push(format!("  networks:  {}", networks.join(", ")));
    }

    for layer in &universe.layers {
        lines.push(format!("  layer {}", layer.name));
        for (key, epoch) in &layer.epochs {
            lines.push(format!(
                "    {:<12} {} → {} ({})",
                key,
                format_timestamp(epoch.start_time),
                format_timestamp(epoch.end_time),
                format_duration(epoch.duration())
            ));
        }
    }

    for window in &universe.temporal_windows {
        lines.push(format!(
            "  window {} {} → {}",
            window.window_id,
            format_timestamp(window.start_time),
            format_timestamp(window.end_time)
        ));
    }

    if let Some(structure) = &universe.temporal_structure {
        let zeroed: Vec<_> = universe.layer_epochs().filter(|e| e.zero_point.is_some()).collect();
        for keyframe in &structure.keyframes {
            let relative = zeroed
                .first()
                .and_then(|epoch| format_relative(epoch, keyframe.timestamp))
                .map(|label| format!(" [{}]", label))
                .unwrap_or_default();
            lines.push(format!(
                "  keyframe {} at {}{}",
                keyframe.keyframe_id,
                format_timestamp(keyframe.timestamp),
                relative
            ));
        }
    }

    let json = json!({
        "universe": serde_json::to_value(&*universe)?,
        "analysis": analysis,
        "networks": networks,
        "placeholder": placeholder,
    });
    Ok(CommandOutput::new(json, lines))
}

fn window_search(
    registry: &UniverseRegistry,
    window_id: &str,
    options: &SearchOptions,
    keyframes: bool,
) -> Result<CommandOutput, CliError> {
    let search = WindowSearch::new(registry);
    let window = search
        .get_window(window_id)
        .ok_or_else(|| CliError::UnknownWindow(window_id.to_string()))?;

    let hits = search.find_universes_overlapping(&window, options);
    let mut lines = vec![format!(
        "{} {} → {}: {} universe(s)",
        window.window_id,
        format_timestamp(window.start_time),
        format_timestamp(window.end_time),
        hits.len()
    )];
    lines.extend(hits.iter().map(|u| {
        format!(
            "  {:<45} {:.2}  {}",
            u.universe_id.as_str(),
            u.cultural_significance(),
            u.identifiers.primary
        )
    }));

    let keyframe_hits = if keyframes {
        search.keyframes_in_window(window_id)
    } else {
        Vec::new()
    };
    lines.extend(keyframe_hits.iter().map(|hit| {
        format!(
            "  * {} {} ({})",
            format_timestamp(hit.keyframe.timestamp),
            hit.keyframe.keyframe_id,
            hit.universe_id
        )
    }));

    let json = json!({
        "window": window,
        "universes": hits.iter().map(|u| u.search_view()).collect::<Vec<_>>(),
        "keyframes": keyframe_hits,
    });
    Ok(CommandOutput::new(json, lines))
}

fn align(registry: &UniverseRegistry, window_id: &str) -> Result<CommandOutput, CliError> {
    let search = WindowSearch::new(registry);
    if search.get_window(window_id).is_none() {
        return Err(CliError::UnknownWindow(window_id.to_string()));
    }

    let alignments = search.get_window_alignments(window_id);
    let lines = alignments
        .iter()
        .map(|a| {
            format!(
                "{:<30} {:>5.0}%  {:<10} {}{}",
                a.window.window_id,
                a.overlap.percentage * 100.0,
                format_duration(a.overlap.duration),
                a.universe_id,
                if a.semantic_alignment { "  (semantic)" } else { "" }
            )
        })
        .collect();

    Ok(CommandOutput::new(serde_json::to_value(&alignments)?, lines))
}

fn reality_levels(
    registry: &UniverseRegistry,
    min: f64,
    max: f64,
    category: Option<RealityCategory>,
) -> Result<CommandOutput, CliError> {
    if min > max {
        return Err(CliError::invalid(format!("--min {} exceeds --max {}", min, max)));
    }

    let matches = find_universes_by_reality_level(registry.universes(), min, max, category);
    let lines = matches
        .iter()
        .map(|(u, a)| format!("{:.3}  {:<20} {}", a.level, a.category.name(), u.universe_id))
        .collect();
    let json: Vec<Value> = matches
        .iter()
        .map(|(u, a)| {
            json!({
                "universeId": u.universe_id,
                "primary": u.identifiers.primary,
                "level": a.level,
                "category": a.category,
                "confidence": a.confidence,
            })
        })
        .collect();

    Ok(CommandOutput::new(Value::Array(json), lines))
}

fn reference(
    registry: &UniverseRegistry,
    source_id: &str,
    target_id: &str,
    reference_type: &ReferenceType,
) -> Result<CommandOutput, CliError> {
    let source = registry
        .get_universe(source_id)
        .ok_or_else(|| CliError::UnknownUniverse(source_id.to_string()))?;
    let target = registry
        .get_universe(target_id)
        .ok_or_else(|| CliError::UnknownUniverse(target_id.to_string()))?;

    let analysis = analyze_reference(&source, &target, reference_type);
    let mut lines = vec![format!(
        "{} {} {} → {:.3} {} [confidence {:.2}]",
        source.universe_id, reference_type, target.universe_id, analysis.level, analysis.category, analysis.confidence
    )];
    lines.extend(analysis.evidence.iter().map(|e| format!("  - {}", e)));

    let json = json!({
        "source": source.universe_id,
        "target": target.universe_id,
        "referenceType": reference_type,
        "analysis": analysis,
    });
    Ok(CommandOutput::new(json, lines))
}

fn stats(registry: &UniverseRegistry, report: &InitReport) -> Result<CommandOutput, CliError> {
    let stats = registry.stats();
    let categories: BTreeMap<String, usize> = category_distribution(registry.universes())
        .into_iter()
        .map(|(category, count)| (category.name().to_string(), count))
        .collect();

    let mut lines = vec![
        format!("universes:    {}", stats.total_universes),
        format!("placeholders: {}", stats.placeholders),
        format!("aliases:      {}", stats.aliases),
        format!("networks:     {}", stats.networks),
        format!("layers:       {}", stats.total_layers),
        format!("epochs:       {}", stats.total_epochs),
        format!("windows:      {}", stats.total_windows),
    ];
    lines.extend(stats.by_type.iter().map(|(t, n)| format!("  type {:<20} {}", t, n)));
    lines.extend(categories.iter().map(|(c, n)| format!("  reality {:<17} {}", c, n)));
    lines.extend(
        report
            .skipped_sources
            .iter()
            .map(|s| format!("  skipped source {}: {}", s.source, s.reason)),
    );
    lines.extend(
        report
            .rejected
            .iter()
            .map(|r| format!("  rejected {} from {}: {}", r.item, r.source, r.reason)),
    );

    let json = json!({
        "registry": stats,
        "realityCategories": categories,
        "initialization": report,
    });
    Ok(CommandOutput::new(json, lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeverse_core::timeverse_time::date_to_nanoseconds;

    fn registry() -> (UniverseRegistry, InitReport) {
        let mut registry = UniverseRegistry::new();
        let report = registry.initialize(&[]).unwrap();
        (registry, report)
    }

    fn run(command: Command) -> Result<CommandOutput, CliError> {
        let (registry, report) = registry();
        execute(&command, &registry, &report)
    }

    #[test]
    fn test_list() {
        let output = run(Command::List {
            universe_type: Some(UniverseType::Film),
            reality: None,
            placeholders: false,
        })
        .unwrap();
        assert_eq!(output.json.as_array().unwrap().len(), 5);
        assert_eq!(output.lines.len(), 5);

        let all = run(Command::List {
            universe_type: None,
            reality: None,
            placeholders: true,
        })
        .unwrap();
        assert_eq!(all.lines.len(), 10);
    }

    #[test]
    fn test_show_by_alias() {
        let output = run(Command::Show { id: "apollo11".to_string() }).unwrap();
        assert_eq!(output.json["universe"]["universeId"], "mission:apollo_11:1969");
        assert_eq!(output.json["networks"][0], "Apollo Program");
        assert_eq!(output.json["analysis"]["category"], "pure_reality");
        assert!(output.lines.iter().any(|l| l.contains("eagle_landing") && l.contains("T+")));
    }

    #[test]
    fn test_show_medieval_universe() {
        let output = run(Command::Show {
            id: "hastings1066".to_string(),
        })
        .unwrap();
        let start = date_to_nanoseconds(1066, 10, 14).unwrap();
        assert!(start < i128::from(i64::MIN));
        assert_eq!(
            output.json["universe"]["epochs"]["hastings_battle"]["startTime"].to_string(),
            start.to_string()
        );
        assert!(output.lines.iter().any(|l| l.contains("1066-10-14T00:00:00.000Z")));
    }

    #[test]
    fn test_medieval_window_and_full_listing() {
        let output = run(Command::Window {
            window: "cal:1066".to_string(),
            types: vec![],
            max_fiction: None,
            reality: None,
            sort: None,
            keyframes: false,
        })
        .unwrap();
        assert_eq!(output.json["universes"][0]["universeId"], "historical_event:battle_of_hastings:1066");

        let all = run(Command::List {
            universe_type: None,
            reality: None,
            placeholders: false,
        })
        .unwrap();
        assert_eq!(all.json.as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_show_placeholder() {
        let output = run(Command::Show {
            id: "mission:apollo_13:1970".to_string(),
        })
        .unwrap();
        assert_eq!(output.json["placeholder"], true);
        assert_eq!(output.json["universe"]["type"], "network");
    }

    #[test]
    fn test_show_unknown() {
        let result = run(Command::Show { id: "nothing".to_string() });
        assert!(matches!(result, Err(CliError::UnknownUniverse(_))));
    }

    #[test]
    fn test_window() {
        let output = run(Command::Window {
            window: "cal:1969".to_string(),
            types: vec![],
            max_fiction: None,
            reality: None,
            sort: Some(SignificanceOrder::Descending),
            keyframes: true,
        })
        .unwrap();
        let universes = output.json["universes"].as_array().unwrap();
        assert_eq!(universes.len(), 3);
        assert_eq!(universes[0]["universeId"], "mission:apollo_11:1969");
        assert_eq!(output.json["keyframes"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_window_unknown() {
        let result = run(Command::Window {
            window: "cal:19".to_string(),
            types: vec![],
            max_fiction: None,
            reality: None,
            sort: None,
            keyframes: false,
        });
        assert!(matches!(result, Err(CliError::UnknownWindow(_))));
    }

    #[test]
    fn test_align() {
        let output = run(Command::Align {
            window: "apollo_11_mission_window".to_string(),
        })
        .unwrap();
        let alignments = output.json.as_array().unwrap();
        assert_eq!(alignments.len(), 2);
        assert_eq!(alignments[1]["semanticAlignment"], true);
    }

    #[test]
    fn test_reality_levels() {
        let output = run(Command::Reality {
            min: 0.9,
            max: 1.0,
            category: None,
        })
        .unwrap();
        assert_eq!(output.json[0]["universeId"], "film:back_to_the_future:1985");

        let inverted = run(Command::Reality {
            min: 0.5,
            max: 0.1,
            category: None,
        });
        assert!(matches!(inverted, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_reference() {
        let output = run(Command::Reference {
            source: "smb2013".to_string(),
            target: "mp1964".to_string(),
            reference_type: ReferenceType::Metafiction,
        })
        .unwrap();
        assert_eq!(output.json["analysis"]["level"], 0.9);
        assert_eq!(output.json["referenceType"], "metafiction");
    }

    #[test]
    fn test_stats() {
        let output = run(Command::Stats).unwrap();
        assert_eq!(output.json["registry"]["total_universes"], 9);
        assert_eq!(output.json["initialization"]["loaded_sources"][0], "builtin");
    }
}
