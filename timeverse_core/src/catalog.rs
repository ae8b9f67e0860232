//! Built-in universe catalog.
//!
//! Loaded by [`UniverseRegistry::initialize`] before any external source, so
//! external batches can add ids and aliases but never replace these entries.
//!
//! [`UniverseRegistry::initialize`]: crate::UniverseRegistry::initialize

use crate::error::{RegistryError, SourceError};
use crate::model::{
    Attribution, ConfigBatch, NetworkEra, Precision, RealityRelation, RealityRelationType,
    TemporalEpoch, TemporalLayer, TemporalStructure, Universe, UniverseId, UniverseNetwork,
    UniverseType, WindowAlias, WindowingStrategy,
};
use crate::sources::ConfigSource;
use crate::timeverse_time::{
    create_epoch, create_keyframe, create_runtime_epoch, create_segment, create_window,
    date_to_nanoseconds, datetime_to_nanoseconds, hours_to_nanoseconds, CalendarDay,
};

fn uid(raw: &str) -> Result<UniverseId, RegistryError> {
    UniverseId::parse(raw)
}

fn day(year: i32, month: u32, day: u32) -> CalendarDay {
    CalendarDay::new(year, month, day)
}

/// The built-in dataset
pub fn builtin_catalog() -> Result<ConfigBatch, RegistryError> {
    Ok(ConfigBatch {
        universes: vec![
            mary_poppins()?,
            saving_mr_banks()?,
            back_to_the_future()?,
            apollo_11()?,
            apollo_13_film()?,
            for_all_mankind()?,
            heartbleed()?,
            ada_lovelace()?,
            battle_of_hastings()?,
        ],
        networks: vec![apollo_program()?],
        malformed: Vec::new(),
    })
}

/// [`builtin_catalog`] as a [`ConfigSource`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl ConfigSource for BuiltinCatalog {
    fn name(&self) -> &str {
        "builtin"
    }

    fn load_batch(&self) -> Result<Option<ConfigBatch>, SourceError> {
        builtin_catalog()
            .map(Some)
            .map_err(|e| SourceError::malformed(e.to_string()))
    }
}

// ============================================================================
// FILMS
// ============================================================================

fn mary_poppins() -> Result<Universe, RegistryError> {
    let narrative = create_epoch(
        day(1910, 5, 1),
        day(1910, 5, 31),
        Precision::Day,
        Some("mary_poppins_narrative"),
        Some("Edwardian London, Cherry Tree Lane"),
    )?;

    Ok(Universe::new(
        uid("disney:mary_poppins:1964")?,
        UniverseType::Film,
        "Mary Poppins",
        RealityRelation::new(RealityRelationType::PureFiction, 0.85),
    )
    .with_alias("mp1964")
    .with_alias("mary_poppins")
    .with_layer(TemporalLayer::new("runtime").with_epoch(
        "main",
        create_runtime_epoch(139, Precision::Second, Some("mary_poppins_runtime"), Some("Theatrical cut")),
    ))
    .with_layer(TemporalLayer::new("narrative_1910").with_epoch("story", narrative))
    .with_attribution(Attribution {
        copyright: Some("Walt Disney Productions".to_string()),
        public_domain: false,
        source: None,
    })
    .with_significance(0.85))
}

fn saving_mr_banks() -> Result<Universe, RegistryError> {
    let production = create_epoch(
        day(1961, 4, 1),
        day(1964, 8, 27),
        Precision::Day,
        Some("saving_mr_banks_narrative_1961"),
        Some("Rights negotiation through premiere"),
    )?;
    let childhood = create_epoch(
        day(1906, 1, 1),
        day(1907, 12, 31),
        Precision::Month,
        Some("saving_mr_banks_narrative_1906"),
        Some("Travers' childhood in Allora"),
    )?;

    let mut relation = RealityRelation::new(RealityRelationType::HistoricalFiction, 0.45)
        .with_anchor("mary_poppins_production", "depicts", 0.7);
    relation.claims_historical_accuracy = Some(false);

    Ok(Universe::new(
        uid("disney:saving_mr_banks:2013")?,
        UniverseType::Film,
        "Saving Mr. Banks",
        relation,
    )
    .with_alias("smb2013")
    .with_layer(TemporalLayer::new("runtime").with_epoch(
        "main",
        create_runtime_epoch(125, Precision::Second, Some("saving_mr_banks_runtime"), None),
    ))
    .with_layer(
        TemporalLayer::new("narrative")
            .with_epoch("production", production)
            .with_epoch("childhood", childhood),
    )
    .with_window(create_window(
        "mary_poppins_production",
        day(1961, 4, 1),
        day(1964, 8, 27),
        Precision::Day,
        vec![WindowAlias::new("year", "1964"), WindowAlias::new("event", "mary_poppins_premiere")],
    )?)
    .with_significance(0.55))
}

fn back_to_the_future() -> Result<Universe, RegistryError> {
    let lightning = create_keyframe(
        "clock_tower_lightning",
        day(1955, 11, 12).at(22, 4, 0, 0),
        1.0,
        &["time_travel", "hill_valley"],
        None,
    )?;

    Ok(Universe::new(
        uid("film:back_to_the_future:1985")?,
        UniverseType::Film,
        "Back to the Future",
        RealityRelation::new(RealityRelationType::PureFiction, 0.95),
    )
    .with_alias("bttf")
    .with_layer(TemporalLayer::new("runtime").with_epoch(
        "main",
        create_runtime_epoch(116, Precision::Second, Some("bttf_runtime"), None),
    ))
    .with_layer(TemporalLayer::new("narrative_1985").with_epoch(
        "present",
        create_epoch(day(1985, 10, 25), day(1985, 10, 26), Precision::Minute, Some("bttf_1985"), None)?,
    ))
    .with_layer(TemporalLayer::new("narrative_1955").with_epoch(
        "past",
        create_epoch(day(1955, 11, 5), day(1955, 11, 12), Precision::Minute, Some("bttf_1955"), None)?,
    ))
    .with_structure(TemporalStructure {
        segments: vec![],
        keyframes: vec![lightning],
        windowing_strategy: Some(WindowingStrategy {
            name: "scene".to_string(),
            average_window_size: None,
        }),
    })
    .with_significance(0.9))
}

fn apollo_13_film() -> Result<Universe, RegistryError> {
    let mut relation = RealityRelation::new(RealityRelationType::HistoricalFiction, 0.35)
        .with_anchor("apollo_13_mission_1970", "dramatizes", 0.9);
    relation.historical_consultants = vec!["Jim Lovell".to_string(), "Dave Scott".to_string()];
    relation.claims_historical_accuracy = Some(true);

    Ok(Universe::new(
        uid("film:apollo_13:1995")?,
        UniverseType::Film,
        "Apollo 13",
        relation,
    )
    .with_alias("apollo13_film")
    .with_layer(TemporalLayer::new("runtime").with_epoch(
        "main",
        create_runtime_epoch(140, Precision::Second, Some("apollo_13_film_runtime"), None),
    ))
    .with_layer(TemporalLayer::new("narrative_1970").with_epoch(
        "mission",
        create_epoch(day(1970, 4, 11), day(1970, 4, 17), Precision::Minute, Some("apollo_13_story"), None)?,
    ))
    .with_window(create_window(
        "apollo_13_story_window",
        day(1969, 7, 20),
        day(1970, 4, 17),
        Precision::Day,
        vec![WindowAlias::new("event", "apollo_program"), WindowAlias::new("year", "1970")],
    )?)
    .with_significance(0.75))
}

fn for_all_mankind() -> Result<Universe, RegistryError> {
    let relation = RealityRelation::new(RealityRelationType::Documentary, 0.05)
        .with_anchor("apollo_program_footage", "documents", 0.95);

    Ok(Universe::new(
        uid("film:for_all_mankind:1989")?,
        UniverseType::Film,
        "For All Mankind",
        relation,
    )
    .with_layer(TemporalLayer::new("runtime").with_epoch(
        "main",
        create_runtime_epoch(80, Precision::Second, Some("for_all_mankind_runtime"), None),
    ))
    .with_window(create_window(
        "lunar_footage",
        day(1968, 12, 21),
        day(1972, 12, 19),
        Precision::Day,
        vec![WindowAlias::new("event", "moon_landing"), WindowAlias::new("event", "apollo_program")],
    )?)
    .with_significance(0.4))
}

// ============================================================================
// HISTORY
// ============================================================================

fn apollo_11() -> Result<Universe, RegistryError> {
    let launch = datetime_to_nanoseconds(1969, 7, 16, 13, 32, 0, 0)?;
    let mut mission = create_epoch(
        day(1969, 7, 16),
        day(1969, 7, 24),
        Precision::Second,
        Some("apollo_11_mission"),
        Some("Launch to splashdown"),
    )?
    .with_zero_point(launch, "launch");
    mission.start_time = launch - hours_to_nanoseconds(28);

    let structure = TemporalStructure {
        segments: vec![
            create_segment("outbound", day(1969, 7, 16), day(1969, 7, 19), "phase")?,
            create_segment("lunar_surface", day(1969, 7, 20), day(1969, 7, 21), "phase")?,
            create_segment("return", day(1969, 7, 21), day(1969, 7, 24), "phase")?,
        ],
        keyframes: vec![
            create_keyframe("launch", day(1969, 7, 16).at(13, 32, 0, 0), 0.9, &["apollo_11"], None)?,
            create_keyframe(
                "eagle_landing",
                day(1969, 7, 20).at(20, 17, 40, 0),
                1.0,
                &["apollo_11", "moon_landing"],
                None,
            )?,
            create_keyframe("splashdown", day(1969, 7, 24).at(16, 50, 35, 0), 0.8, &["apollo_11"], None)?,
        ],
        windowing_strategy: Some(WindowingStrategy {
            name: "mission_phase".to_string(),
            average_window_size: Some(hours_to_nanoseconds(48)),
        }),
    };

    let relation = RealityRelation::new(RealityRelationType::Documentary, 0.0)
        .with_anchor("moon_landing_1969", "is", 1.0);

    Ok(Universe::new(
        uid("mission:apollo_11:1969")?,
        UniverseType::Mission,
        "Apollo 11",
        relation,
    )
    .with_alias("apollo11")
    .with_alias("as-11")
    .with_layer(TemporalLayer::new("mission_elapsed").with_epoch("mission", mission))
    .with_structure(structure)
    .with_window(create_window(
        "apollo_11_mission_window",
        day(1969, 7, 16),
        day(1969, 7, 24),
        Precision::Second,
        vec![WindowAlias::new("year", "1969"), WindowAlias::new("event", "moon_landing")],
    )?)
    .with_attribution(Attribution {
        copyright: None,
        public_domain: true,
        source: Some("NASA".to_string()),
    })
    .with_significance(1.0))
}

fn heartbleed() -> Result<Universe, RegistryError> {
    let disclosure = TemporalEpoch::new(
        date_to_nanoseconds(2014, 4, 7)?,
        date_to_nanoseconds(2014, 4, 8)?,
        Precision::Hour,
    )
    .with_id("heartbleed_disclosure");

    let mut exposure = create_segment("vulnerable_window", day(2012, 3, 14), day(2014, 4, 7), "exposure")?;
    exposure.status = Some("exposed".to_string());

    let relation = RealityRelation::new(RealityRelationType::Documentary, 0.0)
        .with_anchor("cve-2014-0160", "is", 1.0);

    Ok(Universe::new(
        uid("security_incident:heartbleed:2014")?,
        UniverseType::SecurityIncident,
        "Heartbleed",
        relation,
    )
    .with_alias("cve-2014-0160")
    .with_alias("heartbleed")
    .with_layer(TemporalLayer::new("disclosure").with_epoch("public", disclosure))
    .with_structure(TemporalStructure {
        segments: vec![exposure],
        keyframes: vec![create_keyframe(
            "openssl_1_0_1g",
            day(2014, 4, 7).at(17, 0, 0, 0),
            0.9,
            &["patch"],
            Some(0.8),
        )?],
        windowing_strategy: None,
    })
    .with_window(create_window(
        "heartbleed_exposure",
        day(2012, 3, 14),
        day(2014, 4, 7),
        Precision::Day,
        vec![WindowAlias::new("year", "2014")],
    )?)
    .with_significance(0.6))
}

fn ada_lovelace() -> Result<Universe, RegistryError> {
    let mut relation = RealityRelation::new(RealityRelationType::Documentary, 0.1)
        .with_anchor("analytical_engine_notes_1843", "authored", 0.95);
    relation.reality_anchors[0].evidence = vec!["Sketch of the Analytical Engine, Note G".to_string()];

    Ok(Universe::new(
        uid("biography:ada_lovelace:1815-1852")?,
        UniverseType::Biography,
        "Ada Lovelace",
        relation,
    )
    .with_alias("lovelace")
    .with_layer(TemporalLayer::new("life").with_epoch(
        "lifetime",
        create_epoch(day(1815, 12, 10), day(1852, 11, 27), Precision::Day, Some("lovelace_lifetime"), None)?,
    ))
    .with_significance(0.7))
}

fn battle_of_hastings() -> Result<Universe, RegistryError> {
    let battle_day = day(1066, 10, 14);

    Ok(Universe::new(
        uid("historical_event:battle_of_hastings:1066")?,
        UniverseType::HistoricalEvent,
        "Battle of Hastings",
        RealityRelation::new(RealityRelationType::Documentary, 0.15)
            .with_anchor("bayeux_tapestry", "depicted_in", 0.6),
    )
    .with_alias("hastings1066")
    .with_layer(TemporalLayer::new("battle").with_epoch(
        "day",
        create_epoch(battle_day, battle_day, Precision::Hour, Some("hastings_battle"), None)?,
    ))
    .with_significance(0.8))
}

// ============================================================================
// NETWORKS
// ============================================================================

fn apollo_program() -> Result<UniverseNetwork, RegistryError> {
    Ok(UniverseNetwork::new("network:apollo_program", "Apollo Program")
        .with_member(uid("mission:apollo_11:1969")?)
        .with_member(uid("mission:apollo_13:1970")?)
        .with_member(uid("film:apollo_13:1995")?)
        .with_member(uid("film:for_all_mankind:1989")?)
        .with_era(NetworkEra {
            era_id: "planning".to_string(),
            name: "Planning and test flights".to_string(),
            start_time: date_to_nanoseconds(1961, 5, 25)?,
            end_time: date_to_nanoseconds(1969, 7, 15)?,
        })
        .with_era(NetworkEra {
            era_id: "lunar_landings".to_string(),
            name: "Lunar landings".to_string(),
            start_time: date_to_nanoseconds(1969, 7, 16)?,
            end_time: date_to_nanoseconds(1972, 12, 19)?,
        }))
}
