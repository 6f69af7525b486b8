//! End-to-end level builds through the public API

use dv_core::content::{
    ContentContext, ContentPack, ContentProbabilityTable, ContentRule, ContentType,
    LocalizationRule, Phase, PhaseRules, PlacementRule, Protagonist, StandardContentSet,
};
use dv_core::dungeon::{RegionKind, SizeRange, TopologyConfig};
use dv_core::entity::ComponentScheduler;
use dv_core::logging::init_tracing;
use dv_core::{BuiltLevel, GameRng, GenerationError, GeneratorConfig, LevelBuilder};

fn content_set() -> StandardContentSet {
    let context = ContentContext {
        protagonist: Some(Protagonist::new("Ayla", 3)),
        companion_unlocked: true,
        ..ContentContext::default()
    };
    StandardContentSet::new(ContentPack::default(), context).unwrap()
}

fn three_room_config(table: ContentProbabilityTable) -> GeneratorConfig {
    let mut phases = PhaseRules::empty();
    phases.insert(Phase::FirstVisit, table);
    GeneratorConfig {
        topology: TopologyConfig {
            rooms: SizeRange::new(3, 3),
            min_rooms: 3,
            ..TopologyConfig::default()
        },
        phases,
        ..GeneratorConfig::default()
    }
}

/// Build across seeds, skipping layouts the carver gave up on
fn builds(config: GeneratorConfig, seeds: std::ops::Range<u64>) -> Vec<BuiltLevel> {
    let builder = LevelBuilder::new(config);
    let mut levels = Vec::new();
    for seed in seeds {
        let mut rng = GameRng::new(seed);
        match builder.build(Phase::FirstVisit, &mut content_set(), &mut rng) {
            Ok(level) => levels.push(level),
            Err(GenerationError::Topology(_)) => continue,
            Err(err) => panic!("seed {seed}: {err}"),
        }
    }
    assert!(!levels.is_empty(), "no seed produced a level");
    levels
}

#[test]
fn test_corridor_density_bound() {
    init_tracing("warn");
    let table = ContentProbabilityTable::builder()
        .rule(
            ContentType::Protagonist,
            ContentRule::exactly_once(LocalizationRule::MainRoom, PlacementRule::Any),
        )
        .weighted(ContentType::Destructible, ContentRule::any(), 1.0)
        .corridor_density(0.0, 0.075)
        .build()
        .unwrap();

    for built in builds(three_room_config(table), 0..40) {
        assert_eq!(built.level.rooms().count(), 3);
        for corridor in built.level.corridors() {
            let free = corridor.area() as f64;
            let placed = built.placements_in(corridor.id).count() as f64;
            assert!(
                placed / free <= 0.075 + 1.0 / free,
                "corridor {} holds {placed} of {free} cells",
                corridor.id
            );
            assert!(
                built
                    .placements_in(corridor.id)
                    .all(|p| p.content.kind == ContentType::Destructible)
            );
        }
        // Room density is 0..0: rooms hold only the protagonist
        for room in built.level.rooms() {
            assert!(
                built
                    .placements_in(room.id)
                    .all(|p| p.content.kind == ContentType::Protagonist)
            );
        }
    }
}

#[test]
fn test_exit_exactly_once_in_main_room() {
    let table = ContentProbabilityTable::builder()
        .rule(
            ContentType::Protagonist,
            ContentRule::exactly_once(LocalizationRule::MainRoom, PlacementRule::Any),
        )
        .rule(
            ContentType::Exit,
            ContentRule::exactly_once(LocalizationRule::MainRoom, PlacementRule::Edge),
        )
        .weighted(ContentType::Enemy, ContentRule::any(), 2.0)
        .weighted(ContentType::Destructible, ContentRule::any(), 1.0)
        .room_density(0.1, 0.3)
        .corridor_density(0.0, 0.1)
        .build()
        .unwrap();

    for built in builds(three_room_config(table), 100..130) {
        let exits: Vec<_> = built
            .placements
            .iter()
            .filter(|p| p.content.kind == ContentType::Exit)
            .collect();
        assert_eq!(exits.len(), 1);
        let main = built.level.main_region().unwrap();
        assert_eq!(main.kind, RegionKind::Room);
        assert_eq!(exits[0].region, main.id);
        assert!(main.contains(exits[0].position.0, exits[0].position.1));
    }
}

#[test]
fn test_zero_room_density_means_no_optional_content() {
    let table = ContentProbabilityTable::builder()
        .rule(
            ContentType::Entrance,
            ContentRule::exactly_once(LocalizationRule::MainRoom, PlacementRule::Edge),
        )
        .weighted(ContentType::Enemy, ContentRule::any(), 10.0)
        .weighted(ContentType::Destructible, ContentRule::any(), 10.0)
        .build()
        .unwrap();

    for built in builds(three_room_config(table), 200..220) {
        assert_eq!(built.placements.len(), 1);
        assert_eq!(built.count(ContentType::Entrance), 1);
    }
}

#[test]
fn test_placements_are_on_distinct_walkable_cells() {
    let builder = LevelBuilder::default();
    for seed in 300..310 {
        let mut rng = GameRng::new(seed);
        let built = match builder.build(Phase::FirstVisit, &mut content_set(), &mut rng) {
            Ok(built) => built,
            Err(GenerationError::Topology(_)) => continue,
            Err(err) => panic!("seed {seed}: {err}"),
        };
        let mut seen = std::collections::HashSet::new();
        for p in &built.placements {
            let (x, y) = p.position;
            assert!(built.level.is_passable(x, y));
            assert_eq!(built.level.region_at(x, y), Some(p.region));
            assert!(seen.insert(p.position), "two placements share {x},{y}");
            if p.content.is_obstacle() {
                assert!(!built.level.is_beside_door(x, y));
            }
        }
    }
}

#[test]
fn test_toml_config_drives_build() {
    let text = r#"
        seed = 4242

        [topology]
        rooms = { min = 4, max = 5 }

        [scaling]
        min_level_offset = 0
        max_level_offset = 0

        [phases.revisit]
        room_density = { min = 0.1, max = 0.2 }
        corridor_density = { min = 0.0, max = 0.0 }

        [phases.revisit.rules]
        protagonist = { creation = "exactly_once", localization = "main_room" }
        exit = { creation = "exactly_once", placement = "edge" }
        enemy = { creation = "any" }

        [phases.revisit.weights]
        enemy = 1.0
    "#;
    let config = GeneratorConfig::from_toml_str(text).unwrap();
    let builder = LevelBuilder::new(config);
    let mut set = content_set();
    set.context_mut().scaling = builder.config().scaling.clone();

    let built = builder
        .build(Phase::Revisit, &mut set, &mut builder.rng())
        .unwrap();
    assert_eq!(built.count(ContentType::Protagonist), 1);
    assert_eq!(built.count(ContentType::Exit), 1);
    for corridor in built.level.corridors() {
        assert_eq!(built.placements_in(corridor.id).count(), 0);
    }
    for p in &built.placements {
        if p.content.kind == ContentType::Enemy {
            assert_eq!(p.content.entity.level, 3);
        }
    }

    // First visit has no table in this file
    let missing = builder.build(Phase::FirstVisit, &mut set, &mut builder.rng());
    assert!(matches!(missing, Err(GenerationError::Precondition(_))));
}

#[test]
fn test_activated_level_runs() {
    let builder = LevelBuilder::new(GeneratorConfig::default().with_seed(77));
    let built = builder
        .build(Phase::FirstVisit, &mut content_set(), &mut builder.rng())
        .unwrap();
    let total = built.placements.len();

    let mut scheduler = ComponentScheduler::new();
    let active = built.activate(&mut scheduler);
    assert_eq!(scheduler.len(), total);
    for _ in 0..120 {
        scheduler.update(1.0 / 60.0);
    }
    assert_eq!(scheduler.frame(), 120);
    assert_eq!(active.release(&mut scheduler), total);
    assert!(scheduler.is_empty());
}
