//! Integration tests for the HEXSTRAT simulation core
//!
//! Tests the full stack: map documents, world state, background searches,
//! the interaction state machine, terrain rebuilds, and overlay meshes

use std::sync::Arc;

use hexstrat_core::{
    find_path, find_reachable,
    interaction::{Command, InputEvent, InteractionHandler, InteractionState},
    mesh,
    terrain::LAYER_SEDIMENT,
    vancouver_area, GameConfig, HeightmapSettings, Hex, MapData, MapError, MovementScheme,
    RebuildRegion, TerrainConfig, TerrainEngine, TerrainType, TileGrid, UnitDefinition, World,
};
use hexstrat_jobs::{JobPoll, SearchScheduler};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Seeded random map
fn random_grid(radius: u32, seed: u64) -> TileGrid {
    TileGrid::generate(radius, &mut ChaCha8Rng::seed_from_u64(seed))
}

/// Open plain with a lake to the east and a ridge to the west
fn scenario_grid() -> TileGrid {
    let mut grid = TileGrid::new(5, TerrainType::OpenGround);
    for hex in [Hex::new(2, 0), Hex::new(2, -1), Hex::new(3, -1), Hex::new(3, 0)] {
        grid.set_terrain(hex, TerrainType::ShallowWater);
    }
    for hex in [Hex::new(-2, 0), Hex::new(-2, 1), Hex::new(-2, 2), Hex::new(-2, -1)] {
        grid.set_terrain(hex, TerrainType::Mountains);
    }
    grid.take_dirty();
    grid
}

fn definition(name: &str, scheme: MovementScheme) -> Arc<UnitDefinition> {
    Arc::new(UnitDefinition::new(name, scheme))
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hexstrat-{}-{}.json", name, std::process::id()))
}

// ============================================================================
// MAP DOCUMENTS
// ============================================================================

#[test]
fn test_map_document_file_roundtrip() {
    let grid = random_grid(8, 11);
    let path = temp_path("map");
    grid.to_map_data().save(&path).unwrap();
    let loaded = TileGrid::from_map_data(&MapData::load(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.radius(), 8);
    assert_eq!(loaded.len(), vancouver_area(8));
    for tile in grid.tiles() {
        assert_eq!(loaded.terrain_at(tile.hex()), Some(tile.terrain));
    }
}

#[test]
fn test_truncated_map_rejected() {
    let mut data = random_grid(3, 5).to_map_data();
    data.tiles.pop();
    assert_eq!(
        TileGrid::from_map_data(&data).unwrap_err(),
        MapError::InvalidTileCount(vancouver_area(3) - 1)
    );
}

#[test]
fn test_generated_map_has_ocean_rim() {
    let grid = random_grid(12, 3);
    for hex in Hex::vancouver_ring(Hex::ORIGIN, 12) {
        assert!(grid.terrain_at(hex).unwrap().is_water());
    }
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[test]
fn test_units_route_around_obstacles() {
    let mut world = World::new(scenario_grid());
    let jeep = world.spawn_unit(definition("jeep", MovementScheme::wheeled()), Hex::ORIGIN).unwrap();
    let boat = world
        .spawn_unit(definition("boat", MovementScheme::naval()), Hex::new(2, 0))
        .unwrap();

    // The jeep cannot cross the lake or the ridge
    let mover = world.mover(jeep).unwrap();
    assert!(find_path(world.grid(), Hex::ORIGIN, Hex::new(3, -1), &mover).is_none());
    let path = find_path(world.grid(), Hex::ORIGIN, Hex::new(4, -1), &mover.clone().with_move_power(10.0)).unwrap();
    for cell in path.cells() {
        assert_eq!(world.grid().terrain_at(*cell), Some(TerrainType::OpenGround));
    }

    // The boat stays inside the lake
    let reach = find_reachable(world.grid(), Hex::new(2, 0), &world.mover(boat).unwrap()).unwrap();
    assert_eq!(reach.landable.len(), 3);
    assert!(reach.pass_through.is_empty());
}

#[test]
fn test_walk_path_through_world() {
    let mut world = World::new(scenario_grid());
    let def = Arc::new(UnitDefinition::new("tank", MovementScheme::tracked()).with_move_power(2.0));
    let tank = world.spawn_unit(def, Hex::ORIGIN).unwrap();
    let goal = Hex::new(-3, 1);

    let path = find_path(world.grid(), Hex::ORIGIN, goal, &world.mover(tank).unwrap()).unwrap();
    for step in 0..path.steps() {
        world.apply_step(tank, &path, step).unwrap();
    }
    assert_eq!(world.unit(tank).unwrap().position, goal);
    let spent = 2.0 - world.unit(tank).unwrap().move_power;
    assert!((spent - path.total_cost()).abs() < 1e-5);
    assert!(world.unit_at(Hex::ORIGIN).is_none());
}

// ============================================================================
// BACKGROUND SEARCH
// ============================================================================

#[tokio::test]
async fn test_scheduler_on_world_snapshot() {
    let mut world = World::new(scenario_grid());
    let jeep = world.spawn_unit(definition("jeep", MovementScheme::wheeled()), Hex::ORIGIN).unwrap();
    let scheduler = SearchScheduler::new(tokio::runtime::Handle::current());

    let snapshot = world.snapshot();
    let job = scheduler.request_reach(jeep, snapshot, Hex::ORIGIN, world.mover(jeep).unwrap());
    // Edits after the request do not reach the running search
    world.set_terrain(Hex::new(1, 0), TerrainType::Mountains).unwrap();

    let reach = job.wait().await.unwrap();
    assert!(reach.contains(Hex::new(1, 0)));
    let fresh = find_reachable(world.grid(), Hex::ORIGIN, &world.mover(jeep).unwrap()).unwrap();
    assert!(!fresh.contains(Hex::new(1, 0)));
}

#[tokio::test]
async fn test_superseded_search_polls_none() {
    let scheduler = SearchScheduler::new(tokio::runtime::Handle::current());
    let grid = Arc::new(random_grid(10, 8));
    let mover = hexstrat_core::Mover::new(definition("plane", MovementScheme::aircraft()), Default::default(), 4.0);
    let unit = hexstrat_core::UnitId(9);

    let mut first = scheduler.request_reach(unit, Arc::clone(&grid), Hex::ORIGIN, mover.clone());
    let second = scheduler.request_reach(unit, grid, Hex::ORIGIN, mover);
    assert_eq!(first.poll(), JobPoll::Done(None));
    assert!(second.wait().await.is_some());
}

// ============================================================================
// INTERACTION
// ============================================================================

#[test]
fn test_interaction_drives_world() {
    let mut world = World::new(scenario_grid());
    let jeep = world.spawn_unit(definition("jeep", MovementScheme::wheeled()), Hex::ORIGIN).unwrap();
    let mut handler = InteractionHandler::new().with_step_seconds(0.1);
    let goal = Hex::new(0, 2);

    // Select, then service each command the handler issues
    let mut pending = handler.handle(&world, InputEvent::PrimaryClick(Hex::ORIGIN));
    let mut steps_applied = 0;
    let mut script = vec![
        InputEvent::Hover(goal),
        InputEvent::PrimaryClick(goal),
        InputEvent::Tick(0.1),
        InputEvent::Tick(0.1),
    ];
    script.reverse();

    loop {
        let mut follow_ups = Vec::new();
        for command in pending.drain(..) {
            match command {
                Command::RequestReach { unit } => {
                    let pos = world.unit(unit).unwrap().position;
                    let reach = find_reachable(world.grid(), pos, &world.mover(unit).unwrap());
                    follow_ups.push(InputEvent::ReachReady { unit, reach });
                }
                Command::RequestPath { unit, goal } => {
                    let pos = world.unit(unit).unwrap().position;
                    let path = find_path(world.grid(), pos, goal, &world.mover(unit).unwrap());
                    follow_ups.push(InputEvent::PathReady { unit, goal, path });
                }
                Command::CompleteStep { unit, path, step } => {
                    world.apply_step(unit, &path, step).unwrap();
                    steps_applied += 1;
                }
                _ => {}
            }
        }
        let next = match follow_ups.pop() {
            Some(event) => event,
            None => match script.pop() {
                Some(event) => event,
                None => break,
            },
        };
        pending = handler.handle(&world, next);
        pending.extend(follow_ups.into_iter().flat_map(|e| handler.handle(&world, e)));
    }

    assert_eq!(steps_applied, 2);
    assert_eq!(world.unit(jeep).unwrap().position, goal);
    assert!(matches!(handler.state(), InteractionState::Selected { reach: Some(_), .. }));
}

// ============================================================================
// TERRAIN
// ============================================================================

#[test]
fn test_terrain_follows_world_edits() {
    let config = GameConfig::default();
    let mut world = World::new(scenario_grid());
    let settings = HeightmapSettings::centered(65, 12.0);
    let mut engine = TerrainEngine::new(config.terrain.clone(), settings);
    engine.rebuild(world.grid(), &RebuildRegion::All);

    // Sample nearest the origin
    let center = 32;
    let before = engine.height_at(center, center).unwrap();

    world.set_terrain(Hex::ORIGIN, TerrainType::ShallowWater).unwrap();
    let region = world.take_terrain_changes().unwrap();
    let patch = engine.rebuild(world.grid(), &region);
    assert!(patch.rect.len() < 65 * 65);

    let after = engine.height_at(center, center).unwrap();
    assert!(after < before);
    assert!(engine.alpha_at(center, center).unwrap()[LAYER_SEDIMENT] > 0.99);

    let mut fresh = TerrainEngine::new(config.terrain, settings);
    fresh.rebuild(world.grid(), &RebuildRegion::All);
    assert_eq!(fresh.heights(), engine.heights());
}

#[test]
fn test_mountain_relief_depends_on_seed() {
    let mut grid = TileGrid::new(2, TerrainType::Mountains);
    grid.take_dirty();
    let settings = HeightmapSettings::centered(33, 4.0);
    let mut a = TerrainEngine::new(TerrainConfig::default().with_noise_seed(1), settings);
    let mut b = TerrainEngine::new(TerrainConfig::default().with_noise_seed(2), settings);
    a.rebuild(&grid, &RebuildRegion::All);
    b.rebuild(&grid, &RebuildRegion::All);
    assert_ne!(a.heights(), b.heights());
    for h in a.heights() {
        assert!((0.0..=1.0).contains(h));
    }
}

// ============================================================================
// OVERLAYS
// ============================================================================

#[test]
fn test_overlays_for_reach_and_path() {
    let world = World::new(scenario_grid());
    let def = definition("jeep", MovementScheme::wheeled());
    let mover = hexstrat_core::Mover::new(def, Default::default(), 0.6);
    let reach = find_reachable(world.grid(), Hex::ORIGIN, &mover).unwrap();
    let style = GameConfig::default().overlay;

    let outline = style.outline(&reach.landable);
    let fill = style.fill(&reach.landable);
    assert!(!outline.is_empty());
    assert_eq!(fill.vertex_count(), reach.landable.len() * 7);

    let path = find_path(world.grid(), Hex::ORIGIN, Hex::new(1, 1), &mover).unwrap();
    let arrow = mesh::arrow(path.cells(), &style.arrow);
    assert!(!arrow.is_empty());
    for n in arrow.triangle_normals() {
        assert!(n.y > 0.99);
    }
}
