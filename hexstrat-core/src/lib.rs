//! HEXSTRAT Core - Hex-grid strategy simulation
//!
//! This crate provides the simulation core of HEXSTRAT:
//! - Hex coordinates (axial/cubic, world mapping, lines, rings)
//! - Overlay mesh generation (outline, fill, arrow, grid, brim)
//! - Terrain tiles and per-unit movement schemes
//! - Dijkstra pathfinding and move-range search with cancellation
//! - Terrain blending into a heightmap and splat alphamap
//! - World context and the interaction state machine

pub mod hex;
pub mod math;
pub mod error;
pub mod tile;
pub mod unit;
pub mod movement;
pub mod navigation;
pub mod mesh;
pub mod terrain;
pub mod world;
pub mod interaction;
pub mod config;

// Re-exports for convenient access
pub use hex::{Hex, Cube, FracCube, Direction, DIRECTIONS, CIRCUMRADIUS, CELL_HEIGHT, vancouver_area, radius_from_area};
pub use error::{MapError, WorldError, MovementError};
pub use tile::{TerrainType, Tile, TileGrid, MapData, TileRecord};
pub use unit::{Unit, UnitDefinition, UnitId};
pub use movement::{MapLayer, MovementScheme, MoveQuery, Mover};
pub use navigation::{find_path, find_path_cancellable, find_reachable, find_reachable_cancellable, CancelToken, Path, ReachableSet, StepPose};
pub use mesh::{MeshData, ArrowStyle};
pub use terrain::{TerrainConfig, HeightmapSettings, TerrainEngine, TerrainPatch, RebuildRegion, TerrainSample};
pub use world::World;
pub use interaction::{InteractionHandler, InteractionState, InputEvent, Command};
pub use config::{GameConfig, OverlayStyle};
