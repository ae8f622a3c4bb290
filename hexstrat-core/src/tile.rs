//! Tiles and the bounded hexagonal tile grid

use std::path::Path;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MapError;
use crate::hex::{radius_from_area, vancouver_area, Hex};
use crate::unit::UnitId;

// ============================================================================
// TERRAIN
// ============================================================================

/// Terrain assigned to a tile, ordered from deepest to highest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    OceanFloor,
    ShallowWater,
    Beach,
    OpenGround,
    Mountains,
}

impl TerrainType {
    pub const COUNT: usize = 5;

    pub const ALL: [TerrainType; Self::COUNT] = [
        TerrainType::OceanFloor,
        TerrainType::ShallowWater,
        TerrainType::Beach,
        TerrainType::OpenGround,
        TerrainType::Mountains,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<TerrainType> {
        Self::ALL.get(index).copied()
    }

    pub fn is_water(self) -> bool {
        matches!(self, TerrainType::OceanFloor | TerrainType::ShallowWater)
    }
}

// ============================================================================
// TILES
// ============================================================================

/// A single map cell. The occupant is a non-owning back-reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    hex: Hex,
    pub terrain: TerrainType,
    pub occupant: Option<UnitId>,
}

impl Tile {
    pub fn new(hex: Hex, terrain: TerrainType) -> Self {
        Self {
            hex,
            terrain,
            occupant: None,
        }
    }

    /// Position, fixed at creation
    pub fn hex(&self) -> Hex {
        self.hex
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Every tile within `radius` of the origin, exactly once.
///
/// Tiles are stored in Vancouver-square order; a tile's position in that
/// order is its index, which searches use to break ties.
#[derive(Clone, Debug)]
pub struct TileGrid {
    radius: u32,
    tiles: Vec<Tile>,
    index: FxHashMap<Hex, usize>,
    dirty: Vec<Hex>,
}

impl TileGrid {
    /// Uniform map of a single terrain type
    pub fn new(radius: u32, terrain: TerrainType) -> Self {
        let cells = Hex::vancouver_square(Hex::ORIGIN, radius);
        Self::from_tiles(radius, cells.into_iter().map(|h| Tile::new(h, terrain)).collect())
    }

    /// Random map that rises from ocean at the rim to mountains in the middle.
    ///
    /// Roughly one tile in five is jittered one step lower. Not deterministic
    /// unless `rng` is seeded.
    pub fn generate<R: Rng>(radius: u32, rng: &mut R) -> Self {
        let top = (TerrainType::COUNT - 1) as i32;
        let tiles = Hex::vancouver_square(Hex::ORIGIN, radius)
            .into_iter()
            .map(|hex| {
                let jitter = if rng.gen::<f32>() < 0.2 {
                    rng.gen_range(-1..=0)
                } else {
                    0
                };
                let level = (top - hex.length() / 3 + jitter).clamp(0, top);
                let terrain = TerrainType::from_index(level as usize).unwrap_or(TerrainType::OceanFloor);
                Tile::new(hex, terrain)
            })
            .collect();
        let grid = Self::from_tiles(radius, tiles);
        info!(radius, tiles = grid.len(), "generated random map");
        grid
    }

    fn from_tiles(radius: u32, tiles: Vec<Tile>) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.hex, i))
            .collect();
        Self {
            radius,
            tiles,
            index,
            dirty: Vec::new(),
        }
    }

    /// Builds a grid from a flat tile list, recovering the radius from its length.
    pub fn from_map_data(data: &MapData) -> Result<Self, MapError> {
        let radius = radius_from_area(data.tiles.len())
            .ok_or(MapError::InvalidTileCount(data.tiles.len()))?;

        let mut terrain: FxHashMap<Hex, TerrainType> = FxHashMap::default();
        for record in &data.tiles {
            let cell = Hex::new(record.q, record.r);
            if cell.length() > radius as i32 {
                return Err(MapError::CellOutOfRange { cell, radius });
            }
            if terrain.insert(cell, record.terrain).is_some() {
                return Err(MapError::DuplicateCell(cell));
            }
        }

        // Length matches the area and every cell is in range and unique,
        // so every cell of the square is present.
        let tiles = Hex::vancouver_square(Hex::ORIGIN, radius)
            .into_iter()
            .map(|h| Tile::new(h, terrain.get(&h).copied().unwrap_or(TerrainType::OceanFloor)))
            .collect();
        debug!(radius, "loaded map data");
        Ok(Self::from_tiles(radius, tiles))
    }

    pub fn to_map_data(&self) -> MapData {
        MapData {
            tiles: self
                .tiles
                .iter()
                .map(|t| TileRecord {
                    q: t.hex.q,
                    r: t.hex.r,
                    terrain: t.terrain,
                })
                .collect(),
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.index.contains_key(&hex)
    }

    pub fn index_of(&self, hex: Hex) -> Option<usize> {
        self.index.get(&hex).copied()
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.index_of(hex).map(|i| &self.tiles[i])
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn terrain_at(&self, hex: Hex) -> Option<TerrainType> {
        self.get(hex).map(|t| t.terrain)
    }

    /// Indices of the existing neighbors of the tile at `index`
    pub fn neighbor_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let hex = self.tiles[index].hex;
        hex.neighbors()
            .into_iter()
            .filter_map(move |n| self.index_of(n))
    }

    /// Changes a tile's terrain, returning the previous type.
    /// The cell is queued for a terrain rebuild when the type actually changes.
    pub fn set_terrain(&mut self, hex: Hex, terrain: TerrainType) -> Option<TerrainType> {
        let i = self.index_of(hex)?;
        let previous = std::mem::replace(&mut self.tiles[i].terrain, terrain);
        if previous != terrain && !self.dirty.contains(&hex) {
            self.dirty.push(hex);
        }
        Some(previous)
    }

    /// Sets or clears the occupant. Returns false if there is no tile at `hex`.
    pub fn set_occupant(&mut self, hex: Hex, occupant: Option<UnitId>) -> bool {
        match self.index_of(hex) {
            Some(i) => {
                self.tiles[i].occupant = occupant;
                true
            }
            None => false,
        }
    }

    /// Cells with terrain edits not yet drained
    pub fn dirty(&self) -> &[Hex] {
        &self.dirty
    }

    /// Cells whose terrain changed since the last call
    pub fn take_dirty(&mut self) -> Vec<Hex> {
        std::mem::take(&mut self.dirty)
    }
}

// ============================================================================
// MAP DOCUMENTS
// ============================================================================

/// One `(position, terrain)` entry of a map document
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub q: i32,
    pub r: i32,
    pub terrain: TerrainType,
}

/// Flat tile list covering a hexagonal map
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub tiles: Vec<TileRecord>,
}

impl MapData {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data: MapData = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Expected tile count for a map of `radius`
    pub fn expected_len(radius: u32) -> usize {
        vancouver_area(radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_contains_every_cell_once() {
        let grid = TileGrid::new(4, TerrainType::OpenGround);
        assert_eq!(grid.len(), vancouver_area(4));
        for cell in Hex::vancouver_square(Hex::ORIGIN, 4) {
            let i = grid.index_of(cell).unwrap();
            assert_eq!(grid.tiles()[i].hex(), cell);
        }
        assert!(grid.get(Hex::new(5, 0)).is_none());
        assert!(grid.get(Hex::new(3, 2)).is_none());
    }

    #[test]
    fn test_neighbor_indices_at_rim() {
        let grid = TileGrid::new(1, TerrainType::OpenGround);
        let center = grid.index_of(Hex::ORIGIN).unwrap();
        assert_eq!(grid.neighbor_indices(center).count(), 6);
        let rim = grid.index_of(Hex::new(1, 0)).unwrap();
        // Center plus two ring neighbors
        assert_eq!(grid.neighbor_indices(rim).count(), 3);
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = TileGrid::generate(6, &mut ChaCha8Rng::seed_from_u64(7));
        let b = TileGrid::generate(6, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a.to_map_data(), b.to_map_data());
    }

    #[test]
    fn test_generate_gradient() {
        let grid = TileGrid::generate(14, &mut ChaCha8Rng::seed_from_u64(1));
        // Jitter only ever lowers terrain, and the rim is deep enough to clamp.
        for tile in grid.tiles() {
            let level = 4 - tile.hex().length() / 3;
            let idx = tile.terrain.index() as i32;
            assert!(idx <= level.max(0));
            assert!(idx >= (level - 1).max(0));
        }
        assert_eq!(grid.terrain_at(Hex::new(14, 0)), Some(TerrainType::OceanFloor));
    }

    #[test]
    fn test_map_data_round_trip() {
        let grid = TileGrid::generate(3, &mut ChaCha8Rng::seed_from_u64(42));
        let data = grid.to_map_data();
        let json = serde_json::to_string(&data).unwrap();
        let parsed: MapData = serde_json::from_str(&json).unwrap();
        let loaded = TileGrid::from_map_data(&parsed).unwrap();
        assert_eq!(loaded.radius(), 3);
        assert_eq!(loaded.to_map_data(), data);
    }

    #[test]
    fn test_map_data_rejects_bad_length() {
        let mut data = TileGrid::new(3, TerrainType::Beach).to_map_data();
        data.tiles.push(TileRecord {
            q: 9,
            r: 9,
            terrain: TerrainType::Beach,
        });
        assert_eq!(
            TileGrid::from_map_data(&data).unwrap_err(),
            MapError::InvalidTileCount(vancouver_area(3) + 1)
        );
    }

    #[test]
    fn test_map_data_rejects_duplicates_and_range() {
        let mut data = TileGrid::new(1, TerrainType::Beach).to_map_data();
        data.tiles[6] = data.tiles[0];
        let dup = Hex::new(data.tiles[0].q, data.tiles[0].r);
        assert_eq!(TileGrid::from_map_data(&data).unwrap_err(), MapError::DuplicateCell(dup));

        let mut data = TileGrid::new(1, TerrainType::Beach).to_map_data();
        data.tiles[6].q = 2;
        data.tiles[6].r = 0;
        assert_eq!(
            TileGrid::from_map_data(&data).unwrap_err(),
            MapError::CellOutOfRange {
                cell: Hex::new(2, 0),
                radius: 1
            }
        );
    }

    #[test]
    fn test_set_terrain_tracks_dirty_cells() {
        let mut grid = TileGrid::new(2, TerrainType::OpenGround);
        assert_eq!(
            grid.set_terrain(Hex::new(1, 0), TerrainType::Mountains),
            Some(TerrainType::OpenGround)
        );
        // No change, not queued
        grid.set_terrain(Hex::new(0, 1), TerrainType::OpenGround);
        grid.set_terrain(Hex::new(1, 0), TerrainType::Beach);
        assert_eq!(grid.set_terrain(Hex::new(7, 0), TerrainType::Beach), None);
        assert_eq!(grid.take_dirty(), vec![Hex::new(1, 0)]);
        assert!(grid.take_dirty().is_empty());
    }

    #[test]
    fn test_terrain_index_round_trip() {
        for t in TerrainType::ALL {
            assert_eq!(TerrainType::from_index(t.index()), Some(t));
        }
        assert_eq!(TerrainType::from_index(TerrainType::COUNT), None);
    }
}
