//! World context: the tile grid plus the units standing on it
//!
//! The grid lives behind an `Arc` so background searches can hold a frozen
//! snapshot while the world keeps changing; mutations copy on write.

use std::sync::Arc;

use glam::Vec3;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::error::WorldError;
use crate::hex::Hex;
use crate::movement::Mover;
use crate::navigation::Path;
use crate::terrain::{RebuildRegion, TerrainConfig};
use crate::tile::{TerrainType, TileGrid};
use crate::unit::{Unit, UnitDefinition, UnitId};

pub struct World {
    grid: Arc<TileGrid>,
    units: FxHashMap<UnitId, Unit>,
    next_id: u32,
}

impl World {
    pub fn new(grid: TileGrid) -> Self {
        Self {
            grid: Arc::new(grid),
            units: FxHashMap::default(),
            next_id: 0,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Read-only grid for a background search. Later edits do not affect it.
    pub fn snapshot(&self) -> Arc<TileGrid> {
        Arc::clone(&self.grid)
    }

    // ========================================================================
    // UNITS
    // ========================================================================

    /// Places a new unit on an empty tile
    pub fn spawn_unit(&mut self, definition: Arc<UnitDefinition>, at: Hex) -> Result<UnitId, WorldError> {
        let tile = self.grid.get(at).ok_or(WorldError::UnknownCell(at))?;
        if tile.is_occupied() {
            return Err(WorldError::CellOccupied(at));
        }
        let id = UnitId(self.next_id);
        self.next_id += 1;
        Arc::make_mut(&mut self.grid).set_occupant(at, Some(id));
        debug!(?id, name = %definition.name, ?at, "unit spawned");
        self.units.insert(id, Unit::new(id, definition, at));
        Ok(id)
    }

    /// Removes a unit and frees its tile
    pub fn despawn_unit(&mut self, id: UnitId) -> Result<Unit, WorldError> {
        let unit = self.units.remove(&id).ok_or(WorldError::UnknownUnit(id))?;
        Arc::make_mut(&mut self.grid).set_occupant(unit.position, None);
        Ok(unit)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_at(&self, hex: Hex) -> Option<&Unit> {
        self.grid.get(hex)?.occupant.and_then(|id| self.units.get(&id))
    }

    /// All units, ordered by id
    pub fn units(&self) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.units.values().collect();
        units.sort_by_key(|u| u.id);
        units
    }

    pub fn mover(&self, id: UnitId) -> Result<Mover, WorldError> {
        self.units
            .get(&id)
            .map(Unit::mover)
            .ok_or(WorldError::UnknownUnit(id))
    }

    /// True if the unit stands on terrain it could not enter
    pub fn is_stranded(&self, id: UnitId) -> Result<bool, WorldError> {
        let unit = self.units.get(&id).ok_or(WorldError::UnknownUnit(id))?;
        let terrain = self
            .grid
            .terrain_at(unit.position)
            .ok_or(WorldError::UnknownCell(unit.position))?;
        Ok(!unit.mover().can_enter(terrain))
    }

    /// Moves a unit along one step of `path`, paying that step's cost.
    /// Returns the unit's new position.
    pub fn apply_step(&mut self, id: UnitId, path: &Path, step: usize) -> Result<Hex, WorldError> {
        let cost = path.step_cost(step).ok_or(WorldError::StepOutOfRange {
            step,
            len: path.len(),
        })?;
        let from = path.cells()[step];
        let to = path.cells()[step + 1];

        let unit = self.units.get(&id).ok_or(WorldError::UnknownUnit(id))?;
        if unit.position != from {
            return Err(WorldError::StepMismatch { unit: id, expected: from });
        }
        let target = self.grid.get(to).ok_or(WorldError::UnknownCell(to))?;
        if target.occupant.is_some_and(|o| o != id) {
            return Err(WorldError::CellOccupied(to));
        }

        let grid = Arc::make_mut(&mut self.grid);
        grid.set_occupant(from, None);
        grid.set_occupant(to, Some(id));
        if let Some(unit) = self.units.get_mut(&id) {
            unit.position = to;
            unit.move_power = (unit.move_power - cost).max(0.0);
            debug!(?id, ?from, ?to, cost, remaining = unit.move_power, "step applied");
        }
        Ok(to)
    }

    /// Restores every unit's move power for a new turn
    pub fn refresh_units(&mut self) {
        for unit in self.units.values_mut() {
            unit.refresh();
        }
        info!(units = self.units.len(), "turn started");
    }

    /// World-space resting position of a unit, lifted by its layer
    pub fn unit_world_position(&self, id: UnitId, config: &TerrainConfig) -> Result<Vec3, WorldError> {
        let unit = self.units.get(&id).ok_or(WorldError::UnknownUnit(id))?;
        let terrain = self
            .grid
            .terrain_at(unit.position)
            .ok_or(WorldError::UnknownCell(unit.position))?;
        Ok(unit.position.to_world() + Vec3::Y * config.unit_height(unit.layer, terrain))
    }

    // ========================================================================
    // TERRAIN EDITS
    // ========================================================================

    /// Changes a tile's terrain, returning the previous type
    pub fn set_terrain(&mut self, hex: Hex, terrain: TerrainType) -> Result<TerrainType, WorldError> {
        if !self.grid.contains(hex) {
            return Err(WorldError::UnknownCell(hex));
        }
        Arc::make_mut(&mut self.grid)
            .set_terrain(hex, terrain)
            .ok_or(WorldError::UnknownCell(hex))
    }

    /// Drains pending terrain edits into a rebuild region, if there are any
    pub fn take_terrain_changes(&mut self) -> Option<RebuildRegion> {
        if self.grid.dirty().is_empty() {
            return None;
        }
        let dirty = Arc::make_mut(&mut self.grid).take_dirty();
        match dirty.len() {
            0 => None,
            1 => Some(RebuildRegion::Tile(dirty[0])),
            _ => Some(RebuildRegion::Cells(dirty)),
        }
    }
}
