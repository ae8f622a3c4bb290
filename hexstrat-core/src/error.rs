//! Error types for map loading, unit placement and movement definitions

use crate::hex::Hex;
use crate::tile::TerrainType;
use crate::unit::UnitId;

/// Rejected map documents
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MapError {
    #[error("tile count {0} is not the area of any hexagonal map")]
    InvalidTileCount(usize),

    #[error("cell {cell:?} lies outside a map of radius {radius}")]
    CellOutOfRange { cell: Hex, radius: u32 },

    #[error("cell {0:?} appears more than once")]
    DuplicateCell(Hex),
}

/// Rejected world mutations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WorldError {
    #[error("no tile at {0:?}")]
    UnknownCell(Hex),

    #[error("tile {0:?} is already occupied")]
    CellOccupied(Hex),

    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),

    #[error("unit {unit:?} is not standing at the start of the step ({expected:?})")]
    StepMismatch { unit: UnitId, expected: Hex },

    #[error("step {step} is out of range for a path of {len} cells")]
    StepOutOfRange { step: usize, len: usize },
}

/// Rejected movement scheme definitions
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MovementError {
    #[error("cost {cost} for {terrain:?} must be in (0, 1]")]
    CostOutOfRange { terrain: TerrainType, cost: f32 },

    #[error("terrain {0:?} listed more than once")]
    DuplicateTerrain(TerrainType),
}
