//! Movement schemes: which terrain a unit type can cross, and at what cost
//!
//! Costs are fractions of a unit's full move power, in (0, 1]. A terrain
//! type missing from a scheme is impassable for it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MovementError;
use crate::tile::TerrainType;
use crate::unit::UnitDefinition;

// ============================================================================
// SCHEMES
// ============================================================================

/// Per-terrain traversal cost table for one kind of unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemeData", into = "SchemeData")]
pub struct MovementScheme {
    name: String,
    costs: [Option<f32>; TerrainType::COUNT],
}

/// Serialized form: a named list of terrain costs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemeData {
    pub name: String,
    pub costs: Vec<TerrainCost>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TerrainCost {
    pub terrain: TerrainType,
    pub cost: f32,
}

impl MovementScheme {
    /// Scheme that cannot enter anything until costs are added
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            costs: [None; TerrainType::COUNT],
        }
    }

    /// Builder: allow `terrain` at `cost`
    pub fn with_cost(mut self, terrain: TerrainType, cost: f32) -> Result<Self, MovementError> {
        if !(cost > 0.0 && cost <= 1.0) {
            return Err(MovementError::CostOutOfRange { terrain, cost });
        }
        self.costs[terrain.index()] = Some(cost);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_enter(&self, terrain: TerrainType) -> bool {
        self.costs[terrain.index()].is_some()
    }

    /// Cost to cross `terrain`, `None` if impassable
    pub fn cost(&self, terrain: TerrainType) -> Option<f32> {
        self.costs[terrain.index()]
    }

    fn preset(name: &str, costs: &[(TerrainType, f32)]) -> Self {
        let mut scheme = Self::new(name);
        for &(terrain, cost) in costs {
            scheme.costs[terrain.index()] = Some(cost);
        }
        scheme
    }

    /// Roads and fields only
    pub fn wheeled() -> Self {
        Self::preset(
            "wheeled",
            &[(TerrainType::OpenGround, 0.2), (TerrainType::Beach, 0.34)],
        )
    }

    /// Slow but handles mountains
    pub fn tracked() -> Self {
        Self::preset(
            "tracked",
            &[
                (TerrainType::Beach, 0.25),
                (TerrainType::OpenGround, 0.25),
                (TerrainType::Mountains, 0.5),
            ],
        )
    }

    pub fn naval() -> Self {
        Self::preset(
            "naval",
            &[(TerrainType::OceanFloor, 0.2), (TerrainType::ShallowWater, 0.34)],
        )
    }

    pub fn amphibious() -> Self {
        Self::preset(
            "amphibious",
            &[
                (TerrainType::ShallowWater, 0.34),
                (TerrainType::Beach, 0.25),
                (TerrainType::OpenGround, 0.34),
            ],
        )
    }

    /// Crosses everything at the same cost
    pub fn aircraft() -> Self {
        let all: Vec<(TerrainType, f32)> = TerrainType::ALL.iter().map(|&t| (t, 0.2)).collect();
        Self::preset("aircraft", &all)
    }
}

impl TryFrom<SchemeData> for MovementScheme {
    type Error = MovementError;

    fn try_from(data: SchemeData) -> Result<Self, Self::Error> {
        let mut scheme = MovementScheme::new(data.name);
        for entry in data.costs {
            if scheme.can_enter(entry.terrain) {
                return Err(MovementError::DuplicateTerrain(entry.terrain));
            }
            scheme = scheme.with_cost(entry.terrain, entry.cost)?;
        }
        Ok(scheme)
    }
}

impl From<MovementScheme> for SchemeData {
    fn from(scheme: MovementScheme) -> Self {
        let costs = TerrainType::ALL
            .iter()
            .filter_map(|&terrain| scheme.cost(terrain).map(|cost| TerrainCost { terrain, cost }))
            .collect();
        SchemeData {
            name: scheme.name,
            costs,
        }
    }
}

// ============================================================================
// MAP LAYERS
// ============================================================================

/// Vertical layer a unit moves in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapLayer {
    #[default]
    Surface,
    Subnautical,
    LowAltitude,
    HighAltitude,
}

impl MapLayer {
    /// Layer-level restriction applied on top of a unit's scheme
    pub fn permits(self, terrain: TerrainType) -> bool {
        match self {
            MapLayer::Surface | MapLayer::HighAltitude => true,
            MapLayer::Subnautical => terrain.is_water(),
            MapLayer::LowAltitude => terrain != TerrainType::Mountains,
        }
    }
}

// ============================================================================
// MOVER
// ============================================================================

/// Answer to "can this unit enter this terrain, and for how much?"
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveQuery {
    pub can_enter: bool,
    /// Zero when `can_enter` is false
    pub cost: f32,
}

/// Snapshot of the movement-relevant state of a unit, handed to searches
#[derive(Clone, Debug)]
pub struct Mover {
    pub definition: Arc<UnitDefinition>,
    pub layer: MapLayer,
    pub move_power: f32,
}

impl Mover {
    pub fn new(definition: Arc<UnitDefinition>, layer: MapLayer, move_power: f32) -> Self {
        Self {
            definition,
            layer,
            move_power,
        }
    }

    /// Builder: override remaining move power
    pub fn with_move_power(mut self, move_power: f32) -> Self {
        self.move_power = move_power;
        self
    }

    /// Combined scheme and layer cost; `None` when impassable
    pub fn cost(&self, terrain: TerrainType) -> Option<f32> {
        if !self.layer.permits(terrain) {
            return None;
        }
        self.definition.scheme.cost(terrain)
    }

    pub fn can_enter(&self, terrain: TerrainType) -> bool {
        self.cost(terrain).is_some()
    }

    pub fn query(&self, terrain: TerrainType) -> MoveQuery {
        match self.cost(terrain) {
            Some(cost) => MoveQuery {
                can_enter: true,
                cost,
            },
            None => MoveQuery {
                can_enter: false,
                cost: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_cost_validates_range() {
        let scheme = MovementScheme::new("test")
            .with_cost(TerrainType::OpenGround, 1.0)
            .unwrap();
        assert_eq!(scheme.cost(TerrainType::OpenGround), Some(1.0));
        assert!(!scheme.can_enter(TerrainType::Mountains));

        for bad in [0.0, -0.5, 1.5, f32::NAN] {
            assert!(MovementScheme::new("bad")
                .with_cost(TerrainType::Beach, bad)
                .is_err());
        }
    }

    #[test]
    fn test_presets() {
        let wheeled = MovementScheme::wheeled();
        assert!(wheeled.can_enter(TerrainType::OpenGround));
        assert!(!wheeled.can_enter(TerrainType::ShallowWater));

        let naval = MovementScheme::naval();
        assert!(naval.can_enter(TerrainType::OceanFloor));
        assert!(!naval.can_enter(TerrainType::Beach));

        let aircraft = MovementScheme::aircraft();
        assert!(TerrainType::ALL.iter().all(|&t| aircraft.can_enter(t)));
    }

    #[test]
    fn test_scheme_json_round_trip() {
        let scheme = MovementScheme::tracked();
        let json = serde_json::to_string(&scheme).unwrap();
        let parsed: MovementScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scheme);
    }

    #[test]
    fn test_scheme_json_rejects_bad_cost() {
        let json = r#"{"name":"x","costs":[{"terrain":"beach","cost":2.0}]}"#;
        assert!(serde_json::from_str::<MovementScheme>(json).is_err());
        let json = r#"{"name":"x","costs":[{"terrain":"beach","cost":0.5},{"terrain":"beach","cost":0.5}]}"#;
        assert!(serde_json::from_str::<MovementScheme>(json).is_err());
    }

    #[test]
    fn test_layer_permits() {
        assert!(MapLayer::Subnautical.permits(TerrainType::OceanFloor));
        assert!(!MapLayer::Subnautical.permits(TerrainType::Beach));
        assert!(!MapLayer::LowAltitude.permits(TerrainType::Mountains));
        assert!(MapLayer::HighAltitude.permits(TerrainType::Mountains));
    }

    #[test]
    fn test_mover_query_combines_layer() {
        let def = Arc::new(UnitDefinition::new("drone", MovementScheme::aircraft()));
        let low = Mover::new(def.clone(), MapLayer::LowAltitude, 1.0);
        assert_eq!(
            low.query(TerrainType::Mountains),
            MoveQuery {
                can_enter: false,
                cost: 0.0
            }
        );
        let high = Mover::new(def, MapLayer::HighAltitude, 1.0);
        assert_eq!(
            high.query(TerrainType::Mountains),
            MoveQuery {
                can_enter: true,
                cost: 0.2
            }
        );
    }
}
