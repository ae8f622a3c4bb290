//! Unit definitions and live unit state

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::movement::{MapLayer, MovementScheme, Mover};

/// Handle to a unit in a [`crate::World`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Static description shared by every unit of a type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub name: String,
    pub scheme: MovementScheme,
    #[serde(default)]
    pub layer: MapLayer,
    /// Move power restored at the start of each turn
    #[serde(default = "default_move_power")]
    pub move_power: f32,
}

fn default_move_power() -> f32 {
    1.0
}

impl UnitDefinition {
    pub fn new(name: impl Into<String>, scheme: MovementScheme) -> Self {
        Self {
            name: name.into(),
            scheme,
            layer: MapLayer::Surface,
            move_power: default_move_power(),
        }
    }

    pub fn with_layer(mut self, layer: MapLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_move_power(mut self, move_power: f32) -> Self {
        self.move_power = move_power;
        self
    }
}

/// A unit on the map
#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub definition: Arc<UnitDefinition>,
    pub position: Hex,
    pub layer: MapLayer,
    pub move_power: f32,
}

impl Unit {
    pub fn new(id: UnitId, definition: Arc<UnitDefinition>, position: Hex) -> Self {
        let layer = definition.layer;
        let move_power = definition.move_power;
        Self {
            id,
            definition,
            position,
            layer,
            move_power,
        }
    }

    /// Search snapshot with the unit's remaining move power
    pub fn mover(&self) -> Mover {
        Mover::new(self.definition.clone(), self.layer, self.move_power)
    }

    /// Restore full move power for a new turn
    pub fn refresh(&mut self) {
        self.move_power = self.definition.move_power;
    }
}
