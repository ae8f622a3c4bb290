//! Game configuration document

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::mesh::{self, ArrowStyle, MeshData};
use crate::movement::MovementScheme;
use crate::terrain::{HeightmapSettings, TerrainConfig};
use crate::unit::UnitDefinition;

/// Overlay mesh parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Grid line inset as a fraction of the circumradius
    pub grid_thickness: f32,
    pub arrow: ArrowStyle,
    pub brim_radius: f32,
    pub outline_thickness: f32,
    pub outline_dilate: f32,
    pub fill_dilate: f32,
    pub fill_contiguous: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            grid_thickness: 0.35,
            arrow: ArrowStyle::default(),
            brim_radius: 36.0,
            outline_thickness: 0.1,
            outline_dilate: 0.0,
            fill_dilate: -0.05,
            fill_contiguous: true,
        }
    }
}

impl OverlayStyle {
    pub fn grid(&self, radius: u32) -> MeshData {
        mesh::grid(radius, self.grid_thickness)
    }

    pub fn brim(&self, radius: u32) -> MeshData {
        mesh::brim(radius, self.brim_radius)
    }

    pub fn outline(&self, cells: &[Hex]) -> MeshData {
        mesh::outline(cells, self.outline_thickness, self.outline_dilate)
    }

    pub fn fill(&self, cells: &[Hex]) -> MeshData {
        mesh::fill(cells, self.fill_dilate, self.fill_contiguous)
    }

    pub fn arrow(&self, path: &[Hex]) -> MeshData {
        mesh::arrow(path, &self.arrow)
    }
}

/// Everything a session needs besides the map itself
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_radius: u32,
    pub terrain: TerrainConfig,
    pub heightmap: HeightmapSettings,
    pub overlay: OverlayStyle,
    pub units: Vec<UnitDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_radius: 12,
            terrain: TerrainConfig::default(),
            heightmap: HeightmapSettings::default(),
            overlay: OverlayStyle::default(),
            units: vec![
                UnitDefinition::new("wheeled", MovementScheme::wheeled()),
                UnitDefinition::new("tracked", MovementScheme::tracked()),
                UnitDefinition::new("naval", MovementScheme::naval()),
                UnitDefinition::new("amphibious", MovementScheme::amphibious()),
                UnitDefinition::new("aircraft", MovementScheme::aircraft()),
            ],
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Unit definition by name
    pub fn unit(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.iter().find(|u| u.name == name)
    }
}
