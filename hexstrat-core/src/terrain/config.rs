//! Terrain tuning and heightmap layout

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::inverse_lerp;
use crate::movement::MapLayer;
use crate::tile::TerrainType;

/// Elevation and blending constants. Open ground sits at height 0, mountains
/// reach `mountain_height`, the ocean floor is the lowest point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub mountain_height: f32,
    pub snowcap_height: f32,
    /// Elevation band over which snow fades in below `snowcap_height`
    pub snowcap_blend: f32,

    pub beach_depth: f32,
    pub shallows_depth: f32,
    pub ocean_floor: f32,

    /// Height of the bulge at the center of a mountain tile
    pub mountain_peak_height: f32,
    /// Distance from the center over which the bulge falls to zero
    pub mountain_rolloff: f32,
    pub mountain_noise_rate: f32,
    pub noise_seed: u32,

    /// Distance from a shared edge within which a neighbor has influence
    pub influence_range: f32,
    /// Alpha weight multiplier for shallow-water neighbors
    pub shallows_alpha_bias: f32,

    /// Resting height of surface units on mountains
    pub mountain_unit_height: f32,
    pub low_altitude: f32,
    pub high_altitude: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mountain_height: 0.8,
            snowcap_height: 0.7,
            snowcap_blend: 0.2,
            beach_depth: -0.1,
            shallows_depth: -0.4,
            ocean_floor: -1.0,
            mountain_peak_height: 0.4,
            mountain_rolloff: 0.5,
            mountain_noise_rate: 5.0,
            noise_seed: 0,
            influence_range: 0.2,
            shallows_alpha_bias: 5.0,
            mountain_unit_height: 0.2,
            low_altitude: 1.0,
            high_altitude: 1.0,
        }
    }
}

impl TerrainConfig {
    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = seed;
        self
    }

    pub fn with_influence_range(mut self, range: f32) -> Self {
        self.influence_range = range;
        self
    }

    pub fn with_mountain_height(mut self, height: f32) -> Self {
        self.mountain_height = height;
        self
    }

    /// World height mapped to [0, 1] between the ocean floor and the mountain maximum
    pub fn normalize_height(&self, height: f32) -> f32 {
        inverse_lerp(self.ocean_floor, self.mountain_height, height)
    }

    /// Flat elevation of a terrain type, ignoring mountain relief
    pub fn base_height(&self, terrain: TerrainType) -> f32 {
        match terrain {
            TerrainType::OceanFloor => self.ocean_floor,
            TerrainType::ShallowWater => self.shallows_depth,
            TerrainType::Beach => self.beach_depth,
            TerrainType::OpenGround | TerrainType::Mountains => 0.0,
        }
    }

    /// Height a unit on `layer` rests at over `terrain`
    pub fn unit_height(&self, layer: MapLayer, terrain: TerrainType) -> f32 {
        match layer {
            MapLayer::Surface if terrain == TerrainType::Mountains => self.mountain_unit_height,
            MapLayer::Surface => 0.0,
            MapLayer::Subnautical => self.base_height(terrain),
            MapLayer::LowAltitude => self.low_altitude,
            MapLayer::HighAltitude => self.high_altitude,
        }
    }
}

/// Square sample lattice the heightmap and alphamap are rasterized on
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapSettings {
    /// Samples per side
    pub resolution: usize,
    /// World units per side
    pub world_size: f32,
    /// World position `(x, z)` of sample (0, 0)
    pub origin: Vec2,
}

impl Default for HeightmapSettings {
    fn default() -> Self {
        Self::centered(257, 50.0)
    }
}

impl HeightmapSettings {
    /// Lattice of `world_size` centered on the map origin
    pub fn centered(resolution: usize, world_size: f32) -> Self {
        Self {
            resolution: resolution.max(2),
            world_size,
            origin: Vec2::splat(-world_size / 2.0),
        }
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(2);
        self
    }

    /// World distance between adjacent samples
    pub fn spacing(&self) -> f32 {
        self.world_size / (self.resolution.max(2) - 1) as f32
    }

    /// World position `(x, z)` of sample `(col, row)`
    pub fn sample_position(&self, col: usize, row: usize) -> Vec2 {
        self.origin + Vec2::new(col as f32, row as f32) * self.spacing()
    }

    /// Half-open column and row ranges covering a world-space box, clamped to the lattice
    pub fn sample_range(&self, min: Vec2, max: Vec2) -> SampleRect {
        let spacing = self.spacing();
        let lo = ((min - self.origin) / spacing).floor();
        let hi = ((max - self.origin) / spacing).ceil() + Vec2::ONE;
        let clamp = |v: f32| (v.max(0.0) as usize).min(self.resolution);
        let (x0, y0) = (clamp(lo.x), clamp(lo.y));
        let (x1, y1) = (clamp(hi.x).max(x0), clamp(hi.y).max(y0));
        SampleRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    pub fn full_range(&self) -> SampleRect {
        SampleRect {
            x: 0,
            y: 0,
            width: self.resolution,
            height: self.resolution,
        }
    }
}

/// Sub-rectangle of the sample lattice, in samples
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl SampleRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }
}
