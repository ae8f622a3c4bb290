//! Unblended height and splat contribution of a single tile

use glam::Vec2;
use noise::{NoiseFn, Perlin};

use super::config::TerrainConfig;
use crate::math::{inverse_lerp, map_noise_to_range};
use crate::tile::TerrainType;

/// Number of splat layers
pub const ALPHA_LAYERS: usize = 5;

pub const LAYER_GRASS: usize = 0;
pub const LAYER_ROCK: usize = 1;
pub const LAYER_SNOW: usize = 2;
pub const LAYER_SAND: usize = 3;
pub const LAYER_SEDIMENT: usize = 4;

/// Splat weights for one sample
pub type Alpha = [f32; ALPHA_LAYERS];

/// Evaluates what a tile of a given terrain type contributes at a point.
#[derive(Clone)]
pub struct TerrainShaper {
    config: TerrainConfig,
    perlin: Perlin,
}

impl TerrainShaper {
    pub fn new(config: TerrainConfig) -> Self {
        let perlin = Perlin::new(config.noise_seed);
        Self { config, perlin }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Height a tile centered at `center` would have at `sample` on its own
    pub fn height(&self, terrain: TerrainType, center: Vec2, sample: Vec2) -> f32 {
        match terrain {
            TerrainType::Mountains => self.mountain_height(center, sample),
            other => self.config.base_height(other),
        }
    }

    /// Splat weights a tile would have at `sample` on its own. Each sums to 1.
    pub fn alpha(&self, terrain: TerrainType, center: Vec2, sample: Vec2) -> Alpha {
        let mut alpha = [0.0; ALPHA_LAYERS];
        match terrain {
            TerrainType::OpenGround => alpha[LAYER_GRASS] = 1.0,
            TerrainType::Beach => alpha[LAYER_SAND] = 1.0,
            TerrainType::ShallowWater | TerrainType::OceanFloor => alpha[LAYER_SEDIMENT] = 1.0,
            TerrainType::Mountains => {
                let c = &self.config;
                let snow = inverse_lerp(
                    c.snowcap_height - c.snowcap_blend,
                    c.snowcap_height,
                    self.mountain_height(center, sample),
                );
                alpha[LAYER_ROCK] = 1.0 - snow;
                alpha[LAYER_SNOW] = snow;
            }
        }
        alpha
    }

    /// Center bulge plus noise relief
    fn mountain_height(&self, center: Vec2, sample: Vec2) -> f32 {
        let c = &self.config;
        let peak = 1.0 - (center.distance(sample) / c.mountain_rolloff).clamp(0.0, 1.0);
        let rate = c.mountain_noise_rate as f64;
        let raw = self.perlin.get([
            (sample.x as f64 + 1000.0) * rate,
            (sample.y as f64 + 1000.0) * rate,
        ]);
        let relief = map_noise_to_range(raw, 0.0, 1.0).clamp(0.0, 1.0);
        peak * c.mountain_peak_height + (c.mountain_height - c.mountain_peak_height) * relief
    }
}
