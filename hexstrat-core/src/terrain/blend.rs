//! Per-sample blending of tile contributions across shared edges

use glam::Vec2;

use super::config::TerrainConfig;
use super::shaping::{Alpha, TerrainShaper, ALPHA_LAYERS};
use crate::hex::{corner_offset_2d, Direction, Hex};
use crate::math::{cosine_smoothstep, distance_to_segment, hexagon_space_distance};
use crate::tile::{TerrainType, TileGrid};

/// Blended terrain at one world point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSample {
    /// World height, not normalized
    pub height: f32,
    pub alpha: Alpha,
}

/// Samples blended height and splat weights from a tile grid.
///
/// The tile under the point contributes with weight 1. Each existing neighbor
/// contributes with a cosine falloff of the point's distance to the edge the
/// two tiles share, reaching zero at `influence_range`.
#[derive(Clone)]
pub struct TerrainBlender {
    shaper: TerrainShaper,
}

impl TerrainBlender {
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            shaper: TerrainShaper::new(config),
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        self.shaper.config()
    }

    pub fn shaper(&self) -> &TerrainShaper {
        &self.shaper
    }

    pub fn sample(&self, grid: &TileGrid, point: Vec2) -> TerrainSample {
        let config = self.shaper.config();
        let cell = Hex::from_map(point);
        let Some(terrain) = grid.terrain_at(cell) else {
            return TerrainSample {
                height: config.ocean_floor,
                alpha: [0.0; ALPHA_LAYERS],
            };
        };

        let center = cell.to_map();
        let mut height = self.shaper.height(terrain, center, point);
        let mut alpha = self.shaper.alpha(terrain, center, point);
        let mut height_weight = 1.0;
        let mut alpha_weight = 1.0;

        let range = config.influence_range.max(f32::EPSILON);
        // No edge within reach: every neighbor weight is zero
        let blends = hexagon_space_distance(point - center) < range;
        for d in Direction::ALL.into_iter().filter(|_| blends) {
            let neighbor = cell.neighbor(d);
            let Some(other) = grid.terrain_at(neighbor) else {
                continue;
            };
            let i = d.index() as i32;
            let edge = distance_to_segment(
                point,
                center + corner_offset_2d(i),
                center + corner_offset_2d(i + 1),
            );
            let w = cosine_smoothstep(1.0 - (edge / range).clamp(0.0, 1.0));
            if w <= 0.0 {
                continue;
            }

            let other_center = neighbor.to_map();
            height += w * self.shaper.height(other, other_center, point);
            height_weight += w;

            let aw = if other == TerrainType::ShallowWater {
                w * config.shallows_alpha_bias
            } else {
                w
            };
            let contribution = self.shaper.alpha(other, other_center, point);
            for (acc, v) in alpha.iter_mut().zip(contribution) {
                *acc += aw * v;
            }
            alpha_weight += aw;
        }

        height /= height_weight;
        for v in alpha.iter_mut() {
            *v /= alpha_weight;
        }
        let sum: f32 = alpha.iter().sum();
        if sum > 0.0 {
            for v in alpha.iter_mut() {
                *v /= sum;
            }
        }
        TerrainSample { height, alpha }
    }
}
