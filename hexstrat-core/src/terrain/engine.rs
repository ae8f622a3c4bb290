//! Heightmap and alphamap rasterization with partial rebuilds

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::blend::TerrainBlender;
use super::config::{HeightmapSettings, SampleRect, TerrainConfig};
use super::shaping::{Alpha, ALPHA_LAYERS};
use crate::hex::{Hex, LONG_DIAGONAL};
use crate::tile::TileGrid;

/// Part of the map whose terrain must be re-rasterized
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RebuildRegion {
    All,
    /// One tile and the blend band around it
    Tile(Hex),
    /// World-space box in map coordinates `(x, z)`
    Rect { min: Vec2, max: Vec2 },
    /// Union box of several tiles
    Cells(Vec<Hex>),
}

impl RebuildRegion {
    /// Lattice samples covered by the region
    pub fn sample_rect(&self, settings: &HeightmapSettings) -> SampleRect {
        match self {
            RebuildRegion::All => settings.full_range(),
            _ => self
                .bounds()
                .map(|(min, max)| settings.sample_range(min, max))
                .unwrap_or_default(),
        }
    }

    /// World-space box covered. `None` for the whole map or an empty cell list.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        match self {
            RebuildRegion::All => None,
            RebuildRegion::Tile(hex) => Some(tile_bounds(*hex)),
            RebuildRegion::Rect { min, max } => Some((min.min(*max), min.max(*max))),
            RebuildRegion::Cells(cells) => {
                let mut iter = cells.iter().map(|h| tile_bounds(*h));
                let first = iter.next()?;
                Some(iter.fold(first, |(lo, hi), (a, b)| (lo.min(a), hi.max(b))))
            }
        }
    }
}

/// A tile's box, padded so neighbors blending into it are refreshed too
fn tile_bounds(hex: Hex) -> (Vec2, Vec2) {
    let center = hex.to_map();
    let half = Vec2::splat(LONG_DIAGONAL * 1.5 / 2.0 + 0.5);
    (center - half, center + half)
}

/// Rebuilt samples for one rectangle of the lattice, row-major
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainPatch {
    pub rect: SampleRect,
    /// Normalized heights in [0, 1]
    pub heights: Vec<f32>,
    pub alphas: Vec<Alpha>,
}

impl TerrainPatch {
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// Sample at `(col, row)` in lattice coordinates, if inside the patch
    pub fn get(&self, col: usize, row: usize) -> Option<(f32, Alpha)> {
        let r = &self.rect;
        if col < r.x || row < r.y || col >= r.x + r.width || row >= r.y + r.height {
            return None;
        }
        let i = (row - r.y) * r.width + (col - r.x);
        Some((self.heights[i], self.alphas[i]))
    }
}

/// Owns the full heightmap and alphamap buffers and keeps them in sync with a
/// tile grid. Both buffers share the heightmap lattice.
pub struct TerrainEngine {
    blender: TerrainBlender,
    settings: HeightmapSettings,
    heights: Vec<f32>,
    alphas: Vec<Alpha>,
}

impl TerrainEngine {
    pub fn new(config: TerrainConfig, settings: HeightmapSettings) -> Self {
        let len = settings.resolution * settings.resolution;
        let floor = config.normalize_height(config.ocean_floor);
        Self {
            blender: TerrainBlender::new(config),
            settings,
            heights: vec![floor; len],
            alphas: vec![[0.0; ALPHA_LAYERS]; len],
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        self.blender.config()
    }

    pub fn settings(&self) -> &HeightmapSettings {
        &self.settings
    }

    pub fn blender(&self) -> &TerrainBlender {
        &self.blender
    }

    pub fn resolution(&self) -> usize {
        self.settings.resolution
    }

    /// Row-major normalized heights
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn alphas(&self) -> &[Alpha] {
        &self.alphas
    }

    pub fn height_at(&self, col: usize, row: usize) -> Option<f32> {
        self.index(col, row).map(|i| self.heights[i])
    }

    pub fn alpha_at(&self, col: usize, row: usize) -> Option<Alpha> {
        self.index(col, row).map(|i| self.alphas[i])
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        let res = self.settings.resolution;
        (col < res && row < res).then_some(row * res + col)
    }

    /// Recomputes every sample in `region`, stores it, and returns the patch.
    pub fn rebuild(&mut self, grid: &TileGrid, region: &RebuildRegion) -> TerrainPatch {
        let rect = region.sample_rect(&self.settings);
        let patch = self.compute(grid, rect);
        self.apply(&patch);
        if matches!(region, RebuildRegion::All) {
            info!(resolution = self.settings.resolution, tiles = grid.len(), "terrain rebuilt");
        } else {
            debug!(?rect, "terrain patch rebuilt");
        }
        patch
    }

    /// Samples `rect` without touching the stored buffers
    pub fn compute(&self, grid: &TileGrid, rect: SampleRect) -> TerrainPatch {
        if rect.is_empty() {
            return TerrainPatch {
                rect,
                heights: Vec::new(),
                alphas: Vec::new(),
            };
        }
        let config = self.blender.config();
        let rows: Vec<(Vec<f32>, Vec<Alpha>)> = (rect.y..rect.y + rect.height)
            .into_par_iter()
            .map(|row| {
                let mut heights = Vec::with_capacity(rect.width);
                let mut alphas = Vec::with_capacity(rect.width);
                for col in rect.x..rect.x + rect.width {
                    let point = self.settings.sample_position(col, row);
                    let sample = self.blender.sample(grid, point);
                    heights.push(config.normalize_height(sample.height));
                    alphas.push(sample.alpha);
                }
                (heights, alphas)
            })
            .collect();

        let mut heights = Vec::with_capacity(rect.len());
        let mut alphas = Vec::with_capacity(rect.len());
        for (h, a) in rows {
            heights.extend(h);
            alphas.extend(a);
        }
        TerrainPatch { rect, heights, alphas }
    }

    fn apply(&mut self, patch: &TerrainPatch) {
        let res = self.settings.resolution;
        let r = patch.rect;
        for row in 0..r.height {
            let dst = (r.y + row) * res + r.x;
            let src = row * r.width;
            self.heights[dst..dst + r.width].copy_from_slice(&patch.heights[src..src + r.width]);
            self.alphas[dst..dst + r.width].copy_from_slice(&patch.alphas[src..src + r.width]);
        }
    }
}
