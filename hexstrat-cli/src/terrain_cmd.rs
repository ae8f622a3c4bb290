//! Terrain command - rasterize the heightmap and alphamap for a map
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_engine(), summarize()
//! - Level 3: (delegated to hexstrat-core terrain engine)

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use hexstrat_core::terrain::{Alpha, SampleRect, ALPHA_LAYERS};
use hexstrat_core::{GameConfig, RebuildRegion, TerrainEngine, TerrainPatch};

#[derive(Args)]
pub struct TerrainArgs {
    /// Map document JSON
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Samples per side (overrides the config)
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Perlin seed for mountain relief (overrides the config)
    #[arg(long)]
    pub noise_seed: Option<u32>,

    /// Write the full patch as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PatchDocument<'a> {
    resolution: usize,
    world_size: f32,
    rect: SampleRect,
    heights: &'a [f32],
    alphas: &'a [Alpha],
}

#[derive(Debug, PartialEq)]
struct Summary {
    min_height: f32,
    max_height: f32,
    /// Mean weight of each splat layer
    layer_means: Alpha,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: TerrainArgs, config: &GameConfig) -> Result<()> {
    let grid = crate::load_grid(&args.map)?;
    let mut engine = build_engine(&args, config);
    let patch = engine.rebuild(&grid, &RebuildRegion::All);

    let summary = summarize(&patch);
    tracing::info!(
        "Heights {:.3}..{:.3}, layer means {:?}",
        summary.min_height,
        summary.max_height,
        summary.layer_means
    );

    if let Some(output) = args.output.as_deref() {
        let document = PatchDocument {
            resolution: engine.resolution(),
            world_size: engine.settings().world_size,
            rect: patch.rect,
            heights: &patch.heights,
            alphas: &patch.alphas,
        };
        crate::write_json(&document, Some(output))?;
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_engine(args: &TerrainArgs, config: &GameConfig) -> TerrainEngine {
    let mut terrain = config.terrain.clone();
    if let Some(seed) = args.noise_seed {
        terrain = terrain.with_noise_seed(seed);
    }
    let mut settings = config.heightmap;
    if let Some(resolution) = args.resolution {
        settings = settings.with_resolution(resolution);
    }
    TerrainEngine::new(terrain, settings)
}

fn summarize(patch: &TerrainPatch) -> Summary {
    let min_height = patch.heights.iter().copied().fold(f32::INFINITY, f32::min);
    let max_height = patch.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut layer_means = [0.0; ALPHA_LAYERS];
    for alpha in &patch.alphas {
        for (mean, v) in layer_means.iter_mut().zip(alpha) {
            *mean += v;
        }
    }
    let n = patch.alphas.len().max(1) as f32;
    for mean in layer_means.iter_mut() {
        *mean /= n;
    }
    Summary {
        min_height,
        max_height,
        layer_means,
    }
}

// ============================================================================
// TESTS
// ============================================================================
