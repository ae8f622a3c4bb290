//! Terrain blending: a heightmap and a 5-layer splat alphamap rasterized
//! from the tile grid.
//!
//! Each tile contributes its own height and splat weights; near a shared edge
//! the neighbor's contribution fades in so that terrain types meet smoothly.
//! Layers are, in order: grass, rock, snow, sand, sediment.

pub mod blend;
pub mod config;
pub mod engine;
pub mod shaping;

pub use blend::{TerrainBlender, TerrainSample};
pub use config::{HeightmapSettings, SampleRect, TerrainConfig};
pub use engine::{RebuildRegion, TerrainEngine, TerrainPatch};
pub use shaping::{
    Alpha, TerrainShaper, ALPHA_LAYERS, LAYER_GRASS, LAYER_ROCK, LAYER_SAND, LAYER_SEDIMENT,
    LAYER_SNOW,
};
