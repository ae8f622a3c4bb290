//! Generate command - create a random map document

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hexstrat_core::{GameConfig, TerrainType, TileGrid};

#[derive(Args)]
pub struct GenerateArgs {
    /// Map radius (defaults to the config's map radius)
    #[arg(long)]
    pub radius: Option<u32>,

    /// Seed for a reproducible map; random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output map JSON (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: GenerateArgs, config: &GameConfig) -> Result<()> {
    let radius = args.radius.unwrap_or(config.map_radius);
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let grid = TileGrid::generate(radius, &mut rng);

    let mut counts = [0usize; TerrainType::COUNT];
    for tile in grid.tiles() {
        counts[tile.terrain.index()] += 1;
    }
    for terrain in TerrainType::ALL {
        tracing::info!("{:?}: {} tiles", terrain, counts[terrain.index()]);
    }

    crate::write_json(&grid.to_map_data(), args.output.as_deref())
}
