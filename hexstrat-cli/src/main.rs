//! HEXSTRAT CLI - Command-line interface
//!
//! Commands:
//! - generate: Create a random map document
//! - path: Find the cheapest path for a unit type
//! - reach: List the cells a unit type can reach
//! - terrain: Rasterize the heightmap and alphamap
//! - mesh: Emit overlay mesh buffers

mod generate;
mod mesh_cmd;
mod query;
mod terrain_cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexstrat_core::{GameConfig, Hex, MapData, TileGrid};

#[derive(Parser)]
#[command(name = "hexstrat")]
#[command(about = "HEXSTRAT hex-grid simulation tools")]
struct Cli {
    /// Game configuration JSON (defaults apply to anything missing)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a random map document
    Generate(generate::GenerateArgs),
    /// Find the cheapest path between two cells
    Path(query::PathArgs),
    /// List reachable and pass-through cells
    Reach(query::ReachArgs),
    /// Rebuild the full heightmap and alphamap
    Terrain(terrain_cmd::TerrainArgs),
    /// Emit an overlay mesh as JSON
    Mesh(mesh_cmd::MeshArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Generate(args) => generate::run(args, &config),
        Commands::Path(args) => query::run_path(args, &config),
        Commands::Reach(args) => query::run_reach(args, &config),
        Commands::Terrain(args) => terrain_cmd::run(args, &config),
        Commands::Mesh(args) => mesh_cmd::run(args, &config),
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Parses `q,r` into a cell
pub(crate) fn parse_hex(s: &str) -> Result<Hex, String> {
    let (q, r) = s
        .split_once(',')
        .ok_or_else(|| format!("expected q,r but got '{s}'"))?;
    let q = q.trim().parse().map_err(|e| format!("bad q in '{s}': {e}"))?;
    let r = r.trim().parse().map_err(|e| format!("bad r in '{s}': {e}"))?;
    Ok(Hex::new(q, r))
}

pub(crate) fn load_grid(path: &Path) -> Result<TileGrid> {
    let data = MapData::load(path)?;
    TileGrid::from_map_data(&data).with_context(|| format!("invalid map {}", path.display()))
}

/// Writes pretty JSON to `output`, or to stdout when absent
pub(crate) fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
