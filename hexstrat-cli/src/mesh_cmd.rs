//! Mesh command - emit overlay vertex and index buffers as JSON

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};

use hexstrat_core::mesh::MeshData;
use hexstrat_core::{GameConfig, Hex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MeshKind {
    Grid,
    Brim,
    Outline,
    Fill,
    Arrow,
}

#[derive(Args)]
pub struct MeshArgs {
    #[arg(long, value_enum)]
    pub kind: MeshKind,

    /// Map document; its radius sizes grid and brim meshes
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Cells as q,r. Arrows follow them in the order given.
    #[arg(long = "cell", value_parser = crate::parse_hex, allow_hyphen_values = true)]
    pub cells: Vec<Hex>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: MeshArgs, config: &GameConfig) -> Result<()> {
    let radius = match &args.map {
        Some(path) => crate::load_grid(path)?.radius(),
        None => config.map_radius,
    };
    let mesh = build_mesh(args.kind, radius, &args.cells, config)?;
    tracing::info!(
        "{:?} mesh: {} vertices, {} triangles",
        args.kind,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    crate::write_json(&mesh, args.output.as_deref())
}

fn build_mesh(kind: MeshKind, radius: u32, cells: &[Hex], config: &GameConfig) -> Result<MeshData> {
    let style = &config.overlay;
    let needs_cells = matches!(kind, MeshKind::Outline | MeshKind::Fill | MeshKind::Arrow);
    if needs_cells && cells.is_empty() {
        bail!("{kind:?} mesh needs at least one --cell");
    }
    let mesh = match kind {
        MeshKind::Grid => style.grid(radius),
        MeshKind::Brim => style.brim(radius),
        MeshKind::Outline => style.outline(cells),
        MeshKind::Fill => style.fill(cells),
        MeshKind::Arrow => {
            let mesh = style.arrow(cells);
            if mesh.is_empty() {
                bail!("arrow cells must be a chain of at least two adjacent cells");
            }
            mesh
        }
    };
    Ok(mesh)
}
