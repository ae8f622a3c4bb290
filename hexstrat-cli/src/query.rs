//! Path and reach commands - run searches on the background scheduler
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_path(), run_reach() - orchestration
//! - Level 2: prepare_query(), run_on_scheduler()
//! - Level 3: (delegated to hexstrat-jobs)
//! - Level 4: report formatting

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hexstrat_core::{GameConfig, Hex, Mover, Path, TileGrid, UnitId};
use hexstrat_jobs::SearchScheduler;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Which unit type moves, and with how much power
#[derive(Args)]
pub struct UnitArgs {
    /// Unit definition name from the config
    #[arg(long, default_value = "wheeled")]
    pub unit: String,

    /// Remaining move power (defaults to the unit's full power)
    #[arg(long)]
    pub power: Option<f32>,
}

#[derive(Args)]
pub struct PathArgs {
    /// Map document JSON
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Start cell as q,r
    #[arg(long, value_parser = crate::parse_hex, allow_hyphen_values = true)]
    pub from: Hex,

    /// Goal cell as q,r
    #[arg(long, value_parser = crate::parse_hex, allow_hyphen_values = true)]
    pub to: Hex,

    #[command(flatten)]
    pub unit: UnitArgs,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReachArgs {
    /// Map document JSON
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Start cell as q,r
    #[arg(long, value_parser = crate::parse_hex, allow_hyphen_values = true)]
    pub from: Hex,

    #[command(flatten)]
    pub unit: UnitArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PathReport {
    found: bool,
    cells: Vec<Hex>,
    step_costs: Vec<f32>,
    total_cost: f32,
}

impl From<Option<Path>> for PathReport {
    fn from(path: Option<Path>) -> Self {
        match path {
            Some(path) => Self {
                found: true,
                cells: path.cells().to_vec(),
                step_costs: path.step_costs().to_vec(),
                total_cost: path.total_cost(),
            },
            None => Self {
                found: false,
                cells: Vec::new(),
                step_costs: Vec::new(),
                total_cost: 0.0,
            },
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run_path(args: PathArgs, config: &GameConfig) -> Result<()> {
    let (grid, mover) = prepare_query(&args.map, &args.unit, config)?;
    let (from, to) = (args.from, args.to);
    let path = run_on_scheduler(|scheduler| {
        scheduler.request_path(UnitId(0), grid, from, to, mover)
    })?;

    let report = PathReport::from(path);
    if report.found {
        tracing::info!(
            "Path {:?} -> {:?}: {} cells, cost {:.3}",
            from,
            to,
            report.cells.len(),
            report.total_cost
        );
    } else {
        tracing::warn!("No path from {:?} to {:?}", from, to);
    }
    crate::write_json(&report, args.output.as_deref())
}

pub fn run_reach(args: ReachArgs, config: &GameConfig) -> Result<()> {
    let (grid, mover) = prepare_query(&args.map, &args.unit, config)?;
    let from = args.from;
    let reach = run_on_scheduler(|scheduler| scheduler.request_reach(UnitId(0), grid, from, mover))?
        .with_context(|| format!("start cell {from:?} is not on the map"))?;

    tracing::info!(
        "Reach from {:?}: {} landable, {} pass-through",
        from,
        reach.landable.len(),
        reach.pass_through.len()
    );
    crate::write_json(&reach, args.output.as_deref())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn prepare_query(map: &std::path::Path, unit: &UnitArgs, config: &GameConfig) -> Result<(Arc<TileGrid>, Mover)> {
    let grid = crate::load_grid(map)?;
    let mover = build_mover(config, unit)?;
    Ok((Arc::new(grid), mover))
}

/// Submits one job on a fresh runtime and blocks until it finishes
fn run_on_scheduler<T, F>(submit: F) -> Result<Option<T>>
where
    F: FnOnce(&SearchScheduler) -> hexstrat_jobs::SearchJob<T>,
{
    let runtime = tokio::runtime::Runtime::new()?;
    let scheduler = SearchScheduler::new(runtime.handle().clone());
    let job = submit(&scheduler);
    Ok(runtime.block_on(job.wait()))
}

// ============================================================================
// LEVEL 4 - HELPERS
// ============================================================================

fn build_mover(config: &GameConfig, unit: &UnitArgs) -> Result<Mover> {
    let definition = config.unit(&unit.unit).with_context(|| {
        let known: Vec<&str> = config.units.iter().map(|u| u.name.as_str()).collect();
        format!("unknown unit '{}' (known: {})", unit.unit, known.join(", "))
    })?;
    let power = unit.power.unwrap_or(definition.move_power);
    Ok(Mover::new(Arc::new(definition.clone()), definition.layer, power))
}

// ============================================================================
// TESTS
// ============================================================================
