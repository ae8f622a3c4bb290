//! Pathfinding and move-range search
//!
//! Both searches run the same uniform-cost (Dijkstra) expansion over the tile
//! graph:
//! - Entering a neighbor costs the average of the two tiles' terrain costs
//! - A neighbor only joins the frontier if its accumulated cost fits in the
//!   unit's remaining move power
//! - Frontier ties are broken by lowest tile index
//! - Occupied tiles are expanded through but are never valid destinations
//!
//! Cancellation is cooperative: the token is checked once per iteration and a
//! cancelled search reports nothing, never a partial result.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::WorldError;
use crate::hex::Hex;
use crate::movement::Mover;
use crate::tile::TileGrid;

/// Slack allowed when comparing accumulated cost against move power
pub const COST_EPSILON: f32 = 1e-4;

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared flag a search polls once per iteration
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Acquire)
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Position and facing of a unit part-way through a step
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepPose {
    pub position: Vec3,
    /// Bearing in degrees, clockwise from +Z
    pub yaw_degrees: f32,
}

/// Ordered, non-empty run of cells from a start to a goal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<Hex>,
    step_costs: Vec<f32>,
}

impl Path {
    pub fn cells(&self) -> &[Hex] {
        &self.cells
    }

    pub fn start(&self) -> Hex {
        self.cells[0]
    }

    pub fn goal(&self) -> Hex {
        self.cells[self.cells.len() - 1]
    }

    /// Number of cells, start and goal included
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of steps; one fewer than the number of cells
    pub fn steps(&self) -> usize {
        self.step_costs.len()
    }

    /// Move power spent on step `step` (from cell `step` to cell `step + 1`)
    pub fn step_cost(&self, step: usize) -> Option<f32> {
        self.step_costs.get(step).copied()
    }

    pub fn step_costs(&self) -> &[f32] {
        &self.step_costs
    }

    pub fn total_cost(&self) -> f32 {
        self.step_costs.iter().sum()
    }

    /// Interpolated pose for animating step `step` at `t` in [0, 1]
    pub fn step_pose(&self, step: usize, t: f32) -> Result<StepPose, WorldError> {
        if step >= self.steps() {
            return Err(WorldError::StepOutOfRange {
                step,
                len: self.cells.len(),
            });
        }
        let from = self.cells[step];
        let to = self.cells[step + 1];
        let t = t.clamp(0.0, 1.0);
        let yaw_degrees = from.direction_to(to).map_or(0.0, |d| d.yaw_degrees());
        Ok(StepPose {
            position: from.to_world().lerp(to.to_world(), t),
            yaw_degrees,
        })
    }
}

/// Cells a unit can reach this turn
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReachableSet {
    /// Valid destinations
    pub landable: Vec<Hex>,
    /// Reachable but occupied: can be crossed, not ended on
    pub pass_through: Vec<Hex>,
}

impl ReachableSet {
    pub fn contains(&self, hex: Hex) -> bool {
        self.landable.contains(&hex)
    }
}

// ============================================================================
// PUBLIC SEARCHES
// ============================================================================

pub fn find_path(grid: &TileGrid, start: Hex, goal: Hex, mover: &Mover) -> Option<Path> {
    find_path_cancellable(grid, start, goal, mover, &CancelToken::new())
}

/// Cheapest path from `start` to `goal`, or `None` if there is none, the goal
/// is impassable or occupied, or the search was cancelled.
pub fn find_path_cancellable(
    grid: &TileGrid,
    start: Hex,
    goal: Hex,
    mover: &Mover,
    cancel: &CancelToken,
) -> Option<Path> {
    let goal_tile = grid.get(goal)?;
    if !mover.can_enter(goal_tile.terrain) || goal_tile.is_occupied() {
        debug!(?goal, "goal rejected");
        return None;
    }
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;

    let search = run_search(grid, start_index, Some(goal_index), mover, cancel)?;
    if !search.reached_goal {
        debug!(?start, ?goal, explored = search.explored, "no path");
        return None;
    }

    let mut indices = vec![goal_index];
    let mut current = goal_index;
    while let Some(parent) = search.nodes.get(&current).and_then(|n| n.parent) {
        indices.push(parent);
        current = parent;
    }
    indices.reverse();

    let cells: Vec<Hex> = indices
        .iter()
        .filter_map(|&i| grid.get_by_index(i).map(|t| t.hex()))
        .collect();
    let step_costs = indices
        .windows(2)
        .map(|pair| step_cost(grid, mover, pair[0], pair[1]).unwrap_or(0.0))
        .collect();
    let path = Path { cells, step_costs };
    debug!(
        ?start,
        ?goal,
        cells = path.len(),
        cost = path.total_cost(),
        explored = search.explored,
        "path found"
    );
    Some(path)
}

pub fn find_reachable(grid: &TileGrid, start: Hex, mover: &Mover) -> Option<ReachableSet> {
    find_reachable_cancellable(grid, start, mover, &CancelToken::new())
}

/// Every cell reachable from `start` with the mover's remaining power.
/// `None` if `start` is off the map or the search was cancelled.
pub fn find_reachable_cancellable(
    grid: &TileGrid,
    start: Hex,
    mover: &Mover,
    cancel: &CancelToken,
) -> Option<ReachableSet> {
    let start_index = grid.index_of(start)?;
    let search = run_search(grid, start_index, None, mover, cancel)?;

    let mut explored: Vec<usize> = search
        .nodes
        .iter()
        .filter(|&(&i, n)| n.explored && i != start_index)
        .map(|(&i, _)| i)
        .collect();
    explored.sort_unstable();

    let mut reachable = ReachableSet::default();
    for tile in explored.into_iter().filter_map(|i| grid.get_by_index(i)) {
        if tile.is_occupied() {
            reachable.pass_through.push(tile.hex());
        } else {
            reachable.landable.push(tile.hex());
        }
    }
    debug!(
        ?start,
        landable = reachable.landable.len(),
        pass_through = reachable.pass_through.len(),
        "reachable set computed"
    );
    Some(reachable)
}

/// Cost of moving between two adjacent tiles by index.
///
/// A unit stranded on terrain it cannot cross pays only the neighbor's cost
/// to leave.
pub fn step_cost(grid: &TileGrid, mover: &Mover, from: usize, to: usize) -> Option<f32> {
    let to_cost = mover.cost(grid.get_by_index(to)?.terrain)?;
    let from_cost = grid
        .get_by_index(from)
        .and_then(|t| mover.cost(t.terrain))
        .unwrap_or(to_cost);
    Some((from_cost + to_cost) / 2.0)
}

// ============================================================================
// SEARCH CORE
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct Node {
    cost: f32,
    parent: Option<usize>,
    explored: bool,
}

/// Frontier entry; the heap pops the lowest cost, then the lowest index
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    cost: f32,
    index: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct SearchOutcome {
    nodes: FxHashMap<usize, Node>,
    reached_goal: bool,
    explored: usize,
}

fn run_search(
    grid: &TileGrid,
    start: usize,
    goal: Option<usize>,
    mover: &Mover,
    cancel: &CancelToken,
) -> Option<SearchOutcome> {
    let mut nodes: FxHashMap<usize, Node> = FxHashMap::default();
    let mut frontier = BinaryHeap::new();
    nodes.insert(
        start,
        Node {
            cost: 0.0,
            parent: None,
            explored: false,
        },
    );
    frontier.push(FrontierEntry {
        cost: 0.0,
        index: start,
    });

    let mut explored = 0usize;
    while let Some(entry) = frontier.pop() {
        if cancel.is_cancelled() {
            debug!(explored, "search cancelled");
            return None;
        }

        let current = match nodes.get_mut(&entry.index) {
            Some(node) if !node.explored && node.cost == entry.cost => {
                node.explored = true;
                *node
            }
            // Stale entry superseded by a cheaper one
            _ => continue,
        };
        explored += 1;
        trace!(index = entry.index, cost = current.cost, "expand");

        if goal == Some(entry.index) {
            return Some(SearchOutcome {
                nodes,
                reached_goal: true,
                explored,
            });
        }

        for next in grid.neighbor_indices(entry.index) {
            let Some(edge) = step_cost(grid, mover, entry.index, next) else {
                continue;
            };
            let cost = current.cost + edge;
            if cost > mover.move_power + COST_EPSILON {
                continue;
            }
            let better = match nodes.get(&next) {
                Some(node) => !node.explored && cost < node.cost,
                None => true,
            };
            if better {
                nodes.insert(
                    next,
                    Node {
                        cost,
                        parent: Some(entry.index),
                        explored: false,
                    },
                );
                frontier.push(FrontierEntry { cost, index: next });
            }
        }
    }

    if cancel.is_cancelled() {
        return None;
    }
    Some(SearchOutcome {
        nodes,
        reached_goal: false,
        explored,
    })
}
