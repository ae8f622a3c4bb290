//! Input-driven interaction state machine
//!
//! The handler turns discrete input events into commands for the caller:
//! search requests for the scheduler, poses for the renderer, and completed
//! steps to apply to the world. It reads the world but never changes it.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::hex::Hex;
use crate::math::smooth_lerp;
use crate::navigation::{Path, ReachableSet, StepPose};
use crate::unit::UnitId;
use crate::world::World;

/// Seconds spent animating one path step
pub const DEFAULT_STEP_SECONDS: f32 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Select, confirm or retarget at a cell
    PrimaryClick(Hex),
    /// Drop the current selection
    SecondaryClick,
    /// Pointer moved over a cell
    Hover(Hex),
    /// A reach search finished; `None` when cancelled
    ReachReady {
        unit: UnitId,
        reach: Option<ReachableSet>,
    },
    /// A path search finished; `None` when cancelled or unreachable
    PathReady {
        unit: UnitId,
        goal: Hex,
        path: Option<Path>,
    },
    /// Frame advance in seconds
    Tick(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    RequestReach { unit: UnitId },
    RequestPath { unit: UnitId, goal: Hex },
    CancelSearches { unit: UnitId },
    Animate { unit: UnitId, pose: StepPose },
    /// The caller should now apply `step` of `path` to the world
    CompleteStep { unit: UnitId, path: Arc<Path>, step: usize },
    Deselect,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Selected {
        unit: UnitId,
        reach: Option<ReachableSet>,
    },
    Planning {
        unit: UnitId,
        reach: ReachableSet,
        goal: Hex,
        path: Option<Path>,
    },
    Moving {
        unit: UnitId,
        path: Arc<Path>,
        step: usize,
        /// Linear progress through the current step
        progress: f32,
    },
}

pub struct InteractionHandler {
    state: InteractionState,
    step_seconds: f32,
}

impl Default for InteractionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionHandler {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            step_seconds: DEFAULT_STEP_SECONDS,
        }
    }

    pub fn with_step_seconds(mut self, seconds: f32) -> Self {
        self.step_seconds = seconds.max(f32::EPSILON);
        self
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected_unit(&self) -> Option<UnitId> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::Selected { unit, .. }
            | InteractionState::Planning { unit, .. }
            | InteractionState::Moving { unit, .. } => Some(*unit),
        }
    }

    /// Current move range, once its search has reported
    pub fn reach(&self) -> Option<&ReachableSet> {
        match &self.state {
            InteractionState::Selected { reach, .. } => reach.as_ref(),
            InteractionState::Planning { reach, .. } => Some(reach),
            _ => None,
        }
    }

    /// Path to draw as the move preview
    pub fn planned_path(&self) -> Option<&Path> {
        match &self.state {
            InteractionState::Planning { path, .. } => path.as_ref(),
            InteractionState::Moving { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn handle(&mut self, world: &World, event: InputEvent) -> Vec<Command> {
        let before = std::mem::discriminant(&self.state);
        let state = std::mem::take(&mut self.state);
        let (next, commands) = match state {
            InteractionState::Idle => Self::idle(world, event),
            InteractionState::Selected { unit, reach } => Self::selected(world, unit, reach, event),
            InteractionState::Planning {
                unit,
                reach,
                goal,
                path,
            } => Self::planning(world, unit, reach, goal, path, event),
            InteractionState::Moving {
                unit,
                path,
                step,
                progress,
            } => self.moving(unit, path, step, progress, event),
        };
        if std::mem::discriminant(&next) != before {
            trace!(?next, "interaction state changed");
        }
        self.state = next;
        commands
    }

    fn idle(world: &World, event: InputEvent) -> (InteractionState, Vec<Command>) {
        match event {
            InputEvent::PrimaryClick(cell) => match world.unit_at(cell) {
                Some(unit) => select(unit.id),
                None => (InteractionState::Idle, Vec::new()),
            },
            _ => (InteractionState::Idle, Vec::new()),
        }
    }

    fn selected(
        world: &World,
        unit: UnitId,
        reach: Option<ReachableSet>,
        event: InputEvent,
    ) -> (InteractionState, Vec<Command>) {
        match event {
            InputEvent::ReachReady { unit: from, reach: result } if from == unit => {
                (InteractionState::Selected { unit, reach: result }, Vec::new())
            }
            InputEvent::Hover(cell) => match reach {
                Some(reach) if reach.contains(cell) => plan(unit, reach, cell),
                reach => (InteractionState::Selected { unit, reach }, Vec::new()),
            },
            InputEvent::PrimaryClick(cell) => match reach {
                Some(reach) if reach.contains(cell) => plan(unit, reach, cell),
                reach => click_away(world, unit, cell)
                    .unwrap_or((InteractionState::Selected { unit, reach }, Vec::new())),
            },
            InputEvent::SecondaryClick => deselect(unit),
            _ => (InteractionState::Selected { unit, reach }, Vec::new()),
        }
    }

    fn planning(
        world: &World,
        unit: UnitId,
        reach: ReachableSet,
        goal: Hex,
        path: Option<Path>,
        event: InputEvent,
    ) -> (InteractionState, Vec<Command>) {
        let stay = |reach: ReachableSet, path: Option<Path>| {
            (
                InteractionState::Planning {
                    unit,
                    reach,
                    goal,
                    path,
                },
                Vec::new(),
            )
        };
        match event {
            InputEvent::PathReady {
                unit: from,
                goal: target,
                path: result,
            } if from == unit && target == goal => stay(reach, result),
            InputEvent::Hover(cell) if cell == goal => stay(reach, path),
            InputEvent::Hover(cell) if reach.contains(cell) => plan(unit, reach, cell),
            InputEvent::Hover(_) => (
                InteractionState::Selected {
                    unit,
                    reach: Some(reach),
                },
                vec![Command::CancelSearches { unit }],
            ),
            InputEvent::PrimaryClick(cell) if cell == goal => match path {
                Some(path) if path.steps() > 0 => {
                    debug!(?unit, ?goal, steps = path.steps(), "move confirmed");
                    (
                        InteractionState::Moving {
                            unit,
                            path: Arc::new(path),
                            step: 0,
                            progress: 0.0,
                        },
                        Vec::new(),
                    )
                }
                path => stay(reach, path),
            },
            InputEvent::PrimaryClick(cell) if reach.contains(cell) => plan(unit, reach, cell),
            InputEvent::PrimaryClick(cell) => {
                click_away(world, unit, cell).unwrap_or_else(|| stay(reach, path))
            }
            InputEvent::SecondaryClick => deselect(unit),
            _ => stay(reach, path),
        }
    }

    fn moving(
        &self,
        unit: UnitId,
        path: Arc<Path>,
        step: usize,
        progress: f32,
        event: InputEvent,
    ) -> (InteractionState, Vec<Command>) {
        let InputEvent::Tick(dt) = event else {
            return (
                InteractionState::Moving {
                    unit,
                    path,
                    step,
                    progress,
                },
                Vec::new(),
            );
        };

        let progress = (progress + dt.max(0.0) / self.step_seconds).min(1.0);
        let mut commands = Vec::new();
        if let Ok(pose) = path.step_pose(step, smooth_lerp(progress)) {
            commands.push(Command::Animate { unit, pose });
        }
        if progress < 1.0 {
            return (
                InteractionState::Moving {
                    unit,
                    path,
                    step,
                    progress,
                },
                commands,
            );
        }

        commands.push(Command::CompleteStep {
            unit,
            path: Arc::clone(&path),
            step,
        });
        if step + 1 < path.steps() {
            (
                InteractionState::Moving {
                    unit,
                    path,
                    step: step + 1,
                    progress: 0.0,
                },
                commands,
            )
        } else {
            debug!(?unit, goal = ?path.goal(), "move finished");
            commands.push(Command::RequestReach { unit });
            (InteractionState::Selected { unit, reach: None }, commands)
        }
    }
}

fn select(unit: UnitId) -> (InteractionState, Vec<Command>) {
    (
        InteractionState::Selected { unit, reach: None },
        vec![Command::RequestReach { unit }],
    )
}

fn plan(unit: UnitId, reach: ReachableSet, goal: Hex) -> (InteractionState, Vec<Command>) {
    (
        InteractionState::Planning {
            unit,
            reach,
            goal,
            path: None,
        },
        vec![Command::RequestPath { unit, goal }],
    )
}

fn deselect(unit: UnitId) -> (InteractionState, Vec<Command>) {
    (
        InteractionState::Idle,
        vec![Command::CancelSearches { unit }, Command::Deselect],
    )
}

/// Clicking another unit switches the selection; clicking empty ground
/// outside the move range drops it. `None` leaves the state unchanged.
fn click_away(world: &World, unit: UnitId, cell: Hex) -> Option<(InteractionState, Vec<Command>)> {
    match world.unit_at(cell) {
        Some(other) if other.id == unit => None,
        Some(other) => {
            let (state, mut commands) = select(other.id);
            commands.insert(0, Command::CancelSearches { unit });
            Some((state, commands))
        }
        None => Some(deselect(unit)),
    }
}
