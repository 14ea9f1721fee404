//! # Task System Core Traits
//!
//! This module defines the building block of the task system: a [`Task`] is a
//! long-running world operation split into small steps.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and queued via `TaskManager::publish_task()`
//! 2. When it reaches the front of the queue it becomes the task in flight
//! 3. Each scheduler tick calls `step()` once; a step performs one unit of work (one
//!    column of generation, one chunk load, one chunk render) and returns
//! 4. The task reports [`TaskStatus::Complete`] and the next queued task starts
//!
//! Tasks run on the thread that owns the world. They never overlap: the world state a
//! task sees between two of its own steps is only changed by that task, or by
//! synchronous calls that drain the queue first.

use std::fmt;

use crate::{
    engine_state::{
        rendering::RenderSink,
        voxels::streamer::{ShiftDirection, WorldContext},
    },
    error::WorldError,
};

/// Whether a task has work left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Complete,
}

/// What a task is doing, for state queries and logging.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Loading and rendering the whole window around the player.
    InitialLoad,
    /// Moving the window one chunk in a direction.
    RowShift(ShiftDirection),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::InitialLoad => write!(f, "initial load"),
            TaskKind::RowShift(direction) => write!(f, "row shift {direction}"),
        }
    }
}

/// An incrementally steppable unit of world work.
///
/// # Implementation Guidelines
/// - Keep each step bounded: one column or one chunk, never a whole row
/// - Phases that must be ordered (persist, then load, then render, then spawn) finish
///   completely before the next phase starts
/// - A step that returns an error must leave the world consistent, so that stepping
///   again retries the same unit of work
pub trait Task {
    fn kind(&self) -> TaskKind;

    /// Performs one unit of work.
    fn step(
        &mut self,
        context: &mut WorldContext,
        sink: &mut dyn RenderSink,
    ) -> Result<TaskStatus, WorldError>;
}
