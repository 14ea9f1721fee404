//! # Task Management System
//!
//! This module provides the cooperative scheduler that drives long-running world
//! operations without blocking the host frame loop.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: FIFO queue of tasks plus at most one task in flight
//! - `Task`: an operation split into bounded steps (see [`task`])
//!
//! Everything runs on the thread that owns the world. There are no workers: the host
//! calls [`TaskManager::tick`] or [`TaskManager::process_for`] once per frame and the
//! in-flight task advances by one or more steps.
//!
//! ## Ordering
//!
//! Tasks run strictly one at a time in publication order. A task published while another
//! is in flight waits in the queue; it is never interleaved.
//!
//! ## Example Usage
//! ```rust,ignore
//! task_manager.publish_task(Box::new(RowShiftTask::new(ShiftDirection::PositiveX)));
//!
//! // In your main/game loop:
//! task_manager.process_for(frame_budget, &mut context, &mut sink)?;
//! ```

pub mod task;

use std::collections::VecDeque;

use log::{debug, trace};
use task::{Task, TaskKind, TaskStatus};
use web_time::{Duration, Instant};

use crate::error::WorldError;

use super::{rendering::RenderSink, voxels::streamer::WorldContext};

/// Sequential scheduler for world tasks.
#[derive(Default)]
pub struct TaskManager {
    queued_tasks: VecDeque<Box<dyn Task>>,
    in_flight: Option<Box<dyn Task>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a task behind every task already published.
    ///
    /// # Returns
    /// `true` if the task became the task in flight immediately.
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        debug!("Publishing task: {}", task.kind());
        self.queued_tasks.push_back(task);
        self.process_queued_tasks();
        self.queued_tasks.is_empty() && self.in_flight.is_some()
    }

    /// Promotes the oldest queued task if nothing is in flight.
    pub fn process_queued_tasks(&mut self) {
        if self.in_flight.is_none() {
            self.in_flight = self.queued_tasks.pop_front();
        }
    }

    /// Whether no task is in flight or queued.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.queued_tasks.is_empty()
    }

    /// Kind of the task currently in flight.
    pub fn current_kind(&self) -> Option<TaskKind> {
        self.in_flight.as_ref().map(|task| task.kind())
    }

    /// Number of tasks waiting behind the one in flight.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Steps the task in flight once.
    ///
    /// An error leaves the task in flight so the next tick retries the failed step.
    ///
    /// # Returns
    /// `true` if a step was performed, `false` if there was nothing to do.
    pub fn tick(
        &mut self,
        context: &mut WorldContext,
        sink: &mut dyn RenderSink,
    ) -> Result<bool, WorldError> {
        self.process_queued_tasks();
        let Some(task) = self.in_flight.as_mut() else {
            return Ok(false);
        };

        if task.step(context, sink)? == TaskStatus::Complete {
            debug!("Task complete: {}", task.kind());
            self.in_flight = None;
            context.progress.tasks_completed += 1;
            self.process_queued_tasks();
        }
        Ok(true)
    }

    /// Steps tasks until `budget` has elapsed or the queue runs dry. At least one step is
    /// performed if any work is pending.
    ///
    /// # Returns
    /// The number of steps performed.
    pub fn process_for(
        &mut self,
        budget: Duration,
        context: &mut WorldContext,
        sink: &mut dyn RenderSink,
    ) -> Result<usize, WorldError> {
        let start = Instant::now();
        let mut steps = 0;
        while self.tick(context, sink)? {
            steps += 1;
            if start.elapsed() >= budget {
                break;
            }
        }
        trace!("Processed {steps} task steps in {:?}", start.elapsed());
        Ok(steps)
    }

    /// Steps tasks until none are left.
    pub fn run_until_idle(
        &mut self,
        context: &mut WorldContext,
        sink: &mut dyn RenderSink,
    ) -> Result<usize, WorldError> {
        let mut steps = 0;
        while self.tick(context, sink)? {
            steps += 1;
        }
        Ok(steps)
    }
}
