//! # Initial Load Task
//!
//! Fills an empty window: every resident chunk is loaded or generated nearest first,
//! then the visible area is rendered and its mobs spawned.

use std::collections::VecDeque;

use log::info;

use crate::{
    engine_state::{
        rendering::RenderSink,
        task_management::task::{Task, TaskKind, TaskStatus},
        voxels::{chunk::ChunkPosition, streamer::WorldContext},
    },
    error::WorldError,
};

use super::chunk_loading::ChunkLoader;

enum Phase {
    Start,
    Load(ChunkLoader),
    Render(VecDeque<ChunkPosition>),
    SpawnMobs(VecDeque<ChunkPosition>),
    Done,
}

pub struct InitialLoadTask {
    phase: Phase,
    visible: Vec<ChunkPosition>,
}

impl InitialLoadTask {
    pub fn new() -> Self {
        Self {
            phase: Phase::Start,
            visible: Vec::new(),
        }
    }
}

impl Default for InitialLoadTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for InitialLoadTask {
    fn kind(&self) -> TaskKind {
        TaskKind::InitialLoad
    }

    fn step(
        &mut self,
        context: &mut WorldContext,
        sink: &mut dyn RenderSink,
    ) -> Result<TaskStatus, WorldError> {
        match &mut self.phase {
            Phase::Start => {
                let render_distance = context.window.render_distance();
                let resident = context.window.positions_within(render_distance + 1);
                info!(
                    "Loading {} chunks around {}",
                    resident.len(),
                    context.window.center()
                );
                self.visible = context.window.positions_within(render_distance);
                self.phase = Phase::Load(ChunkLoader::new(resident));
            }
            Phase::Load(loader) => {
                if loader.step(context)? {
                    self.phase = Phase::Render(self.visible.iter().copied().collect());
                }
            }
            Phase::Render(pending) => match pending.pop_front() {
                Some(position) => {
                    context.render(position, sink);
                }
                None => self.phase = Phase::SpawnMobs(self.visible.iter().copied().collect()),
            },
            Phase::SpawnMobs(pending) => match pending.front() {
                Some(&position) => {
                    context.spawn_mobs(position, sink)?;
                    pending.pop_front();
                }
                None => self.phase = Phase::Done,
            },
            Phase::Done => return Ok(TaskStatus::Complete),
        }
        Ok(TaskStatus::Pending)
    }
}
