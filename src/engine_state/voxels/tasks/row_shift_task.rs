//! # Row Shift Task
//!
//! Moves the window one chunk in a direction after the player crosses a chunk border.
//!
//! Phases, each finished before the next starts:
//! 1. `Hide`: clear visuals of the row leaving the visible area
//! 2. `Evict`: persist and evict the row leaving the resident area
//! 3. `Shift`: move the window center
//! 4. `Load`: load or generate the new border row
//! 5. `Render`: resolve visibility for the row entering the visible area
//! 6. `SpawnMobs`: hand that row's persisted mobs to the sink
//!
//! The rows are computed when the task starts, from the window as the previous task
//! left it.

use std::collections::VecDeque;

use log::debug;

use crate::{
    engine_state::{
        rendering::RenderSink,
        task_management::task::{Task, TaskKind, TaskStatus},
        voxels::{
            chunk::ChunkPosition,
            streamer::{ShiftDirection, WorldContext},
            world::ring_difference,
        },
    },
    error::WorldError,
};

use super::chunk_loading::ChunkLoader;

enum Phase {
    Start,
    Hide(VecDeque<ChunkPosition>),
    Evict(VecDeque<ChunkPosition>),
    Shift,
    Load(ChunkLoader),
    Render(VecDeque<ChunkPosition>),
    SpawnMobs(VecDeque<ChunkPosition>),
    Done,
}

pub struct RowShiftTask {
    direction: ShiftDirection,
    phase: Phase,
    from: ChunkPosition,
    to: ChunkPosition,
    render_distance: i32,
}

impl RowShiftTask {
    pub fn new(direction: ShiftDirection) -> Self {
        Self {
            direction,
            phase: Phase::Start,
            from: ChunkPosition::default(),
            to: ChunkPosition::default(),
            render_distance: 0,
        }
    }

    pub fn direction(&self) -> ShiftDirection {
        self.direction
    }

    fn entering_row(&self) -> VecDeque<ChunkPosition> {
        ring_difference(self.to, self.from, self.render_distance).into()
    }
}

impl Task for RowShiftTask {
    fn kind(&self) -> TaskKind {
        TaskKind::RowShift(self.direction)
    }

    fn step(
        &mut self,
        context: &mut WorldContext,
        sink: &mut dyn RenderSink,
    ) -> Result<TaskStatus, WorldError> {
        match &mut self.phase {
            Phase::Start => {
                let (dx, dz) = self.direction.offset();
                self.from = context.window.center();
                self.to = self.from.offset(dx, dz);
                self.render_distance = context.window.render_distance();
                debug!("Shifting window {} from {} to {}", self.direction, self.from, self.to);
                self.phase = Phase::Hide(
                    ring_difference(self.from, self.to, self.render_distance).into(),
                );
            }
            Phase::Hide(leaving) => match leaving.pop_front() {
                Some(position) => context.hide(position, sink),
                None => {
                    self.phase = Phase::Evict(
                        ring_difference(self.from, self.to, self.render_distance + 1).into(),
                    );
                }
            },
            Phase::Evict(departing) => match departing.front() {
                Some(&position) => {
                    context.evict(position, sink)?;
                    departing.pop_front();
                }
                None => self.phase = Phase::Shift,
            },
            Phase::Shift => {
                context.relayout(self.to, self.render_distance)?;
                self.phase = Phase::Load(ChunkLoader::new(ring_difference(
                    self.to,
                    self.from,
                    self.render_distance + 1,
                )));
            }
            Phase::Load(loader) => {
                if loader.step(context)? {
                    self.phase = Phase::Render(self.entering_row());
                }
            }
            Phase::Render(entering) => match entering.pop_front() {
                Some(position) => {
                    context.render(position, sink);
                }
                None => {
                    context.progress.rows_rendered += 1;
                    self.phase = Phase::SpawnMobs(self.entering_row());
                }
            },
            Phase::SpawnMobs(entering) => match entering.front() {
                Some(&position) => {
                    context.spawn_mobs(position, sink)?;
                    entering.pop_front();
                }
                None => self.phase = Phase::Done,
            },
            Phase::Done => return Ok(TaskStatus::Complete),
        }
        Ok(TaskStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use crate::{
        config::WorldConfig,
        engine_state::{rendering::InstanceRecorder, voxels::streamer::ChunkStreamer},
        test_support::TempSaveDir,
    };

    use super::*;

    #[test]
    fn shift_evicts_before_loading_and_renders_the_new_row() {
        let dir = TempSaveDir::new("row-shift");
        let config = WorldConfig {
            save_root: dir.path().to_path_buf(),
            chunk_size: 8,
            world_height: 96,
            ground_level: 64,
            structure_padding: 2,
            render_distance: 1,
            ..WorldConfig::default()
        };
        let mut sink = InstanceRecorder::new();
        let mut streamer = ChunkStreamer::new(&config).unwrap();
        streamer.load_world(Point3::new(0.5, 80.0, 0.5), &mut sink).unwrap();
        streamer.run_until_idle(&mut sink).unwrap();
        let before = streamer.progress();

        streamer.update_player_position(Point3::new(-0.5, 80.0, 0.5));
        streamer.run_until_idle(&mut sink).unwrap();
        let after = streamer.progress();

        // The +X border column at ring 2 is evicted and a -X column generated.
        assert_eq!(after.chunks_saved - before.chunks_saved, 5);
        assert_eq!(after.chunks_generated - before.chunks_generated, 5);
        assert_eq!(after.chunks_rendered - before.chunks_rendered, 3);
        assert_eq!(streamer.window().center(), ChunkPosition::new(-1, 0));
        assert!(streamer.window().get(ChunkPosition::new(2, 0)).is_none());
        assert!(streamer.window().get(ChunkPosition::new(-3, 2)).is_some());

        // Only the visible 3x3 area is rendered.
        let rendered = sink.rendered_chunks();
        assert!(rendered
            .iter()
            .all(|position| position.ring_distance(ChunkPosition::new(-1, 0)) <= 1));
        assert!(!rendered.contains(&ChunkPosition::new(1, 0)));
        assert!(rendered.contains(&ChunkPosition::new(-2, 1)));
    }
}
