//! # Chunk Loading
//!
//! Brings a list of chunks into the window one unit of work at a time. A chunk that has
//! been saved before is read back in a single step; any other chunk is generated one
//! column per step through a `ChunkBuilder`.

use std::collections::VecDeque;

use log::debug;

use crate::{
    engine_state::voxels::{
        chunk::ChunkPosition,
        generation::{ChunkBuildStatus, ChunkBuilder},
        streamer::WorldContext,
    },
    error::WorldError,
};

/// Cursor over the chunks a task still has to make resident.
pub struct ChunkLoader {
    pending: VecDeque<ChunkPosition>,
    builder: Option<ChunkBuilder>,
}

impl ChunkLoader {
    pub fn new(positions: impl IntoIterator<Item = ChunkPosition>) -> Self {
        Self {
            pending: positions.into_iter().collect(),
            builder: None,
        }
    }

    /// Chunks not yet resident, including one being generated.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Performs one unit of loading work.
    ///
    /// A failed load keeps the position at the front of the queue.
    ///
    /// # Returns
    /// `true` once every position is resident.
    pub fn step(&mut self, context: &mut WorldContext) -> Result<bool, WorldError> {
        if let Some(builder) = self.builder.as_mut() {
            if let ChunkBuildStatus::Finished(chunk) = builder.step(&context.generator) {
                debug!("Generated chunk {}", chunk.position);
                self.builder = None;
                self.pending.pop_front();
                context.progress.chunks_generated += 1;
                context.admit(chunk);
            }
            return Ok(false);
        }

        let Some(&position) = self.pending.front() else {
            return Ok(true);
        };

        if context.window.get(position).is_some() {
            self.pending.pop_front();
        } else if context.store.exists(context.world_id, position) {
            let chunk = context.store.load(context.world_id, position)?;
            self.pending.pop_front();
            context.progress.chunks_loaded += 1;
            context.admit(chunk);
        } else {
            self.builder = Some(context.generator.begin(position));
        }
        Ok(false)
    }
}
