//! # Engine State Module
//!
//! The player-facing side of the world subsystem.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the streamer and the render sink and is driven once per frame
//! * `rendering` - The seam to the host renderer
//! * `task_management` - Cooperative scheduling of long world operations
//! * `voxels` - Voxel data, generation, persistence and streaming
//!
//! ## Frame Loop
//!
//! ```rust,ignore
//! let mut engine = EngineState::new(&config, InstanceRecorder::new())?;
//! engine.start(spawn_position)?;
//! loop {
//!     engine.update(player_position, Duration::from_millis(4))?;
//! }
//! ```

use cgmath::Point3;
use log::info;
use web_time::Duration;

use crate::{config::WorldConfig, error::WorldError};

use rendering::RenderSink;
use voxels::{
    block::block_type::BlockType,
    chunk::ChunkPosition,
    mob::MobSnapshot,
    streamer::{ChunkStreamer, StreamProgress, StreamerState},
};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The world subsystem of one running game session.
pub struct EngineState<S: RenderSink> {
    /// Streamer owning the resident chunks and the task queue
    streamer: ChunkStreamer,
    /// Receiver of visual instance updates
    sink: S,
    /// Chunk the player was in at the last update
    current_player_chunk_position: Option<ChunkPosition>,
}

impl<S: RenderSink> EngineState<S> {
    /// Validates `config` and creates an engine with nothing loaded.
    pub fn new(config: &WorldConfig, sink: S) -> Result<Self, WorldError> {
        Ok(Self {
            streamer: ChunkStreamer::new(config)?,
            sink,
            current_player_chunk_position: None,
        })
    }

    /// Queues the initial load around the player's spawn position.
    pub fn start(&mut self, player_position: Point3<f32>) -> Result<(), WorldError> {
        self.streamer.load_world(player_position, &mut self.sink)?;
        let chunk = self.chunk_of(player_position);
        self.current_player_chunk_position = Some(chunk);
        info!("World started in chunk {chunk}");
        Ok(())
    }

    fn chunk_of(&self, player_position: Point3<f32>) -> ChunkPosition {
        self.streamer
            .chunk_position_of(player_position.x.floor() as i32, player_position.z.floor() as i32)
    }

    /// Feeds the player position and advances queued work for up to `frame_budget`.
    ///
    /// # Returns
    /// The number of task steps performed.
    pub fn update(
        &mut self,
        player_position: Point3<f32>,
        frame_budget: Duration,
    ) -> Result<usize, WorldError> {
        let chunk = self.chunk_of(player_position);
        if self.current_player_chunk_position != Some(chunk) {
            self.streamer.update_player_position(player_position);
            self.current_player_chunk_position = Some(chunk);
        }
        self.streamer.process_for(frame_budget, &mut self.sink)
    }

    /// Runs every queued task to completion.
    pub fn finish_tasks(&mut self) -> Result<usize, WorldError> {
        self.streamer.run_until_idle(&mut self.sink)
    }

    pub fn set_render_distance(&mut self, render_distance: i32) -> Result<(), WorldError> {
        self.streamer.set_render_distance(render_distance, &mut self.sink)
    }

    /// Places or destroys a block, returning the block type it replaced.
    pub fn set_block(
        &mut self,
        global: Point3<i32>,
        block_type: BlockType,
    ) -> Result<BlockType, WorldError> {
        self.streamer.set_block(global, block_type, &mut self.sink)
    }

    pub fn block_at(&self, global: Point3<i32>) -> Option<BlockType> {
        self.streamer.block_at(global)
    }

    pub fn add_mob(&mut self, mob: MobSnapshot) -> Result<ChunkPosition, WorldError> {
        self.streamer.add_mob(mob)
    }

    pub fn save_all(&mut self) -> Result<usize, WorldError> {
        self.streamer.save_all()
    }

    pub fn unload_all(&mut self) -> Result<usize, WorldError> {
        self.current_player_chunk_position = None;
        self.streamer.unload_all(&mut self.sink)
    }

    pub fn state(&self) -> StreamerState {
        self.streamer.state()
    }

    pub fn progress(&self) -> StreamProgress {
        self.streamer.progress()
    }

    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    pub fn streamer_mut(&mut self) -> &mut ChunkStreamer {
        &mut self.streamer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
