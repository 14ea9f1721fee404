//! # Chunk Streamer
//!
//! Keeps the [`ChunkWindow`] centered on the player.
//!
//! ## States
//!
//! - `Idle`: nothing in flight
//! - `ShiftingRow(direction)`: the player crossed a chunk border and a row shift task is
//!   running. Every crossing queues its own task; tasks never interleave
//! - `ExpandingWindow`: the initial load task is filling the window
//!
//! Render distance changes are applied synchronously, after draining the task queue, so
//! they never race a row shift over the same chunks.
//!
//! ## Row shift order
//!
//! For one crossing: hide the row leaving the visible area, persist and evict the row
//! leaving the resident area, move the window, load or generate the new border row,
//! render the row entering the visible area, then spawn its mobs. Each phase completes
//! before the next begins.
//!
//! ## Edits
//!
//! `set_block` writes straight into the owning chunk, then re-resolves the edited cell
//! and its six neighbours against the rendered set and reports only the differences.

use std::fmt;

use cgmath::Point3;
use log::{debug, info, warn};
use serde::Serialize;
use web_time::Duration;

use crate::{
    config::{validate_render_distance, WorldConfig},
    engine_state::{
        rendering::RenderSink,
        task_management::{task::TaskKind, TaskManager},
    },
    error::WorldError,
};

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{local_coordinate, Chunk, ChunkPosition},
    generation::WorldGenerator,
    mob::MobSnapshot,
    storage::ChunkStore,
    tasks::{initial_load_task::InitialLoadTask, row_shift_task::RowShiftTask},
    visibility,
    world::{ChunkWindow, WindowSlot},
};

/// Unit step of the window center.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShiftDirection {
    PositiveX,
    NegativeX,
    PositiveZ,
    NegativeZ,
}

impl ShiftDirection {
    /// Chunk offset `(dx, dz)` of one step.
    pub fn offset(self) -> (i32, i32) {
        match self {
            ShiftDirection::PositiveX => (1, 0),
            ShiftDirection::NegativeX => (-1, 0),
            ShiftDirection::PositiveZ => (0, 1),
            ShiftDirection::NegativeZ => (0, -1),
        }
    }
}

impl fmt::Display for ShiftDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftDirection::PositiveX => "+X",
            ShiftDirection::NegativeX => "-X",
            ShiftDirection::PositiveZ => "+Z",
            ShiftDirection::NegativeZ => "-Z",
        };
        f.write_str(name)
    }
}

/// What the streamer is doing right now.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamerState {
    Idle,
    ExpandingWindow,
    ShiftingRow(ShiftDirection),
}

/// Counters for a loading progress display.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StreamProgress {
    pub chunks_generated: u64,
    pub chunks_loaded: u64,
    pub chunks_saved: u64,
    pub chunks_rendered: u64,
    pub rows_rendered: u64,
    pub tasks_completed: u64,
}

/// The world state tasks operate on.
pub struct WorldContext {
    pub world_id: u32,
    pub window: ChunkWindow,
    pub store: ChunkStore,
    pub generator: WorldGenerator,
    pub progress: StreamProgress,
}

impl WorldContext {
    /// Creates an empty window centered on chunk `(0, 0)`. The config must be valid.
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            world_id: config.world_id,
            window: ChunkWindow::new(ChunkPosition::default(), config.render_distance),
            store: ChunkStore::new(
                config.save_root.clone(),
                config.dimensions(),
                config.chunk_cache_capacity,
            ),
            generator: WorldGenerator::new(config),
            progress: StreamProgress::default(),
        }
    }

    /// Moves a finished chunk into the window.
    pub fn admit(&mut self, chunk: Chunk) {
        if let Err(slot) = self.window.insert(WindowSlot::new(chunk)) {
            warn!("Dropping chunk {} outside the window", slot.position());
        }
    }

    /// Loads or generates a chunk in one call, if it is not resident yet.
    pub fn load_now(&mut self, position: ChunkPosition) -> Result<(), WorldError> {
        if self.window.get(position).is_some() {
            return Ok(());
        }
        let chunk = if self.store.exists(self.world_id, position) {
            let chunk = self.store.load(self.world_id, position)?;
            self.progress.chunks_loaded += 1;
            chunk
        } else {
            self.progress.chunks_generated += 1;
            self.generator.generate_chunk(position)
        };
        self.admit(chunk);
        Ok(())
    }

    /// Writes a resident chunk, and its mobs if they are tracked.
    ///
    /// # Returns
    /// `false` if the chunk is not resident.
    pub fn persist(&mut self, position: ChunkPosition) -> Result<bool, WorldError> {
        let Some(slot) = self.window.get(position) else {
            return Ok(false);
        };
        persist_slot(&mut self.store, self.world_id, slot)?;
        self.progress.chunks_saved += 1;
        Ok(true)
    }

    /// Persists a chunk, drops its visuals and removes it from the window.
    ///
    /// A failed save leaves the chunk resident.
    pub fn evict(
        &mut self,
        position: ChunkPosition,
        sink: &mut dyn RenderSink,
    ) -> Result<(), WorldError> {
        if !self.persist(position)? {
            return Ok(());
        }
        self.hide(position, sink);
        self.window.take(position);
        debug!("Evicted chunk {position}");
        Ok(())
    }

    /// Drops the visual instances of a chunk while keeping its data.
    pub fn hide(&mut self, position: ChunkPosition, sink: &mut dyn RenderSink) {
        if let Some(slot) = self.window.get_mut(position) {
            if slot.visible.take().is_some() {
                sink.clear_chunk(position);
            }
        }
    }

    /// Resolves visibility for a whole chunk and shows every visible block.
    ///
    /// # Returns
    /// `false` if the chunk is not resident.
    pub fn render(&mut self, position: ChunkPosition, sink: &mut dyn RenderSink) -> bool {
        let Some(slot) = self.window.get(position) else {
            return false;
        };
        if slot.is_rendered() {
            sink.clear_chunk(position);
        }

        let chunk = &slot.chunk;
        let dimensions = chunk.dimensions();
        let visible = visibility::resolve_chunk(chunk, &self.window.neighbors(position));
        for index in visible.iter_ones() {
            let local = dimensions.position_of(index);
            sink.show_block(position, local, chunk.get_block_at(local.x, local.y, local.z));
        }

        if let Some(slot) = self.window.get_mut(position) {
            slot.visible = Some(visible);
        }
        self.progress.chunks_rendered += 1;
        true
    }

    /// The tracked mob list of a resident chunk, read from its mob file on first use.
    ///
    /// Seeding from disk keeps saved mobs in the list, so a later write never drops them.
    pub fn tracked_mobs(
        &mut self,
        position: ChunkPosition,
    ) -> Result<&mut Vec<MobSnapshot>, WorldError> {
        let slot = self
            .window
            .get_mut(position)
            .ok_or(WorldError::ChunkNotLoaded {
                chunk_x: position.x,
                chunk_z: position.z,
            })?;
        if slot.mobs.is_none() {
            let saved = self
                .store
                .load_mobs(self.world_id, position)?
                .unwrap_or_default();
            if !slot.mobs_spawned {
                slot.unspawned_mobs = saved.len();
            }
            slot.mobs = Some(saved);
        }
        Ok(slot.mobs.get_or_insert_with(Vec::new))
    }

    /// Hands the saved mobs of a chunk to the sink, once per residency.
    pub fn spawn_mobs(
        &mut self,
        position: ChunkPosition,
        sink: &mut dyn RenderSink,
    ) -> Result<(), WorldError> {
        match self.window.get(position) {
            Some(slot) if !slot.mobs_spawned => {}
            _ => return Ok(()),
        }
        self.tracked_mobs(position)?;

        let Some(slot) = self.window.get_mut(position) else {
            return Ok(());
        };
        let pending = slot.unspawned_mobs;
        if let Some(mobs) = slot.mobs.as_deref() {
            if pending > 0 {
                debug!("Spawning {pending} mobs in chunk {position}");
                sink.spawn_mobs(position, &mobs[..pending.min(mobs.len())]);
            }
        }
        slot.unspawned_mobs = 0;
        slot.mobs_spawned = true;
        Ok(())
    }

    /// Moves the window, persisting anything the new layout leaves behind.
    pub fn relayout(
        &mut self,
        center: ChunkPosition,
        render_distance: i32,
    ) -> Result<(), WorldError> {
        for slot in self.window.relayout(center, render_distance) {
            persist_slot(&mut self.store, self.world_id, &slot)?;
            self.progress.chunks_saved += 1;
        }
        Ok(())
    }

    /// Re-resolves one rendered cell and reports the change, if any.
    fn refresh_cell(&mut self, global: Point3<i32>, edited: bool, sink: &mut dyn RenderSink) {
        let dimensions = self.store.dimensions();
        if global.y < 0 || global.y >= dimensions.height as i32 {
            return;
        }
        let position = ChunkPosition::containing(global.x, global.z, dimensions.size);
        let local = Point3::new(
            local_coordinate(global.x, dimensions.size),
            global.y as usize,
            local_coordinate(global.z, dimensions.size),
        );
        let Some(slot) = self.window.get(position) else {
            return;
        };
        let Some(visible) = slot.visible.as_ref() else {
            return;
        };

        let index = dimensions.index(local.x, local.y, local.z);
        let was_visible = visible[index];
        let now_visible =
            visibility::should_render(&slot.chunk, &self.window.neighbors(position), local);

        if now_visible && (edited || !was_visible) {
            let block_type = slot.chunk.get_block_at(local.x, local.y, local.z);
            sink.show_block(position, local, block_type);
        } else if !now_visible && was_visible {
            sink.hide_block(position, local);
        }

        if now_visible != was_visible {
            if let Some(visible) = self
                .window
                .get_mut(position)
                .and_then(|slot| slot.visible.as_mut())
            {
                visible.set(index, now_visible);
            }
        }
    }
}

fn persist_slot(
    store: &mut ChunkStore,
    world_id: u32,
    slot: &WindowSlot,
) -> Result<(), WorldError> {
    store.save(&slot.chunk, world_id)?;
    if let Some(mobs) = &slot.mobs {
        store.save_mobs(mobs, world_id, slot.position())?;
    }
    Ok(())
}

/// Streams chunks in and out of the window as the player moves.
pub struct ChunkStreamer {
    context: WorldContext,
    task_manager: TaskManager,
    /// Window center once every queued shift has run.
    target_center: ChunkPosition,
}

impl ChunkStreamer {
    /// Creates a streamer with an empty window. Nothing is loaded until
    /// [`ChunkStreamer::load_world`].
    pub fn new(config: &WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        info!(
            "Creating world {} with seed {} at {}",
            config.world_id,
            config.seed,
            config.save_root.display()
        );
        Ok(Self {
            context: WorldContext::new(config),
            task_manager: TaskManager::new(),
            target_center: ChunkPosition::default(),
        })
    }

    pub fn state(&self) -> StreamerState {
        match self.task_manager.current_kind() {
            None => StreamerState::Idle,
            Some(TaskKind::InitialLoad) => StreamerState::ExpandingWindow,
            Some(TaskKind::RowShift(direction)) => StreamerState::ShiftingRow(direction),
        }
    }

    pub fn progress(&self) -> StreamProgress {
        self.context.progress
    }

    pub fn window(&self) -> &ChunkWindow {
        &self.context.window
    }

    pub fn context(&self) -> &WorldContext {
        &self.context
    }

    /// Whether tasks are still queued or in flight.
    pub fn is_busy(&self) -> bool {
        !self.task_manager.is_idle()
    }

    /// The chunk holding a global block position.
    pub fn chunk_position_of(&self, global_x: i32, global_z: i32) -> ChunkPosition {
        ChunkPosition::containing(global_x, global_z, self.context.store.dimensions().size)
    }

    /// Starts streaming around `player_position`, unloading any previous window first.
    pub fn load_world(
        &mut self,
        player_position: Point3<f32>,
        sink: &mut dyn RenderSink,
    ) -> Result<(), WorldError> {
        self.task_manager.run_until_idle(&mut self.context, sink)?;
        if !self.context.window.is_empty() {
            self.unload_all(sink)?;
        }

        let center = self.player_chunk(player_position);
        let render_distance = self.context.window.render_distance();
        self.context.window = ChunkWindow::new(center, render_distance);
        self.target_center = center;
        info!("Loading world around chunk {center}");
        self.task_manager.publish_task(Box::new(InitialLoadTask::new()));
        Ok(())
    }

    fn player_chunk(&self, player_position: Point3<f32>) -> ChunkPosition {
        self.chunk_position_of(
            player_position.x.floor() as i32,
            player_position.z.floor() as i32,
        )
    }

    /// Queues one row shift per chunk border crossed since the last update, X first.
    ///
    /// # Returns
    /// The number of shifts queued.
    pub fn update_player_position(&mut self, player_position: Point3<f32>) -> usize {
        let chunk = self.player_chunk(player_position);
        let mut queued = 0;
        while self.target_center != chunk {
            let direction = if chunk.x > self.target_center.x {
                ShiftDirection::PositiveX
            } else if chunk.x < self.target_center.x {
                ShiftDirection::NegativeX
            } else if chunk.z > self.target_center.z {
                ShiftDirection::PositiveZ
            } else {
                ShiftDirection::NegativeZ
            };
            let (dx, dz) = direction.offset();
            self.target_center = self.target_center.offset(dx, dz);
            self.task_manager
                .publish_task(Box::new(RowShiftTask::new(direction)));
            queued += 1;
        }
        if queued > 0 {
            debug!("Player entered chunk {chunk}, queued {queued} row shifts");
        }
        queued
    }

    /// Performs one task step.
    pub fn tick(&mut self, sink: &mut dyn RenderSink) -> Result<bool, WorldError> {
        self.task_manager.tick(&mut self.context, sink)
    }

    /// Performs task steps for up to `budget`.
    pub fn process_for(
        &mut self,
        budget: Duration,
        sink: &mut dyn RenderSink,
    ) -> Result<usize, WorldError> {
        self.task_manager.process_for(budget, &mut self.context, sink)
    }

    /// Runs every queued task to completion.
    pub fn run_until_idle(&mut self, sink: &mut dyn RenderSink) -> Result<usize, WorldError> {
        self.task_manager.run_until_idle(&mut self.context, sink)
    }

    /// Changes the render distance immediately.
    ///
    /// Growing loads every newly resident chunk and renders every newly visible one.
    /// Shrinking persists and evicts chunks beyond the new resident area and clears the
    /// visuals of the new border ring, keeping its data.
    pub fn set_render_distance(
        &mut self,
        render_distance: i32,
        sink: &mut dyn RenderSink,
    ) -> Result<(), WorldError> {
        validate_render_distance(render_distance)?;
        self.task_manager.run_until_idle(&mut self.context, sink)?;

        let previous = self.context.window.render_distance();
        if render_distance == previous {
            return Ok(());
        }
        info!("Render distance {previous} -> {render_distance}");

        let center = self.context.window.center();
        if self.context.window.is_empty() {
            return self.context.relayout(center, render_distance);
        }

        if render_distance > previous {
            self.context.relayout(center, render_distance)?;
            for position in self.context.window.positions_within(render_distance + 1) {
                self.context.load_now(position)?;
            }
            for position in self.context.window.positions_within(render_distance) {
                if position.ring_distance(center) > previous {
                    self.context.render(position, sink);
                    self.context.spawn_mobs(position, sink)?;
                }
            }
        } else {
            for position in self.context.window.positions_within(previous + 1) {
                let ring = position.ring_distance(center);
                if ring > render_distance + 1 {
                    self.context.evict(position, sink)?;
                } else if ring > render_distance {
                    self.context.hide(position, sink);
                }
            }
            self.context.relayout(center, render_distance)?;
        }
        Ok(())
    }

    /// Reads the block at a global position, if its chunk is resident.
    pub fn block_at(&self, global: Point3<i32>) -> Option<BlockType> {
        let dimensions = self.context.store.dimensions();
        let position = self.chunk_position_of(global.x, global.z);
        self.context.window.chunk(position)?.try_get(
            local_coordinate(global.x, dimensions.size) as i32,
            global.y,
            local_coordinate(global.z, dimensions.size) as i32,
        )
    }

    /// Places or destroys a block.
    ///
    /// # Returns
    /// The block type that was replaced.
    pub fn set_block(
        &mut self,
        global: Point3<i32>,
        block_type: BlockType,
        sink: &mut dyn RenderSink,
    ) -> Result<BlockType, WorldError> {
        let dimensions = self.context.store.dimensions();
        if global.y < 0 || global.y >= dimensions.height as i32 {
            return Err(WorldError::OutOfWorld {
                x: global.x,
                y: global.y,
                z: global.z,
            });
        }
        let position = self.chunk_position_of(global.x, global.z);
        let slot = self
            .context
            .window
            .get_mut(position)
            .ok_or(WorldError::ChunkNotLoaded {
                chunk_x: position.x,
                chunk_z: position.z,
            })?;

        let (x, y, z) = (
            local_coordinate(global.x, dimensions.size),
            global.y as usize,
            local_coordinate(global.z, dimensions.size),
        );
        let previous = slot.chunk.get_block_at(x, y, z);
        slot.chunk.set_block_at(x, y, z, block_type);

        self.context.refresh_cell(global, true, sink);
        for side in BlockSide::all() {
            self.context.refresh_cell(global + side.offset(), false, sink);
        }
        Ok(previous)
    }

    /// Starts tracking a mob in the chunk it stands in. Mobs already saved for that chunk
    /// stay tracked alongside it.
    ///
    /// # Returns
    /// The chunk now tracking the mob.
    pub fn add_mob(&mut self, mob: MobSnapshot) -> Result<ChunkPosition, WorldError> {
        let position = self.chunk_position_of(mob.x.floor() as i32, mob.z.floor() as i32);
        self.context.tracked_mobs(position)?.push(mob);
        Ok(position)
    }

    /// Replaces the tracked mob list of a chunk. Saved mobs not yet spawned are dropped
    /// with the old list.
    pub fn set_chunk_mobs(
        &mut self,
        position: ChunkPosition,
        mobs: Vec<MobSnapshot>,
    ) -> Result<(), WorldError> {
        let slot = self
            .context
            .window
            .get_mut(position)
            .ok_or(WorldError::ChunkNotLoaded {
                chunk_x: position.x,
                chunk_z: position.z,
            })?;
        slot.mobs = Some(mobs);
        slot.unspawned_mobs = 0;
        Ok(())
    }

    /// Tracked mobs of a resident chunk; `None` if the chunk is not resident or nothing has
    /// touched its mobs yet.
    pub fn mobs_in_chunk(&self, position: ChunkPosition) -> Option<&[MobSnapshot]> {
        self.context
            .window
            .get(position)
            .and_then(|slot| slot.mobs.as_deref())
    }

    /// Persists every resident chunk without evicting anything.
    ///
    /// # Returns
    /// The number of chunks written.
    pub fn save_all(&mut self) -> Result<usize, WorldError> {
        let positions: Vec<ChunkPosition> = self
            .context
            .window
            .slots()
            .map(WindowSlot::position)
            .collect();
        for &position in &positions {
            self.context.persist(position)?;
        }
        info!("Saved {} chunks of world {}", positions.len(), self.context.world_id);
        Ok(positions.len())
    }

    /// Finishes queued work, then persists and evicts every resident chunk.
    pub fn unload_all(&mut self, sink: &mut dyn RenderSink) -> Result<usize, WorldError> {
        self.task_manager.run_until_idle(&mut self.context, sink)?;
        let positions: Vec<ChunkPosition> = self
            .context
            .window
            .slots()
            .map(WindowSlot::position)
            .collect();
        for &position in &positions {
            self.context.evict(position, sink)?;
        }
        info!("Unloaded {} chunks of world {}", positions.len(), self.context.world_id);
        Ok(positions.len())
    }
}
