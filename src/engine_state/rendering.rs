//! # Rendering Seam
//!
//! The world never draws anything itself. It tells a [`RenderSink`] which blocks need a
//! visual instance and which mobs to instantiate, and the host renderer turns that into
//! GPU work.
//!
//! [`InstanceRecorder`] is a sink that simply mirrors the instance set in memory. The
//! headless driver and the tests use it to observe what a renderer would have been told.

use std::collections::HashMap;

use cgmath::Point3;

use super::voxels::{block::block_type::BlockType, chunk::ChunkPosition, mob::MobSnapshot};

/// Receiver of visual instance updates.
pub trait RenderSink {
    /// The block at `local` in `chunk` needs an instance of `block_type`, replacing any
    /// instance already there.
    fn show_block(&mut self, chunk: ChunkPosition, local: Point3<usize>, block_type: BlockType);

    /// The block at `local` in `chunk` no longer needs an instance.
    fn hide_block(&mut self, chunk: ChunkPosition, local: Point3<usize>);

    /// Drops every block instance of `chunk`.
    fn clear_chunk(&mut self, chunk: ChunkPosition);

    /// Instantiates the persisted mobs of a chunk that just became visible.
    fn spawn_mobs(&mut self, chunk: ChunkPosition, mobs: &[MobSnapshot]);
}

/// In-memory mirror of everything a renderer has been asked to show.
#[derive(Default, Debug)]
pub struct InstanceRecorder {
    instances: HashMap<ChunkPosition, HashMap<Point3<usize>, BlockType>>,
    spawned_mobs: Vec<(ChunkPosition, MobSnapshot)>,
    shows: u64,
    hides: u64,
}

impl InstanceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of block instances across all chunks.
    pub fn instance_count(&self) -> usize {
        self.instances.values().map(HashMap::len).sum()
    }

    /// Instances of one chunk, if it has any.
    pub fn chunk_instances(
        &self,
        chunk: ChunkPosition,
    ) -> Option<&HashMap<Point3<usize>, BlockType>> {
        self.instances.get(&chunk).filter(|instances| !instances.is_empty())
    }

    pub fn block_at(&self, chunk: ChunkPosition, local: Point3<usize>) -> Option<BlockType> {
        self.instances
            .get(&chunk)
            .and_then(|instances| instances.get(&local).copied())
    }

    /// Chunks with at least one instance, sorted.
    pub fn rendered_chunks(&self) -> Vec<ChunkPosition> {
        let mut chunks: Vec<ChunkPosition> = self
            .instances
            .iter()
            .filter(|(_, instances)| !instances.is_empty())
            .map(|(position, _)| *position)
            .collect();
        chunks.sort();
        chunks
    }

    pub fn spawned_mobs(&self) -> &[(ChunkPosition, MobSnapshot)] {
        &self.spawned_mobs
    }

    /// Number of `show_block` and `hide_block` calls received.
    pub fn update_counts(&self) -> (u64, u64) {
        (self.shows, self.hides)
    }
}

impl RenderSink for InstanceRecorder {
    fn show_block(&mut self, chunk: ChunkPosition, local: Point3<usize>, block_type: BlockType) {
        self.shows += 1;
        self.instances
            .entry(chunk)
            .or_default()
            .insert(local, block_type);
    }

    fn hide_block(&mut self, chunk: ChunkPosition, local: Point3<usize>) {
        self.hides += 1;
        if let Some(instances) = self.instances.get_mut(&chunk) {
            instances.remove(&local);
        }
    }

    fn clear_chunk(&mut self, chunk: ChunkPosition) {
        self.instances.remove(&chunk);
    }

    fn spawn_mobs(&mut self, chunk: ChunkPosition, mobs: &[MobSnapshot]) {
        self.spawned_mobs
            .extend(mobs.iter().map(|mob| (chunk, *mob)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_mirrors_instance_set() {
        let mut recorder = InstanceRecorder::new();
        let chunk = ChunkPosition::new(0, -1);
        recorder.show_block(chunk, Point3::new(1, 2, 3), BlockType::ROCK);
        recorder.show_block(chunk, Point3::new(1, 2, 3), BlockType::DIRT);
        recorder.show_block(chunk, Point3::new(0, 0, 0), BlockType::SAND);
        assert_eq!(recorder.instance_count(), 2);
        assert_eq!(recorder.block_at(chunk, Point3::new(1, 2, 3)), Some(BlockType::DIRT));

        recorder.hide_block(chunk, Point3::new(0, 0, 0));
        assert_eq!(recorder.instance_count(), 1);
        assert_eq!(recorder.update_counts(), (3, 1));

        recorder.clear_chunk(chunk);
        assert!(recorder.rendered_chunks().is_empty());
    }
}
