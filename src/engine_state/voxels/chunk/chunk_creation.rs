//! # Chunk Creation Module
//!
//! This module provides a builder that fills a chunk one block at a time in storage
//! order (x, then y, then z fastest). It is how chunks are rebuilt from the byte stream
//! of a chunk file, and how uniform chunks are created.

use crate::engine_state::voxels::block::{block_type::BlockType, Block};

use super::{Chunk, ChunkDimensions, ChunkPosition};

/// A builder for creating and populating chunks in file order.
///
/// The builder ensures the finished chunk always holds exactly `dimensions.volume()`
/// blocks; missing trailing blocks are filled with air.
pub struct ChunkCreationIterator {
    /// The position of the chunk being created
    position: ChunkPosition,
    dimensions: ChunkDimensions,
    /// Blocks pushed so far, in storage order
    blocks: Vec<Block>,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    pub fn new(position: ChunkPosition, dimensions: ChunkDimensions) -> Self {
        ChunkCreationIterator {
            position,
            dimensions,
            blocks: Vec::with_capacity(dimensions.volume()),
        }
    }

    /// Whether every block of the volume has been pushed.
    pub fn is_complete(&self) -> bool {
        self.blocks.len() >= self.dimensions.volume()
    }

    /// Number of blocks pushed so far.
    pub fn pushed(&self) -> usize {
        self.blocks.len()
    }

    /// Adds a block at the current position and advances the position.
    ///
    /// Blocks pushed past the end of the volume are ignored.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        if self.is_complete() {
            return;
        }
        self.blocks.push(Block::new(block_type));
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    pub fn return_chunk(mut self) -> Chunk {
        self.blocks.resize(self.dimensions.volume(), Block::AIR);
        Chunk::from_blocks(self.position, self.dimensions, self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_land_in_storage_order() {
        let dims = ChunkDimensions::new(2, 3);
        let mut cci = ChunkCreationIterator::new(ChunkPosition::new(1, -1), dims);
        cci.push_block_type(BlockType::ROCK);
        cci.push_block_type(BlockType::SAND);
        assert_eq!(cci.pushed(), 2);
        assert!(!cci.is_complete());

        let chunk = cci.return_chunk();
        assert_eq!(chunk.get_block_at(0, 0, 0), BlockType::ROCK);
        assert_eq!(chunk.get_block_at(0, 0, 1), BlockType::SAND);
        assert_eq!(chunk.get_block_at(0, 1, 0), BlockType::AIR);
        assert_eq!(chunk.blocks().len(), dims.volume());
    }

    #[test]
    fn overflow_is_ignored() {
        let dims = ChunkDimensions::new(1, 1);
        let mut cci = ChunkCreationIterator::new(ChunkPosition::default(), dims);
        cci.push_block_type(BlockType::DIRT);
        cci.push_block_type(BlockType::ROCK);
        assert!(cci.is_complete());
        assert_eq!(cci.return_chunk().get_block_at(0, 0, 0), BlockType::DIRT);
    }
}
