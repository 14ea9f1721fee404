//! # Chunk Iteration Module
//!
//! This module provides an iterator over all non-air blocks in a chunk, yielding each
//! block's local position alongside its type. Visibility resolution only ever asks about
//! blocks that exist, so skipping air here keeps whole-chunk passes cheap.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};

use super::Chunk;

/// An iterator over all non-air blocks in a chunk, in storage order.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next flat index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block = blocks[offset];
            if block == Block::AIR {
                continue;
            }

            let position = self.chunk_ref.dimensions().position_of(offset);
            return Some((position, block.block_type()));
        }
        None
    }
}

impl Chunk {
    /// Iterates the non-air blocks of this chunk.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine_state::voxels::chunk::{ChunkDimensions, ChunkPosition};

    use super::*;

    #[test]
    fn skips_air_and_reports_positions() {
        let mut chunk = Chunk::empty(ChunkPosition::default(), ChunkDimensions::new(4, 4));
        chunk.set_block_at(1, 2, 3, BlockType::GOLD_ORE);
        chunk.set_block_at(3, 0, 0, BlockType::WATER);

        let found: Vec<_> = chunk.solid_blocks().collect();
        assert_eq!(
            found,
            vec![
                (Point3::new(1, 2, 3), BlockType::GOLD_ORE),
                (Point3::new(3, 0, 0), BlockType::WATER),
            ]
        );
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::empty(ChunkPosition::default(), ChunkDimensions::new(2, 2));
        assert_eq!(chunk.solid_blocks().count(), 0);
    }
}
