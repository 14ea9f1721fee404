//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! columns of voxel data `size x height x size` blocks large.
//!
//! ## Storage
//!
//! A chunk is one flat buffer of one-byte [`Block`] records. The index of local
//! coordinate `(x, y, z)` is `(x * height + y) * size + z`, so z varies fastest, then y,
//! then x. This is also the byte order of chunk files, which lets the store write the
//! buffer out directly.
//!
//! ## Coordinates
//!
//! Global block coordinates map to chunk coordinates with a true floor division, so
//! global `-1` lives in chunk `-1` at local `size - 1`. Local coordinates are always
//! non-negative.

use std::fmt;

use cgmath::Point3;
use chunk_creation::ChunkCreationIterator;

use super::block::{block_type::BlockType, Block};

pub mod chunk_creation;
pub mod chunk_iteration;

/// Horizontal position of a chunk, in chunk coordinates (not block coordinates).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk holding the global block column `(x, z)`.
    pub fn containing(global_x: i32, global_z: i32, chunk_size: usize) -> Self {
        Self {
            x: chunk_coordinate(global_x, chunk_size),
            z: chunk_coordinate(global_z, chunk_size),
        }
    }

    /// Offsets this position by whole chunks.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Chebyshev distance in chunks, the metric the streaming window is laid out in.
    pub fn ring_distance(self, other: ChunkPosition) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// Global coordinate of this chunk's local `(0, _, 0)` block.
    pub fn block_origin(self, chunk_size: usize) -> (i32, i32) {
        let size = chunk_size as i32;
        (self.x * size, self.z * size)
    }
}

impl fmt::Display for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Chunk coordinate of a global block coordinate (floor division).
pub fn chunk_coordinate(global: i32, chunk_size: usize) -> i32 {
    global.div_euclid(chunk_size as i32)
}

/// Local coordinate of a global block coordinate, always in `[0, chunk_size)`.
pub fn local_coordinate(global: i32, chunk_size: usize) -> usize {
    global.rem_euclid(chunk_size as i32) as usize
}

/// Size of one chunk volume in blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDimensions {
    /// Width and depth.
    pub size: usize,
    /// Height.
    pub height: usize,
}

impl ChunkDimensions {
    pub const fn new(size: usize, height: usize) -> Self {
        Self { size, height }
    }

    /// Number of blocks in a chunk; also the byte length of a chunk file.
    pub const fn volume(&self) -> usize {
        self.size * self.size * self.height
    }

    /// Flat index of a local coordinate. Coordinates must be in range.
    #[inline]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.height + y) * self.size + z
    }

    /// Inverse of [`ChunkDimensions::index`].
    pub const fn position_of(&self, index: usize) -> Point3<usize> {
        let z = index % self.size;
        let y = (index / self.size) % self.height;
        let x = index / (self.size * self.height);
        Point3::new(x, y, z)
    }

    /// Whether a signed local coordinate lies inside the volume.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.size
            && (y as usize) < self.height
            && (z as usize) < self.size
    }
}

/// A dense `size x height x size` volume of blocks.
///
/// Chunks are moved, never shared: a chunk belongs to whichever window slot holds it,
/// or to the task that is building it.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub position: ChunkPosition,
    dimensions: ChunkDimensions,
    blocks: Vec<Block>,
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("position", &self.position)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn empty(position: ChunkPosition, dimensions: ChunkDimensions) -> Self {
        Self::filled(position, dimensions, BlockType::AIR)
    }

    /// Creates a chunk with every block set to `block_type`.
    pub fn filled(
        position: ChunkPosition,
        dimensions: ChunkDimensions,
        block_type: BlockType,
    ) -> Self {
        let mut cci = ChunkCreationIterator::new(position, dimensions);
        while !cci.is_complete() {
            cci.push_block_type(block_type);
        }
        cci.return_chunk()
    }

    /// Wraps an existing buffer. The buffer length must equal the dimension volume.
    pub(crate) fn from_blocks(
        position: ChunkPosition,
        dimensions: ChunkDimensions,
        blocks: Vec<Block>,
    ) -> Self {
        debug_assert_eq!(blocks.len(), dimensions.volume());
        Chunk {
            position,
            dimensions,
            blocks,
        }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// The raw block buffer in file order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The block buffer viewed as the bytes of a chunk file.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// Gets the block type at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get_block_at(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[self.dimensions.index(x, y, z)].block_type()
    }

    /// Sets the block type at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn set_block_at(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        let index = self.dimensions.index(x, y, z);
        self.blocks[index] = Block::new(block_type);
    }

    /// Bounds-checked read with signed coordinates.
    pub fn try_get(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        if self.dimensions.contains(x, y, z) {
            Some(self.get_block_at(x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    /// Bounds-checked write with signed coordinates.
    ///
    /// # Returns
    /// `false`, leaving the chunk untouched, if the position is outside the volume.
    pub fn try_set(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        if !self.dimensions.contains(x, y, z) {
            return false;
        }
        self.set_block_at(x as usize, y as usize, z as usize, block_type);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_handles_negative_globals() {
        let size = 64;
        assert_eq!(chunk_coordinate(-1, size), -1);
        assert_eq!(chunk_coordinate(-64, size), -1);
        assert_eq!(chunk_coordinate(-65, size), -2);
        assert_eq!(chunk_coordinate(0, size), 0);
        assert_eq!(chunk_coordinate(63, size), 0);
        assert_eq!(chunk_coordinate(64, size), 1);

        assert_eq!(local_coordinate(-1, size), 63);
        assert_eq!(local_coordinate(-64, size), 0);
        for global in -300..300 {
            let local = local_coordinate(global, size);
            assert!(local < size);
            assert_eq!(
                chunk_coordinate(global, size) * size as i32 + local as i32,
                global
            );
        }
    }

    #[test]
    fn index_orders_z_fastest_then_y_then_x() {
        let dims = ChunkDimensions::new(4, 8);
        assert_eq!(dims.index(0, 0, 1), 1);
        assert_eq!(dims.index(0, 1, 0), 4);
        assert_eq!(dims.index(1, 0, 0), 32);
        assert_eq!(dims.index(3, 7, 3), dims.volume() - 1);
        for index in [0, 5, 17, 63, 127] {
            let p = dims.position_of(index);
            assert_eq!(dims.index(p.x, p.y, p.z), index);
        }
    }

    #[test]
    fn checked_access_rejects_out_of_range() {
        let dims = ChunkDimensions::new(4, 8);
        let mut chunk = Chunk::empty(ChunkPosition::new(0, 0), dims);
        assert!(chunk.try_set(3, 7, 3, BlockType::ROCK));
        assert_eq!(chunk.try_get(3, 7, 3), Some(BlockType::ROCK));
        assert!(!chunk.try_set(4, 0, 0, BlockType::ROCK));
        assert!(!chunk.try_set(0, -1, 0, BlockType::ROCK));
        assert_eq!(chunk.try_get(0, 8, 0), None);
        assert_eq!(chunk.as_bytes()[dims.index(3, 7, 3)], BlockType::ROCK.ordinal());
    }

    #[test]
    fn containing_uses_floor_division() {
        assert_eq!(ChunkPosition::containing(-1, 64, 64), ChunkPosition::new(-1, 1));
        assert_eq!(ChunkPosition::new(-1, 1).block_origin(64), (-64, 64));
        assert_eq!(
            ChunkPosition::new(2, -3).ring_distance(ChunkPosition::new(0, 0)),
            3
        );
    }
}
