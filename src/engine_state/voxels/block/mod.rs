//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world.
//! It includes block type definitions, block face handling, and the one-byte block record
//! stored in chunk volumes.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory and on disk.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in the world.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute together with `Pod` lets a whole chunk volume be viewed
/// as the raw byte array written to chunk files, without copying.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// The type of this block, encoded as its persisted ordinal.
    block_type: BlockTypeSize,
}

impl Block {
    /// An air block.
    pub const AIR: Block = Block { block_type: 0 };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type.ordinal(),
        }
    }

    /// Raw persisted ordinal.
    pub fn ordinal(self) -> BlockTypeSize {
        self.block_type
    }

    /// The type of this block.
    ///
    /// # Panics
    /// Panics if the block was built from unchecked bytes. Chunk volumes only hold blocks
    /// created through [`Block::new`] or validated on load.
    pub fn block_type(self) -> BlockType {
        BlockType::from_ordinal(self.block_type)
            .expect("chunk volumes only hold validated block ordinals")
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}
