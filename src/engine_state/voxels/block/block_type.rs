//! # Block Type Module
//!
//! This module defines the closed set of materials a voxel can hold.
//!
//! The discriminants are the byte values written to chunk files. Save data from earlier
//! versions must keep loading, so **variants are only ever appended** and existing
//! ordinals never move.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The `FromPrimitive` derive provides the checked byte-to-type conversion used when
/// chunk files are read back.
#[repr(u8)]
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    AIR = 0,
    /// Bedrock-like base layer.
    ROCK = 1,
    GRAVEL = 2,
    DIRT = 3,
    /// The single grassy block capping dry land.
    TOPSOIL = 4,
    SAND = 5,
    WATER = 6,
    MAGNETITE = 7,
    ALUMINUM_ORE = 8,
    TITANIUM_ORE = 9,
    GOLD_ORE = 10,
    NOTCHIUM_ORE = 11,
    BLUE_CRYSTAL = 12,
    RED_CRYSTAL = 13,
    GREEN_CRYSTAL = 14,
    /// Trunk of the green-light trees.
    WOOD = 15,
    LEAVES = 16,
    /// Glowing bulbs hanging from green-light trees.
    GREEN_LIGHT = 17,
    SPIRAL_WOOD = 18,
    SPIRAL_LIGHT = 19,
    COLOR_WOOD = 20,
    COLOR_LEAVES = 21,
    /// Wall plating used in astronaut lairs.
    METAL_PLATE = 22,
    /// Light fitting used in astronaut lairs.
    LAMP = 23,
}

/// Number of block types. Ordinals are contiguous in `0..BLOCK_TYPE_COUNT`.
pub const BLOCK_TYPE_COUNT: usize = BlockType::LAMP as usize + 1;

/// The crystal kinds, in the order crystal plants pick from.
pub const CRYSTAL_TYPES: [BlockType; 3] = [
    BlockType::BLUE_CRYSTAL,
    BlockType::RED_CRYSTAL,
    BlockType::GREEN_CRYSTAL,
];

impl BlockType {
    /// Converts a stored byte back to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the byte is not a known ordinal.
    pub fn from_ordinal(ordinal: BlockTypeSize) -> Option<Self> {
        Self::from_u8(ordinal)
    }

    /// The byte this type is persisted as.
    pub fn ordinal(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this is one of the three crystal kinds.
    pub fn is_crystal(self) -> bool {
        CRYSTAL_TYPES.contains(&self)
    }

    /// Whether a face of a `self` block that touches `neighbor` is exposed.
    ///
    /// Water is only exposed to air and crystals; every other block is additionally
    /// exposed to water. Air is never drawn, so it is never exposed.
    pub fn is_exposed_to(self, neighbor: BlockType) -> bool {
        match self {
            BlockType::AIR => false,
            BlockType::WATER => neighbor == BlockType::AIR || neighbor.is_crystal(),
            _ => {
                neighbor == BlockType::AIR || neighbor == BlockType::WATER || neighbor.is_crystal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_contiguous_and_round_trip() {
        for ordinal in 0..BLOCK_TYPE_COUNT as u8 {
            let block_type = BlockType::from_ordinal(ordinal).unwrap();
            assert_eq!(block_type.ordinal(), ordinal);
        }
        assert_eq!(BlockType::from_ordinal(BLOCK_TYPE_COUNT as u8), None);
    }

    #[test]
    fn persisted_ordinals_are_stable() {
        assert_eq!(BlockType::AIR.ordinal(), 0);
        assert_eq!(BlockType::ROCK.ordinal(), 1);
        assert_eq!(BlockType::WATER.ordinal(), 6);
        assert_eq!(BlockType::BLUE_CRYSTAL.ordinal(), 12);
        assert_eq!(BlockType::LAMP.ordinal(), 23);
    }

    #[test]
    fn water_uses_its_own_exposure_rule() {
        assert!(BlockType::ROCK.is_exposed_to(BlockType::WATER));
        assert!(!BlockType::WATER.is_exposed_to(BlockType::WATER));
        assert!(!BlockType::WATER.is_exposed_to(BlockType::ROCK));
        assert!(BlockType::WATER.is_exposed_to(BlockType::AIR));
        assert!(BlockType::WATER.is_exposed_to(BlockType::RED_CRYSTAL));
        assert!(!BlockType::AIR.is_exposed_to(BlockType::AIR));
    }
}
