//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the unit offset each one
//! points along. Visibility resolution and edit propagation both walk these faces.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// The four sides that may cross into a neighbouring chunk, in the order neighbour
/// snapshots are passed to the visibility resolver.
pub const LATERAL_SIDES: [BlockSide; 4] = [
    BlockSide::LEFT,
    BlockSide::RIGHT,
    BlockSide::BACK,
    BlockSide::FRONT,
];

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit offset from a block to the neighbour behind this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Position of this side in [`LATERAL_SIDES`], or `None` for the vertical faces.
    pub fn lateral_index(self) -> Option<usize> {
        match self {
            BlockSide::LEFT => Some(0),
            BlockSide::RIGHT => Some(1),
            BlockSide::BACK => Some(2),
            BlockSide::FRONT => Some(3),
            BlockSide::BOTTOM | BlockSide::TOP => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_unit_and_opposed() {
        let total = BlockSide::all()
            .iter()
            .fold(Vector3::new(0, 0, 0), |acc, side| acc + side.offset());
        assert_eq!(total, Vector3::new(0, 0, 0));
        for side in BlockSide::all() {
            let o = side.offset();
            assert_eq!(o.x.abs() + o.y.abs() + o.z.abs(), 1);
        }
    }

    #[test]
    fn lateral_indices_match_table() {
        for (index, side) in LATERAL_SIDES.iter().enumerate() {
            assert_eq!(side.lateral_index(), Some(index));
            assert_eq!(side.offset().y, 0);
        }
        assert_eq!(BlockSide::TOP.lateral_index(), None);
    }
}
