//! # Structure Templates
//!
//! Voxel templates stamped by the structure placer. Offsets are relative to the structure
//! candidate (the surface block), so `dy = 1` is the first block above ground.
//!
//! Every template fits inside a 7 block wide footprint (|dx|, |dz| <= 3), well inside the
//! default structure padding.

use crate::engine_state::voxels::block::block_type::BlockType::{
    self, COLOR_LEAVES, COLOR_WOOD, GREEN_LIGHT, LEAVES, SPIRAL_LIGHT, SPIRAL_WOOD, WOOD,
};

/// One voxel of a tree template: block type and offset `(dx, dy, dz)`.
pub type TemplateVoxel = (BlockType, i32, i32, i32);

/// Rotates a horizontal offset by `orientation` quarter turns (0, 90, 180, 270 degrees).
pub fn rotate(dx: i32, dz: i32, orientation: u8) -> (i32, i32) {
    match orientation % 4 {
        0 => (dx, dz),
        1 => (dz, -dx),
        2 => (-dx, -dz),
        _ => (-dz, dx),
    }
}

/// Crystal plant shapes. Every offset is stamped with the plant's crystal kind.
pub const CRYSTAL_TEMPLATES: &[&[(i32, i32, i32)]] = &[
    // spike
    &[(0, 1, 0), (0, 2, 0), (0, 3, 0), (0, 4, 0), (1, 1, 0)],
    // cluster
    &[
        (0, 1, 0),
        (1, 1, 0),
        (0, 1, 1),
        (-1, 1, 0),
        (0, 2, 0),
        (1, 2, 1),
        (0, 3, 0),
    ],
    // fan
    &[
        (0, 1, 0),
        (0, 2, 0),
        (1, 2, 0),
        (2, 3, 0),
        (-1, 2, 0),
        (-2, 3, 0),
        (0, 3, 0),
    ],
    // leaning pair
    &[(0, 1, 0), (1, 2, 0), (1, 3, 0), (0, 1, 1), (0, 2, 2), (0, 3, 2)],
];

const GREEN_SAPLING: &[TemplateVoxel] = &[
    (WOOD, 0, 1, 0),
    (WOOD, 0, 2, 0),
    (WOOD, 0, 3, 0),
    (WOOD, 0, 4, 0),
    (LEAVES, 0, 5, 0),
    (LEAVES, 1, 5, 0),
    (LEAVES, -1, 5, 0),
    (LEAVES, 0, 5, 1),
    (LEAVES, 0, 5, -1),
    (GREEN_LIGHT, 1, 4, 1),
    (GREEN_LIGHT, -1, 4, -1),
];

const GREEN_DROOPING: &[TemplateVoxel] = &[
    (WOOD, 0, 1, 0),
    (WOOD, 1, 1, 0),
    (WOOD, -1, 1, 0),
    (WOOD, 0, 2, 0),
    (WOOD, 0, 3, 0),
    (WOOD, 0, 4, 0),
    (WOOD, 0, 5, 0),
    (WOOD, 0, 6, 0),
    (LEAVES, 0, 7, 0),
    (LEAVES, 1, 6, 0),
    (LEAVES, -1, 6, 0),
    (LEAVES, 0, 6, 1),
    (LEAVES, 0, 6, -1),
    (LEAVES, 1, 6, 1),
    (LEAVES, -1, 6, -1),
    (LEAVES, 1, 6, -1),
    (LEAVES, -1, 6, 1),
    (LEAVES, 2, 6, 0),
    (LEAVES, -2, 6, 0),
    (LEAVES, 0, 6, 2),
    (LEAVES, 0, 6, -2),
    (GREEN_LIGHT, 2, 5, 0),
    (GREEN_LIGHT, -2, 5, 0),
    (GREEN_LIGHT, 0, 5, 2),
    (GREEN_LIGHT, 0, 5, -2),
];

const GREEN_TALL: &[TemplateVoxel] = &[
    (WOOD, 0, 1, 0),
    (WOOD, 0, 2, 0),
    (WOOD, 0, 3, 0),
    (WOOD, 0, 4, 0),
    (WOOD, 0, 5, 0),
    (WOOD, 0, 6, 0),
    (WOOD, 0, 7, 0),
    (WOOD, 0, 8, 0),
    (WOOD, 1, 5, 0),
    (WOOD, 2, 6, 0),
    (LEAVES, 2, 7, 0),
    (LEAVES, 3, 7, 0),
    (LEAVES, 2, 7, 1),
    (LEAVES, 0, 9, 0),
    (LEAVES, 1, 9, 0),
    (LEAVES, -1, 9, 0),
    (LEAVES, 0, 9, 1),
    (LEAVES, 0, 9, -1),
    (LEAVES, 0, 10, 0),
    (GREEN_LIGHT, 3, 6, 0),
    (GREEN_LIGHT, 1, 8, 1),
    (GREEN_LIGHT, -1, 8, -1),
];

const SPIRAL_SMALL: &[TemplateVoxel] = &[
    (SPIRAL_WOOD, 0, 1, 0),
    (SPIRAL_WOOD, 1, 2, 0),
    (SPIRAL_WOOD, 1, 3, 1),
    (SPIRAL_WOOD, 0, 4, 1),
    (SPIRAL_WOOD, 0, 5, 0),
    (SPIRAL_LIGHT, 0, 6, 0),
];

const SPIRAL_WIDE: &[TemplateVoxel] = &[
    (SPIRAL_WOOD, 0, 1, 0),
    (SPIRAL_WOOD, 1, 2, 0),
    (SPIRAL_WOOD, 2, 3, 0),
    (SPIRAL_WOOD, 2, 4, 1),
    (SPIRAL_WOOD, 2, 5, 2),
    (SPIRAL_WOOD, 1, 6, 2),
    (SPIRAL_WOOD, 0, 7, 2),
    (SPIRAL_WOOD, -1, 8, 1),
    (SPIRAL_WOOD, -1, 9, 0),
    (SPIRAL_LIGHT, -1, 10, 0),
    (SPIRAL_LIGHT, 0, 10, 0),
    (SPIRAL_LIGHT, -1, 10, -1),
];

const SPIRAL_DOUBLE: &[TemplateVoxel] = &[
    (SPIRAL_WOOD, 0, 1, 0),
    (SPIRAL_WOOD, 0, 2, 0),
    (SPIRAL_WOOD, 1, 3, 0),
    (SPIRAL_WOOD, -1, 3, 0),
    (SPIRAL_WOOD, 1, 4, 1),
    (SPIRAL_WOOD, -1, 4, -1),
    (SPIRAL_WOOD, 0, 5, 1),
    (SPIRAL_WOOD, 0, 5, -1),
    (SPIRAL_WOOD, -1, 6, 1),
    (SPIRAL_WOOD, 1, 6, -1),
    (SPIRAL_LIGHT, -1, 7, 1),
    (SPIRAL_LIGHT, 1, 7, -1),
];

const COLOR_ROUND: &[TemplateVoxel] = &[
    (COLOR_WOOD, 0, 1, 0),
    (COLOR_WOOD, 0, 2, 0),
    (COLOR_WOOD, 0, 3, 0),
    (COLOR_LEAVES, 0, 4, 0),
    (COLOR_LEAVES, 1, 4, 0),
    (COLOR_LEAVES, -1, 4, 0),
    (COLOR_LEAVES, 0, 4, 1),
    (COLOR_LEAVES, 0, 4, -1),
    (COLOR_LEAVES, 1, 4, 1),
    (COLOR_LEAVES, -1, 4, -1),
    (COLOR_LEAVES, 1, 4, -1),
    (COLOR_LEAVES, -1, 4, 1),
    (COLOR_LEAVES, 0, 5, 0),
    (COLOR_LEAVES, 1, 5, 0),
    (COLOR_LEAVES, -1, 5, 0),
    (COLOR_LEAVES, 0, 5, 1),
    (COLOR_LEAVES, 0, 5, -1),
    (COLOR_LEAVES, 0, 6, 0),
];

const COLOR_BUSH: &[TemplateVoxel] = &[
    (COLOR_WOOD, 0, 1, 0),
    (COLOR_LEAVES, 1, 1, 0),
    (COLOR_LEAVES, -1, 1, 0),
    (COLOR_LEAVES, 0, 1, 1),
    (COLOR_LEAVES, 0, 1, -1),
    (COLOR_LEAVES, 0, 2, 0),
    (COLOR_LEAVES, 1, 2, 1),
    (COLOR_LEAVES, -1, 2, -1),
];

const COLOR_CANOPY: &[TemplateVoxel] = &[
    (COLOR_WOOD, 0, 1, 0),
    (COLOR_WOOD, 0, 2, 0),
    (COLOR_WOOD, 0, 3, 0),
    (COLOR_WOOD, 0, 4, 0),
    (COLOR_WOOD, 0, 5, 0),
    (COLOR_WOOD, 1, 6, 0),
    (COLOR_WOOD, -1, 6, 0),
    (COLOR_LEAVES, 0, 6, 0),
    (COLOR_LEAVES, 2, 7, 0),
    (COLOR_LEAVES, 1, 7, 0),
    (COLOR_LEAVES, 0, 7, 0),
    (COLOR_LEAVES, -1, 7, 0),
    (COLOR_LEAVES, -2, 7, 0),
    (COLOR_LEAVES, 0, 7, 1),
    (COLOR_LEAVES, 0, 7, -1),
    (COLOR_LEAVES, 1, 7, 1),
    (COLOR_LEAVES, -1, 7, -1),
    (COLOR_LEAVES, 3, 6, 0),
    (COLOR_LEAVES, -3, 6, 0),
];

/// Tree shapes grouped by family: green-light, spiral-light, color-wood.
pub const TREE_FAMILIES: [&[&[TemplateVoxel]]; 3] = [
    &[GREEN_SAPLING, GREEN_DROOPING, GREEN_TALL],
    &[SPIRAL_SMALL, SPIRAL_WIDE, SPIRAL_DOUBLE],
    &[COLOR_ROUND, COLOR_BUSH, COLOR_CANOPY],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_a_quarter_turn_group() {
        for (dx, dz) in [(1, 0), (2, -3), (0, 1)] {
            let mut p = (dx, dz);
            for _ in 0..4 {
                p = rotate(p.0, p.1, 1);
            }
            assert_eq!(p, (dx, dz));
            assert_eq!(rotate(dx, dz, 2), (-dx, -dz));
        }
    }

    #[test]
    fn templates_fit_the_footprint() {
        let tree_offsets = TREE_FAMILIES
            .iter()
            .flat_map(|family| family.iter())
            .flat_map(|template| template.iter())
            .map(|&(_, dx, dy, dz)| (dx, dy, dz));
        let crystal_offsets = CRYSTAL_TEMPLATES.iter().flat_map(|t| t.iter().copied());
        for (dx, dy, dz) in tree_offsets.chain(crystal_offsets) {
            assert!(dx.abs() <= 3 && dz.abs() <= 3, "({dx}, {dy}, {dz})");
            assert!((1..=12).contains(&dy));
        }
    }
}
