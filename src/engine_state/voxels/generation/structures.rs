//! # Structure Placer
//!
//! Decorates a freshly generated chunk with ore veins, the occasional astronaut lair,
//! crystal plants and trees, all rooted at structure candidates recorded by the terrain
//! generator.
//!
//! ## Determinism
//!
//! Every random decision comes from a `fastrand::Rng` seeded from the world seed and the
//! chunk coordinates alone. The generator is created per chunk and dropped afterwards, so
//! the result never depends on which chunks were generated before or on any other RNG
//! consumer in the process.
//!
//! ## Bounds
//!
//! Stamps are rooted away from the chunk edges, but every write is still bounds-checked;
//! voxels that would land outside the chunk are skipped and counted in the report.

use fastrand::Rng;
use log::debug;

use crate::{
    config::GenerationParams,
    engine_state::voxels::{
        block::block_type::{BlockType, CRYSTAL_TYPES},
        chunk::{Chunk, ChunkPosition},
    },
};

use super::{
    templates::{rotate, CRYSTAL_TEMPLATES, TREE_FAMILIES},
    terrain::StructureCandidate,
};

pub const TREE_CHANCE: f32 = 0.5;
pub const LAIR_CHANCE: f32 = 0.01;
pub const CRYSTAL_PLANT_CHANCE: f32 = 0.1;

/// Lair shaft half width; the shaft is `2 * LAIR_HALF_WIDTH + 1` blocks across.
const LAIR_HALF_WIDTH: i32 = 3;
/// Distance from the lair centre to each decorated wall.
const LAIR_WALL_OFFSET: i32 = 4;
const LAIR_HEADROOM: i32 = 6;
const LAIR_DEPTH: i32 = 26;
/// Every n-th wall row is a lamp instead of plating.
const LAIR_LAMP_INTERVAL: i32 = 8;

/// Ore kinds with their weights, in percent.
const ORE_TABLE: [(BlockType, u32); 6] = [
    (BlockType::MAGNETITE, 33),
    (BlockType::ALUMINUM_ORE, 25),
    (BlockType::TITANIUM_ORE, 17),
    (BlockType::GOLD_ORE, 13),
    (BlockType::NOTCHIUM_ORE, 8),
    (BlockType::BLUE_CRYSTAL, 4),
];

/// Vein walk steps: sideways or down, never up.
const VEIN_STEPS: [(i32, i32, i32); 5] = [(1, 0, 0), (-1, 0, 0), (0, 0, 1), (0, 0, -1), (0, -1, 0)];

/// What the placer did to a chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub veins: usize,
    pub ore_blocks: usize,
    pub lair: bool,
    pub crystal_plant: bool,
    pub trees: usize,
    /// Voxels dropped because they fell outside the chunk.
    pub skipped_out_of_bounds: usize,
}

/// Seed of the per-chunk structure RNG.
///
/// The 64-bit world seed is folded to 32 bits by xoring its halves, then mixed with the
/// chunk coordinates.
pub fn structure_seed(world_seed: u64, position: ChunkPosition) -> i32 {
    let folded = ((world_seed >> 32) ^ (world_seed & 0xFFFF_FFFF)) as u32 as i32;
    folded ^ position.x ^ position.z
}

#[derive(Clone, Debug)]
pub struct StructurePlacer {
    seed: u64,
    tree_chance: f32,
    lair_chance: f32,
    crystal_chance: f32,
}

impl StructurePlacer {
    pub fn new(seed: u64, params: &GenerationParams) -> Self {
        Self {
            seed,
            tree_chance: (TREE_CHANCE * params.tree_cover).min(1.0),
            lair_chance: (LAIR_CHANCE * params.exotic_terrain).min(1.0),
            crystal_chance: (CRYSTAL_PLANT_CHANCE * params.exotic_terrain).min(1.0),
        }
    }

    /// Decorates `chunk`. Lairs, crystal plants and trees each consume the candidate they
    /// are rooted at; veins do not.
    pub fn place(
        &self,
        chunk: &mut Chunk,
        candidates: &mut Vec<StructureCandidate>,
    ) -> PlacementReport {
        let mut rng = Rng::with_seed(structure_seed(self.seed, chunk.position) as u32 as u64);
        let mut report = PlacementReport::default();

        self.place_veins(chunk, candidates, &mut rng, &mut report);

        if rng.f32() < self.lair_chance && !candidates.is_empty() {
            let candidate = candidates.swap_remove(rng.usize(..candidates.len()));
            self.carve_lair(chunk, candidate, &mut report);
        }

        if rng.f32() < self.crystal_chance && !candidates.is_empty() {
            let candidate = candidates.swap_remove(rng.usize(..candidates.len()));
            self.grow_crystal_plant(chunk, candidate, &mut rng, &mut report);
        }

        if rng.f32() < self.tree_chance {
            let count = rng.usize(2..=6);
            for _ in 0..count {
                if candidates.is_empty() {
                    break;
                }
                let candidate = candidates.swap_remove(rng.usize(..candidates.len()));
                self.grow_tree(chunk, candidate, &mut rng, &mut report);
            }
        }

        debug!(
            "Placed structures in chunk {}: {} veins, lair: {}, crystal: {}, {} trees",
            chunk.position, report.veins, report.lair, report.crystal_plant, report.trees
        );
        report
    }

    fn place_veins(
        &self,
        chunk: &mut Chunk,
        candidates: &[StructureCandidate],
        rng: &mut Rng,
        report: &mut PlacementReport,
    ) {
        let roll = rng.f32();
        let vein_count = if roll < 0.7 {
            1
        } else if roll < 0.9 {
            2
        } else {
            3
        };
        if candidates.is_empty() {
            return;
        }

        for _ in 0..vein_count {
            let start = candidates[rng.usize(..candidates.len())];
            let ore = pick_ore(rng);
            let size = match ore {
                BlockType::MAGNETITE | BlockType::ALUMINUM_ORE | BlockType::TITANIUM_ORE => {
                    rng.usize(2..=6)
                }
                _ => rng.usize(1..=4),
            };
            report.ore_blocks += grow_vein(chunk, start, ore, size, rng);
            report.veins += 1;
        }
    }

    fn carve_lair(
        &self,
        chunk: &mut Chunk,
        centre: StructureCandidate,
        report: &mut PlacementReport,
    ) {
        report.lair = true;
        let floor = centre.y - LAIR_DEPTH;

        for dx in -LAIR_HALF_WIDTH..=LAIR_HALF_WIDTH {
            for dz in -LAIR_HALF_WIDTH..=LAIR_HALF_WIDTH {
                for y in floor..=centre.y + LAIR_HEADROOM {
                    if !chunk.try_set(centre.x + dx, y, centre.z + dz, BlockType::AIR) {
                        report.skipped_out_of_bounds += 1;
                    }
                }
            }
        }

        let wall_cell = |wall: usize, t: i32| match wall {
            0 => (centre.x - LAIR_WALL_OFFSET, centre.z + t),
            1 => (centre.x + LAIR_WALL_OFFSET, centre.z + t),
            2 => (centre.x + t, centre.z - LAIR_WALL_OFFSET),
            _ => (centre.x + t, centre.z + LAIR_WALL_OFFSET),
        };

        let mut active = [true; 4];
        let mut y = floor.max(0);
        let height = chunk.dimensions().height as i32;
        while active.iter().any(|&a| a) && y < height {
            let row = y - floor;
            let block_type = if row % LAIR_LAMP_INTERVAL == LAIR_LAMP_INTERVAL - 1 {
                BlockType::LAMP
            } else {
                BlockType::METAL_PLATE
            };

            for (wall, wall_active) in active.iter_mut().enumerate() {
                if !*wall_active {
                    continue;
                }
                let bordered = (-LAIR_HALF_WIDTH..=LAIR_HALF_WIDTH).all(|t| {
                    let (x, z) = wall_cell(wall, t);
                    matches!(chunk.try_get(x, y, z), Some(b) if b != BlockType::AIR)
                });
                if !bordered {
                    *wall_active = false;
                    continue;
                }
                for t in -LAIR_HALF_WIDTH..=LAIR_HALF_WIDTH {
                    let (x, z) = wall_cell(wall, t);
                    chunk.try_set(x, y, z, block_type);
                }
            }
            y += 1;
        }
    }

    fn grow_crystal_plant(
        &self,
        chunk: &mut Chunk,
        root: StructureCandidate,
        rng: &mut Rng,
        report: &mut PlacementReport,
    ) {
        let crystal = CRYSTAL_TYPES[rng.usize(..CRYSTAL_TYPES.len())];
        let orientation = rng.u8(..4);
        let template = CRYSTAL_TEMPLATES[rng.usize(..CRYSTAL_TEMPLATES.len())];

        for &(dx, dy, dz) in template {
            let (rx, rz) = rotate(dx, dz, orientation);
            if !chunk.try_set(root.x + rx, root.y + dy, root.z + rz, crystal) {
                report.skipped_out_of_bounds += 1;
            }
        }
        report.crystal_plant = true;
    }

    fn grow_tree(
        &self,
        chunk: &mut Chunk,
        root: StructureCandidate,
        rng: &mut Rng,
        report: &mut PlacementReport,
    ) {
        let family = TREE_FAMILIES[rng.usize(..TREE_FAMILIES.len())];
        let template = family[rng.usize(..family.len())];
        let orientation = rng.u8(..4);

        for &(block_type, dx, dy, dz) in template {
            let (rx, rz) = rotate(dx, dz, orientation);
            let (x, y, z) = (root.x + rx, root.y + dy, root.z + rz);
            // Overhanging first-row voxels are dropped when the ground falls away under them.
            if dy == 1 && chunk.try_get(x, y - 1, z) == Some(BlockType::AIR) {
                continue;
            }
            if !chunk.try_set(x, y, z, block_type) {
                report.skipped_out_of_bounds += 1;
            }
        }
        report.trees += 1;
    }
}

fn pick_ore(rng: &mut Rng) -> BlockType {
    let mut roll = rng.u32(..100);
    for (ore, weight) in ORE_TABLE {
        if roll < weight {
            return ore;
        }
        roll -= weight;
    }
    BlockType::MAGNETITE
}

/// Random-walks a vein of `size` steps from `start`, turning topsoil and sand into `ore`.
///
/// # Returns
/// The number of blocks converted.
pub(crate) fn grow_vein(
    chunk: &mut Chunk,
    start: StructureCandidate,
    ore: BlockType,
    size: usize,
    rng: &mut Rng,
) -> usize {
    let (mut x, mut y, mut z) = (start.x, start.y, start.z);
    let mut converted = 0;
    for _ in 0..size {
        if matches!(
            chunk.try_get(x, y, z),
            Some(BlockType::TOPSOIL | BlockType::SAND)
        ) {
            chunk.try_set(x, y, z, ore);
            converted += 1;
        }
        let (dx, dy, dz) = VEIN_STEPS[rng.usize(..VEIN_STEPS.len())];
        x += dx;
        y += dy;
        z += dz;
    }
    converted
}

#[cfg(test)]
mod tests {
    use crate::engine_state::voxels::chunk::ChunkDimensions;

    use super::*;

    const DIMS: ChunkDimensions = ChunkDimensions::new(32, 64);

    /// Flat ground: rock up to y = 30, topsoil at 30, air above.
    fn flat_chunk(position: ChunkPosition) -> (Chunk, Vec<StructureCandidate>) {
        let mut chunk = Chunk::empty(position, DIMS);
        let mut candidates = Vec::new();
        for x in 0..32 {
            for z in 0..32 {
                for y in 0..30 {
                    chunk.set_block_at(x, y, z, BlockType::ROCK);
                }
                chunk.set_block_at(x, 30, z, BlockType::TOPSOIL);
                if (11..21).contains(&x) && (11..21).contains(&z) {
                    candidates.push(StructureCandidate::new(x as i32, 30, z as i32));
                }
            }
        }
        (chunk, candidates)
    }

    #[test]
    fn structure_seed_folds_halves_and_mixes_coordinates() {
        let seed = 0x0000_0001_0000_0003;
        assert_eq!(structure_seed(seed, ChunkPosition::new(0, 0)), 2);
        assert_eq!(structure_seed(seed, ChunkPosition::new(4, 0)), 6);
        assert_eq!(structure_seed(seed, ChunkPosition::new(-1, 0)), !2);
    }

    #[test]
    fn placement_is_deterministic_per_chunk() {
        let placer = StructurePlacer::new(42, &GenerationParams::default());
        let position = ChunkPosition::new(3, -2);

        let (mut a, mut ca) = flat_chunk(position);
        let report_a = placer.place(&mut a, &mut ca);

        // Unrelated RNG traffic must not leak into placement.
        for _ in 0..100 {
            fastrand::u64(..);
        }
        let (mut other, mut co) = flat_chunk(ChunkPosition::new(9, 9));
        placer.place(&mut other, &mut co);

        let (mut b, mut cb) = flat_chunk(position);
        let report_b = placer.place(&mut b, &mut cb);

        assert_eq!(report_a, report_b);
        assert!(a == b);
        assert_eq!(ca, cb);
    }

    #[test]
    fn veins_only_replace_topsoil_and_sand() {
        let mut chunk = Chunk::empty(ChunkPosition::default(), DIMS);
        // A patchwork around the start: topsoil, sand, rock, existing ore and air.
        let kinds = [
            BlockType::TOPSOIL,
            BlockType::SAND,
            BlockType::ROCK,
            BlockType::GOLD_ORE,
            BlockType::AIR,
        ];
        for x in 8..24 {
            for z in 8..24 {
                for y in 10..20 {
                    chunk.set_block_at(x, y, z, kinds[(x + y * 3 + z * 7) % kinds.len()]);
                }
            }
        }
        let before = chunk.clone();

        let mut rng = Rng::with_seed(17);
        for _ in 0..200 {
            let start = StructureCandidate::new(rng.i32(10..22), rng.i32(12..20), rng.i32(10..22));
            grow_vein(&mut chunk, start, BlockType::TITANIUM_ORE, 6, &mut rng);
        }

        let dims = chunk.dimensions();
        let mut converted = 0;
        for index in 0..dims.volume() {
            let p = dims.position_of(index);
            let old = before.get_block_at(p.x, p.y, p.z);
            let new = chunk.get_block_at(p.x, p.y, p.z);
            if old != new {
                assert_eq!(new, BlockType::TITANIUM_ORE);
                assert!(matches!(old, BlockType::TOPSOIL | BlockType::SAND), "{old:?}");
                converted += 1;
            }
        }
        assert!(converted > 0);
    }

    #[test]
    fn veins_never_climb() {
        let mut chunk = Chunk::filled(ChunkPosition::default(), DIMS, BlockType::SAND);
        let mut rng = Rng::with_seed(3);
        grow_vein(
            &mut chunk,
            StructureCandidate::new(16, 40, 16),
            BlockType::MAGNETITE,
            50,
            &mut rng,
        );
        for x in 0..32 {
            for z in 0..32 {
                for y in 41..64 {
                    assert_eq!(chunk.get_block_at(x, y, z), BlockType::SAND);
                }
            }
        }
    }

    #[test]
    fn lair_carves_shaft_and_plates_walls() {
        let placer = StructurePlacer::new(0, &GenerationParams::default());
        let (mut chunk, _) = flat_chunk(ChunkPosition::default());
        let mut report = PlacementReport::default();
        let centre = StructureCandidate::new(16, 30, 16);
        placer.carve_lair(&mut chunk, centre, &mut report);

        assert!(report.lair);
        for y in 4..=36 {
            assert_eq!(chunk.get_block_at(16, y, 16), BlockType::AIR);
            assert_eq!(chunk.get_block_at(13, y, 19), BlockType::AIR);
        }
        // Walls run from the floor up to the last solid row below the surface air.
        assert_eq!(chunk.get_block_at(12, 4, 16), BlockType::METAL_PLATE);
        assert_eq!(chunk.get_block_at(16, 11, 20), BlockType::LAMP);
        assert_eq!(chunk.get_block_at(20, 30, 13), BlockType::METAL_PLATE);
        assert_eq!(chunk.get_block_at(16, 31, 12), BlockType::AIR);
        // Outside the walls the terrain is untouched.
        assert_eq!(chunk.get_block_at(11, 10, 16), BlockType::ROCK);
    }

    #[test]
    fn out_of_bounds_stamps_are_skipped() {
        let placer = StructurePlacer::new(0, &GenerationParams::default());
        let mut chunk = Chunk::filled(ChunkPosition::default(), DIMS, BlockType::ROCK);
        let mut report = PlacementReport::default();
        let mut rng = Rng::with_seed(1);
        // Rooted on the very top row: everything above is outside the chunk.
        placer.grow_tree(&mut chunk, StructureCandidate::new(0, 63, 0), &mut rng, &mut report);
        assert!(report.skipped_out_of_bounds > 0);
        assert_eq!(chunk.get_block_at(0, 63, 0), BlockType::ROCK);
    }

    #[test]
    fn tree_first_row_skips_overhangs() {
        let placer = StructurePlacer::new(0, &GenerationParams::default());
        let mut chunk = Chunk::empty(ChunkPosition::default(), DIMS);
        // A single pillar of ground under the root, air everywhere around it.
        for y in 0..=20 {
            chunk.set_block_at(16, y, 16, BlockType::DIRT);
        }
        let mut rng = Rng::with_seed(8);
        let mut report = PlacementReport::default();
        for _ in 0..20 {
            placer.grow_tree(
                &mut chunk,
                StructureCandidate::new(16, 20, 16),
                &mut rng,
                &mut report,
            );
        }
        for x in 0..32 {
            for z in 0..32 {
                if (x, z) != (16, 16) {
                    assert_eq!(chunk.get_block_at(x, 21, z), BlockType::AIR);
                }
            }
        }
        assert_ne!(chunk.get_block_at(16, 21, 16), BlockType::AIR);
    }

    #[test]
    fn tunables_can_disable_exotics_and_trees() {
        let params = GenerationParams {
            tree_cover: 0.0,
            exotic_terrain: 0.0,
            ..GenerationParams::default()
        };
        let placer = StructurePlacer::new(11, &params);
        for x in 0..20 {
            let (mut chunk, mut candidates) = flat_chunk(ChunkPosition::new(x, 0));
            let report = placer.place(&mut chunk, &mut candidates);
            assert_eq!(report.trees, 0);
            assert!(!report.lair && !report.crystal_plant);
            assert!(report.veins >= 1);
            assert_eq!(candidates.len(), 100);
        }
    }
}
