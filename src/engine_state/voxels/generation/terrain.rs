//! # Terrain Generator
//!
//! Fills a chunk column by column from four heightmaps stacked on top of each other:
//! rock, gravel, dirt and sand. Columns whose dirt stays below the ground level are
//! topped with sand and flooded up to the ground level; all other columns get a single
//! topsoil block. The top sand or topsoil block of every column away from the chunk edge
//! becomes a structure candidate.

use crate::{
    config::{GenerationParams, WorldConfig},
    engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, ChunkDimensions},
    },
};

use super::noise_field::{NoiseField, NoiseLayer};

/// Rock always reaches at least this height.
pub const BASE_ROCK_HEIGHT: i32 = 50;

pub const ROCK_LAYER: NoiseLayer = NoiseLayer::new(16.0, 0.4, 0.4, 4);
pub const GRAVEL_LAYER: NoiseLayer = NoiseLayer::new(4.0, 0.4, 0.6, 2);
pub const DIRT_LAYER: NoiseLayer = NoiseLayer::new(3.0, 0.4, 0.4, 2);
pub const SAND_LAYER: NoiseLayer = NoiseLayer::new(2.0, 0.4, 0.8, 2);

/// A surface position, in local chunk coordinates, where a structure may be rooted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructureCandidate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl StructureCandidate {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Heights of the layer boundaries in one column. Each band is `[previous top, top)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnProfile {
    pub rock_top: i32,
    pub gravel_top: i32,
    pub dirt_top: i32,
    pub sand_height: i32,
}

/// Produces the base terrain of a chunk. Holds no mutable state, so a generator can be
/// shared by every chunk of a world.
#[derive(Clone)]
pub struct TerrainGenerator {
    noise: NoiseField,
    dimensions: ChunkDimensions,
    ground_level: i32,
    structure_padding: i32,
    rock_layer: NoiseLayer,
}

impl TerrainGenerator {
    pub fn new(config: &WorldConfig) -> Self {
        Self::with_params(
            config.seed,
            config.dimensions(),
            config.ground_level,
            config.structure_padding,
            &config.generation,
        )
    }

    pub fn with_params(
        seed: u64,
        dimensions: ChunkDimensions,
        ground_level: i32,
        structure_padding: i32,
        params: &GenerationParams,
    ) -> Self {
        Self {
            noise: NoiseField::new(seed),
            dimensions,
            ground_level,
            structure_padding,
            rock_layer: ROCK_LAYER.scaled(params.terrain_roughness as f64),
        }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Fills every column of `chunk` and returns the structure candidates, at most one
    /// per column.
    pub fn generate(&self, chunk: &mut Chunk) -> Vec<StructureCandidate> {
        let size = self.dimensions.size;
        let mut candidates = Vec::new();
        for x in 0..size {
            for z in 0..size {
                if let Some(candidate) = self.generate_column(chunk, x, z) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    /// Layer boundaries of a global column.
    pub fn column_profile(&self, global_x: i32, global_z: i32) -> ColumnProfile {
        let height = self.dimensions.height as i32;
        let rock = self.noise.height(global_x, global_z, self.rock_layer);
        let gravel = self.noise.height(global_x, global_z, GRAVEL_LAYER);
        let dirt = self.noise.height(global_x, global_z, DIRT_LAYER);
        let sand = self.noise.height(global_x, global_z, SAND_LAYER);

        let rock_top = (BASE_ROCK_HEIGHT + rock).clamp(0, height);
        let gravel_top = (rock_top + gravel).clamp(rock_top, height);
        let dirt_top = (gravel_top + dirt).clamp(gravel_top, height);
        ColumnProfile {
            rock_top,
            gravel_top,
            dirt_top,
            sand_height: sand.max(0),
        }
    }

    /// Fills one column at local `(x, z)`.
    pub fn generate_column(
        &self,
        chunk: &mut Chunk,
        x: usize,
        z: usize,
    ) -> Option<StructureCandidate> {
        let height = self.dimensions.height as i32;
        let (origin_x, origin_z) = chunk.position.block_origin(self.dimensions.size);
        let profile = self.column_profile(origin_x + x as i32, origin_z + z as i32);

        let mut fill = |from: i32, to: i32, block_type: BlockType| {
            for y in from.max(0)..to.min(height) {
                chunk.set_block_at(x, y as usize, z, block_type);
            }
        };

        fill(0, profile.rock_top, BlockType::ROCK);
        fill(profile.rock_top, profile.gravel_top, BlockType::GRAVEL);
        fill(profile.gravel_top, profile.dirt_top, BlockType::DIRT);

        let surface = if profile.dirt_top < self.ground_level {
            let sand_top = self
                .ground_level
                .min(profile.dirt_top + profile.sand_height);
            fill(profile.dirt_top, sand_top, BlockType::SAND);
            fill(sand_top, self.ground_level, BlockType::WATER);
            fill(self.ground_level, height, BlockType::AIR);
            (sand_top > profile.dirt_top).then_some(sand_top - 1)
        } else if profile.dirt_top < height {
            fill(profile.dirt_top, profile.dirt_top + 1, BlockType::TOPSOIL);
            fill(profile.dirt_top + 1, height, BlockType::AIR);
            Some(profile.dirt_top)
        } else {
            None
        };

        let y = surface?;
        let candidate = StructureCandidate::new(x as i32, y, z as i32);
        self.outside_padding(candidate).then_some(candidate)
    }

    /// Whether a candidate is far enough from every chunk edge to root a structure.
    pub fn outside_padding(&self, candidate: StructureCandidate) -> bool {
        let low = self.structure_padding;
        let high = self.dimensions.size as i32 - self.structure_padding;
        (low..high).contains(&candidate.x) && (low..high).contains(&candidate.z)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine_state::voxels::chunk::ChunkPosition;

    use super::*;

    fn generator(seed: u64) -> TerrainGenerator {
        TerrainGenerator::with_params(
            seed,
            ChunkDimensions::new(32, 128),
            64,
            11,
            &GenerationParams::default(),
        )
    }

    fn layer_rank(block_type: BlockType) -> u8 {
        match block_type {
            BlockType::ROCK => 0,
            BlockType::GRAVEL => 1,
            BlockType::DIRT => 2,
            BlockType::SAND | BlockType::TOPSOIL => 3,
            BlockType::WATER => 4,
            BlockType::AIR => 5,
            other => panic!("unexpected terrain block {other:?}"),
        }
    }

    #[test]
    fn columns_are_layered_monotonically() {
        let generator = generator(1234);
        let dims = generator.dimensions();
        for position in [ChunkPosition::new(0, 0), ChunkPosition::new(-3, 7)] {
            let mut chunk = Chunk::empty(position, dims);
            generator.generate(&mut chunk);
            for x in 0..dims.size {
                for z in 0..dims.size {
                    let mut rank = 0;
                    let mut saw_topsoil = false;
                    for y in 0..dims.height {
                        let block_type = chunk.get_block_at(x, y, z);
                        let next = layer_rank(block_type);
                        assert!(next >= rank, "{block_type:?} out of order at y={y}");
                        if saw_topsoil {
                            assert_eq!(block_type, BlockType::AIR, "topsoil must be capped by air");
                        }
                        saw_topsoil |= block_type == BlockType::TOPSOIL;
                        rank = next;
                    }
                }
            }
        }
    }

    #[test]
    fn candidates_respect_padding_and_sit_on_surface() {
        let generator = generator(77);
        let mut chunk = Chunk::empty(ChunkPosition::new(2, 2), generator.dimensions());
        let candidates = generator.generate(&mut chunk);
        assert!(!candidates.is_empty());
        for candidate in candidates {
            assert!((11..21).contains(&candidate.x));
            assert!((11..21).contains(&candidate.z));
            let surface = chunk.get_block_at(
                candidate.x as usize,
                candidate.y as usize,
                candidate.z as usize,
            );
            assert!(matches!(surface, BlockType::SAND | BlockType::TOPSOIL));
        }
    }

    #[test]
    fn flooded_columns_fill_water_to_ground_level() {
        let generator = generator(5);
        let dims = generator.dimensions();
        let mut chunk = Chunk::empty(ChunkPosition::new(0, 0), dims);
        generator.generate(&mut chunk);
        for x in 0..dims.size {
            for z in 0..dims.size {
                let profile = generator.column_profile(x as i32, z as i32);
                if profile.dirt_top < 64 {
                    assert!(matches!(
                        chunk.get_block_at(x, 63, z),
                        BlockType::WATER | BlockType::SAND
                    ));
                    assert_eq!(chunk.get_block_at(x, 64, z), BlockType::AIR);
                } else {
                    assert_eq!(
                        chunk.get_block_at(x, profile.dirt_top as usize, z),
                        BlockType::TOPSOIL
                    );
                }
            }
        }
    }

    #[test]
    fn generation_does_not_depend_on_order() {
        let generator = generator(9);
        let dims = generator.dimensions();
        let mut first = Chunk::empty(ChunkPosition::new(1, 1), dims);
        generator.generate(&mut first);

        let mut scratch = Chunk::empty(ChunkPosition::new(-5, 4), dims);
        generator.generate(&mut scratch);

        let mut second = Chunk::empty(ChunkPosition::new(1, 1), dims);
        generator.generate(&mut second);
        assert!(first == second);
    }
}
