//! # World Generation
//!
//! Deterministic procedural generation of chunk volumes.
//!
//! ## Pipeline
//!
//! 1. `TerrainGenerator` fills each column from layered `NoiseField` heightmaps and
//!    records structure candidates
//! 2. `StructurePlacer` stamps ore veins, lairs, crystal plants and trees onto the
//!    candidates using an RNG seeded from the world seed and chunk position
//!
//! A chunk is a pure function of `(seed, chunk_x, chunk_z, params)`.
//!
//! Whole-chunk generation is expensive, so the streamer drives it through a
//! `ChunkBuilder`, one column per step, to keep frame times bounded.

use log::warn;

use crate::config::WorldConfig;

use super::chunk::{Chunk, ChunkDimensions, ChunkPosition};

pub mod noise_field;
pub mod structures;
pub mod templates;
pub mod terrain;

use structures::{PlacementReport, StructurePlacer};
use terrain::{StructureCandidate, TerrainGenerator};

/// Terrain and structure generation for one world.
#[derive(Clone)]
pub struct WorldGenerator {
    terrain: TerrainGenerator,
    structures: StructurePlacer,
}

impl WorldGenerator {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            terrain: TerrainGenerator::new(config),
            structures: StructurePlacer::new(config.seed, &config.generation),
        }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.terrain.dimensions()
    }

    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    /// Generates a complete chunk in one call.
    pub fn generate_chunk(&self, position: ChunkPosition) -> Chunk {
        let mut builder = self.begin(position);
        loop {
            if let ChunkBuildStatus::Finished(chunk) = builder.step(self) {
                return chunk;
            }
        }
    }

    /// Starts an incremental build of the chunk at `position`.
    pub fn begin(&self, position: ChunkPosition) -> ChunkBuilder {
        ChunkBuilder::new(position, self.dimensions())
    }
}

/// Outcome of one [`ChunkBuilder::step`].
pub enum ChunkBuildStatus {
    InProgress,
    Finished(Chunk),
}

/// A chunk being generated one column at a time.
pub struct ChunkBuilder {
    chunk: Option<Chunk>,
    candidates: Vec<StructureCandidate>,
    next_column: usize,
    report: Option<PlacementReport>,
}

impl ChunkBuilder {
    fn new(position: ChunkPosition, dimensions: ChunkDimensions) -> Self {
        Self {
            chunk: Some(Chunk::empty(position, dimensions)),
            candidates: Vec::new(),
            next_column: 0,
            report: None,
        }
    }

    /// Generates one column, or places structures once every column is done.
    ///
    /// The chunk is handed out exactly once. Stepping a finished builder does nothing and
    /// reports `InProgress`; check [`ChunkBuilder::is_finished`] instead.
    pub fn step(&mut self, generator: &WorldGenerator) -> ChunkBuildStatus {
        let Some(chunk) = self.chunk.as_mut() else {
            return ChunkBuildStatus::InProgress;
        };

        let size = chunk.dimensions().size;
        let column_count = size * size;
        if self.next_column < column_count {
            let (x, z) = (self.next_column / size, self.next_column % size);
            if let Some(candidate) = generator.terrain.generate_column(chunk, x, z) {
                self.candidates.push(candidate);
            }
            self.next_column += 1;
            return ChunkBuildStatus::InProgress;
        }

        let report = generator.structures.place(chunk, &mut self.candidates);
        if report.skipped_out_of_bounds > 0 {
            warn!(
                "Skipped {} out-of-bounds structure voxels in chunk {}",
                report.skipped_out_of_bounds, chunk.position
            );
        }
        self.report = Some(report);

        match self.chunk.take() {
            Some(chunk) => ChunkBuildStatus::Finished(chunk),
            None => ChunkBuildStatus::InProgress,
        }
    }

    /// Whether the finished chunk has been handed out.
    pub fn is_finished(&self) -> bool {
        self.chunk.is_none()
    }

    /// Fraction of columns generated so far, for progress display.
    pub fn progress(&self) -> f32 {
        match &self.chunk {
            Some(chunk) => {
                let size = chunk.dimensions().size;
                self.next_column as f32 / (size * size) as f32
            }
            None => 1.0,
        }
    }

    /// Structure placement summary, once the build has finished.
    pub fn report(&self) -> Option<&PlacementReport> {
        self.report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine_state::voxels::block::block_type::BlockType;

    use super::*;

    fn config(seed: u64) -> WorldConfig {
        WorldConfig {
            seed,
            chunk_size: 32,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn generation_is_byte_identical_across_generators() {
        let position = ChunkPosition::new(-2, 5);
        let a = WorldGenerator::new(&config(42)).generate_chunk(position);
        let b = WorldGenerator::new(&config(42)).generate_chunk(position);
        assert_eq!(a.as_bytes(), b.as_bytes());

        let c = WorldGenerator::new(&config(43)).generate_chunk(position);
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn builder_steps_one_column_at_a_time() {
        let generator = WorldGenerator::new(&config(1));
        let mut builder = generator.begin(ChunkPosition::new(0, 0));
        let mut steps = 0;
        let chunk = loop {
            steps += 1;
            match builder.step(&generator) {
                ChunkBuildStatus::InProgress => {}
                ChunkBuildStatus::Finished(chunk) => break chunk,
            }
        };
        // 32 * 32 columns plus the structure pass.
        assert_eq!(steps, 32 * 32 + 1);
        assert_eq!(builder.progress(), 1.0);
        assert!(builder.report().is_some());
        assert!(builder.is_finished());
        assert!(matches!(builder.step(&generator), ChunkBuildStatus::InProgress));
        assert_eq!(chunk.get_block_at(16, 0, 16), BlockType::ROCK);
        assert_eq!(
            chunk.as_bytes(),
            generator.generate_chunk(ChunkPosition::new(0, 0)).as_bytes()
        );
    }
}
