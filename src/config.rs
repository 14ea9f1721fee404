//! # World Configuration
//!
//! Tunable constants for a single world (a "moon" save slot). The configuration is plain
//! serde data so it can be embedded in a larger options file or loaded on its own from JSON.
//!
//! ## Defaults
//!
//! The defaults reproduce the stock world: 64x128x64 chunks, ground level 64, an 11 block
//! structure margin and a render distance of 4 chunks.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    engine_state::voxels::chunk::ChunkDimensions,
    error::{ConfigError, WorldError},
};

/// Smallest accepted render distance, in chunks.
pub const MIN_RENDER_DISTANCE: i32 = 1;
/// Largest accepted render distance, in chunks.
pub const MAX_RENDER_DISTANCE: i32 = 32;

/// Externally supplied generation tunables.
///
/// These are constant inputs to the generator; nothing in this crate mutates them.
/// A value of `1.0` leaves the stock probabilities untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Multiplies the chance that a chunk grows trees.
    pub tree_cover: f32,
    /// Multiplies the amplitude of the rock heightmap.
    pub terrain_roughness: f32,
    /// Multiplies the chance of lairs and crystal plants.
    pub exotic_terrain: f32,
    /// Passed through to the mob spawner.
    pub wildlife: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            tree_cover: 1.0,
            terrain_roughness: 1.0,
            exotic_terrain: 1.0,
            wildlife: 1.0,
        }
    }
}

/// Everything needed to generate, stream and persist one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Save slot id, used in the `moons/moon{id}` directory name.
    pub world_id: u32,
    /// Seed fixed at world creation.
    pub seed: u64,
    /// Directory holding the `moons/` tree.
    pub save_root: PathBuf,
    /// Chunk width and depth in blocks.
    pub chunk_size: i32,
    /// Chunk height in blocks.
    pub world_height: i32,
    /// Water surface height; terrain below it is flooded.
    pub ground_level: i32,
    /// Margin from the chunk edge in which no structure is rooted.
    pub structure_padding: i32,
    /// Radius of the visible area, in chunks.
    pub render_distance: i32,
    /// Number of chunk volumes kept in the store's write-through cache. 0 disables it.
    pub chunk_cache_capacity: usize,
    pub generation: GenerationParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_id: 0,
            seed: 0,
            save_root: PathBuf::from("saves"),
            chunk_size: 64,
            world_height: 128,
            ground_level: 64,
            structure_padding: 11,
            render_distance: 4,
            chunk_cache_capacity: 16,
            generation: GenerationParams::default(),
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        let config: WorldConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| WorldError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Checks every field against the limits the generator and streamer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        if self.world_height <= 0 {
            return Err(ConfigError::InvalidWorldHeight(self.world_height));
        }
        if self.ground_level <= 0 || self.ground_level >= self.world_height {
            return Err(ConfigError::InvalidGroundLevel {
                ground_level: self.ground_level,
                world_height: self.world_height,
            });
        }
        if self.structure_padding < 0 {
            return Err(ConfigError::InvalidStructurePadding(self.structure_padding));
        }
        validate_render_distance(self.render_distance)?;

        let tunables = [
            ("tree_cover", self.generation.tree_cover),
            ("terrain_roughness", self.generation.terrain_roughness),
            ("exotic_terrain", self.generation.exotic_terrain),
            ("wildlife", self.generation.wildlife),
        ];
        for (name, value) in tunables {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }

        Ok(())
    }

    /// Chunk dimensions in blocks. Only meaningful on a validated config.
    pub fn dimensions(&self) -> ChunkDimensions {
        ChunkDimensions::new(self.chunk_size as usize, self.world_height as usize)
    }
}

/// Rejects render distances the window cannot be sized for.
pub fn validate_render_distance(render_distance: i32) -> Result<(), ConfigError> {
    if !(MIN_RENDER_DISTANCE..=MAX_RENDER_DISTANCE).contains(&render_distance) {
        return Err(ConfigError::InvalidRenderDistance(render_distance));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorldConfig::default();
        assert_eq!(config.validate(), Ok(()));
        let dims = config.dimensions();
        assert_eq!(dims.size, 64);
        assert_eq!(dims.height, 128);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config =
            WorldConfig::from_json_str(r#"{ "seed": 42, "generation": { "tree_cover": 0.5 } }"#)
                .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.chunk_size, 64);
        assert_eq!(config.generation.tree_cover, 0.5);
        assert_eq!(config.generation.wildlife, 1.0);
    }

    #[test]
    fn rejects_non_positive_chunk_size() {
        let config = WorldConfig {
            chunk_size: 0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize(0)));

        let result = WorldConfig::from_json_str(r#"{ "chunk_size": -4 }"#);
        assert!(matches!(
            result,
            Err(WorldError::Config(ConfigError::InvalidChunkSize(-4)))
        ));
    }

    #[test]
    fn rejects_bad_render_distance_and_ground_level() {
        let config = WorldConfig {
            render_distance: 0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRenderDistance(0)));

        let config = WorldConfig {
            ground_level: 128,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGroundLevel { .. })
        ));
    }

    #[test]
    fn rejects_negative_tunables() {
        let mut config = WorldConfig::default();
        config.generation.exotic_terrain = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTunable {
                name: "exotic_terrain",
                ..
            })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            WorldConfig::from_json_str("{ not json"),
            Err(WorldError::Config(ConfigError::Parse(_)))
        ));
    }
}
