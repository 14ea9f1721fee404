#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! Procedural generation, persistence and streaming of a chunked voxel world.
//!
//! The crate owns the world data and decides what a renderer has to show; it never draws
//! anything itself. A host game loop drives it once per frame through
//! [`EngineState`], which hands block and mob instance updates to a [`RenderSink`].
//!
//! ## Key Modules
//!
//! * `config` - World configuration, loadable from JSON
//! * `error` - Error types for configuration and persistence failures
//! * `engine_state` - The streamer, task scheduling and the voxel core
//!
//! ## Usage
//!
//! ```rust,no_run
//! use voxel_world::{EngineState, InstanceRecorder, WorldConfig};
//!
//! voxel_world::init_logger();
//! let config = WorldConfig::from_file("world.json").unwrap();
//! let mut engine = EngineState::new(&config, InstanceRecorder::new()).unwrap();
//! engine.start(cgmath::Point3::new(0.0, 80.0, 0.0)).unwrap();
//! engine.finish_tasks().unwrap();
//! engine.save_all().unwrap();
//! ```
//!
//! ## Determinism
//!
//! A chunk is a pure function of the world seed, its position and the generation
//! tunables. Generating the same chunk twice, in any order and in any process, yields the
//! same bytes.

use log::info;

pub mod config;
pub mod engine_state;
pub mod error;

pub use config::{GenerationParams, WorldConfig};
pub use engine_state::{
    rendering::{InstanceRecorder, RenderSink},
    voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, ChunkDimensions, ChunkPosition},
        generation::WorldGenerator,
        mob::MobSnapshot,
        storage::{chunk_key, chunk_position_from_key, ChunkStore},
        streamer::{ChunkStreamer, ShiftDirection, StreamProgress, StreamerState},
    },
    EngineState,
};
pub use error::{ConfigError, WorldError};

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    /// A unique save root under the system temp directory, removed on drop.
    pub struct TempSaveDir {
        path: PathBuf,
    }

    impl TempSaveDir {
        pub fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "voxel-world-{name}-{:016x}",
                fastrand::u64(..)
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self { path }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempSaveDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
