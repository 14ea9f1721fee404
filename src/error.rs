//! # Error Types
//!
//! Errors raised by the world subsystem. Configuration problems are rejected when the
//! world is created; persistence failures propagate to whoever asked for the save or
//! load and are never retried here.

use std::{fmt, io, path::PathBuf};

/// A problem with a [`crate::config::WorldConfig`] detected by `validate()`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Chunk width must be strictly positive.
    InvalidChunkSize(i32),
    /// World height must be strictly positive.
    InvalidWorldHeight(i32),
    /// Ground level must lie strictly inside the world height.
    InvalidGroundLevel { ground_level: i32, world_height: i32 },
    /// Structure padding cannot be negative.
    InvalidStructurePadding(i32),
    /// Render distance outside the supported range.
    InvalidRenderDistance(i32),
    /// A generation tunable is negative or not finite.
    InvalidTunable { name: &'static str, value: f32 },
    /// The configuration file could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChunkSize(size) => write!(f, "chunk size must be positive, got {size}"),
            Self::InvalidWorldHeight(height) => {
                write!(f, "world height must be positive, got {height}")
            }
            Self::InvalidGroundLevel {
                ground_level,
                world_height,
            } => write!(
                f,
                "ground level {ground_level} must lie inside the world height {world_height}"
            ),
            Self::InvalidStructurePadding(padding) => {
                write!(f, "structure padding cannot be negative, got {padding}")
            }
            Self::InvalidRenderDistance(distance) => write!(
                f,
                "render distance must be between {} and {}, got {distance}",
                crate::config::MIN_RENDER_DISTANCE,
                crate::config::MAX_RENDER_DISTANCE
            ),
            Self::InvalidTunable { name, value } => {
                write!(f, "generation tunable `{name}` must be finite and >= 0, got {value}")
            }
            Self::Parse(message) => write!(f, "failed to parse world config: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors surfaced by the world subsystem.
#[derive(Debug)]
pub enum WorldError {
    /// The world configuration is invalid.
    Config(ConfigError),
    /// Reading or writing a save file failed.
    Io { path: PathBuf, source: io::Error },
    /// A chunk file has the wrong length for the configured dimensions.
    ChunkLengthMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    /// A chunk file contains a byte that is not a known block ordinal.
    UnknownBlockOrdinal { path: PathBuf, offset: usize, value: u8 },
    /// A mob file is not a whole number of mob records.
    CorruptMobFile { path: PathBuf, length: usize },
    /// An edit targeted a height outside the world.
    OutOfWorld { x: i32, y: i32, z: i32 },
    /// The chunk that owns a position is not resident in the window.
    ChunkNotLoaded { chunk_x: i32, chunk_z: i32 },
}

impl WorldError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(error) => write!(f, "invalid configuration: {error}"),
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::ChunkLengthMismatch {
                path,
                expected,
                actual,
            } => write!(
                f,
                "chunk file {} has {actual} bytes, expected {expected}",
                path.display()
            ),
            Self::UnknownBlockOrdinal {
                path,
                offset,
                value,
            } => write!(
                f,
                "chunk file {} holds unknown block ordinal {value} at byte {offset}",
                path.display()
            ),
            Self::CorruptMobFile { path, length } => write!(
                f,
                "mob file {} has {length} bytes, not a multiple of the record size",
                path.display()
            ),
            Self::OutOfWorld { x, y, z } => {
                write!(f, "block position ({x}, {y}, {z}) is outside the world")
            }
            Self::ChunkNotLoaded { chunk_x, chunk_z } => {
                write!(f, "chunk ({chunk_x}, {chunk_z}) is not loaded")
            }
        }
    }
}

impl std::error::Error for WorldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(error) => Some(error),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for WorldError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}
