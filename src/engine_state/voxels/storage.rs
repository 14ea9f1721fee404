//! # Chunk Storage
//!
//! Flat binary persistence of chunk volumes and per-chunk mob lists.
//!
//! ## Layout
//!
//! ```text
//! {save_root}/moons/moon{world_id}/chunks/{key}.sb   raw block bytes, x -> y -> z order
//! {save_root}/moons/moon{world_id}/mobs/{key}.dat    6 f32 per mob
//! ```
//!
//! `key` is the decimal form of `(chunk_x as u32) << 32 | (chunk_z as u32)`.
//!
//! ## Caching
//!
//! Saved and loaded volumes are kept in a small write-through LRU cache so a player
//! walking back and forth over a chunk border does not hit the disk every time. The file
//! is always written; the cache only short-circuits reads.
//!
//! ## Errors
//!
//! Every I/O failure is returned to the caller. Nothing is retried, and `load` does not
//! fall back to generation: callers check `exists` first.

use std::{
    fs,
    io::ErrorKind,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use log::debug;
use lru::LruCache;

use crate::error::WorldError;

use super::{
    block::{block_type::BlockType, Block},
    chunk::{chunk_creation::ChunkCreationIterator, Chunk, ChunkDimensions, ChunkPosition},
    mob::{MobSnapshot, MOB_RECORD_SIZE},
};

pub const CHUNK_FILE_EXTENSION: &str = "sb";
pub const MOB_FILE_EXTENSION: &str = "dat";

/// Packs chunk coordinates into the 64-bit file key, reinterpreting negatives as
/// two's-complement `u32`.
pub fn chunk_key(position: ChunkPosition) -> u64 {
    ((position.x as u32 as u64) << 32) | position.z as u32 as u64
}

/// Inverse of [`chunk_key`].
pub fn chunk_position_from_key(key: u64) -> ChunkPosition {
    ChunkPosition::new((key >> 32) as u32 as i32, key as u32 as i32)
}

pub struct ChunkStore {
    root: PathBuf,
    dimensions: ChunkDimensions,
    cache: Option<LruCache<(u32, u64), Vec<Block>>>,
}

impl ChunkStore {
    /// Creates a store rooted at `save_root`. Directories are created lazily on first save.
    pub fn new(
        save_root: impl Into<PathBuf>,
        dimensions: ChunkDimensions,
        cache_capacity: usize,
    ) -> Self {
        Self {
            root: save_root.into(),
            dimensions,
            cache: NonZeroUsize::new(cache_capacity).map(LruCache::new),
        }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Directory of one world's save data.
    pub fn world_dir(&self, world_id: u32) -> PathBuf {
        self.root.join("moons").join(format!("moon{world_id}"))
    }

    pub fn chunk_path(&self, world_id: u32, position: ChunkPosition) -> PathBuf {
        self.world_dir(world_id)
            .join("chunks")
            .join(format!("{}.{CHUNK_FILE_EXTENSION}", chunk_key(position)))
    }

    pub fn mob_path(&self, world_id: u32, position: ChunkPosition) -> PathBuf {
        self.world_dir(world_id)
            .join("mobs")
            .join(format!("{}.{MOB_FILE_EXTENSION}", chunk_key(position)))
    }

    /// Whether a chunk has been saved before.
    pub fn exists(&self, world_id: u32, position: ChunkPosition) -> bool {
        let cached = self
            .cache
            .as_ref()
            .is_some_and(|cache| cache.contains(&(world_id, chunk_key(position))));
        cached || self.chunk_path(world_id, position).is_file()
    }

    /// Writes a chunk volume.
    pub fn save(&mut self, chunk: &Chunk, world_id: u32) -> Result<(), WorldError> {
        let path = self.chunk_path(world_id, chunk.position);
        write_file(&path, chunk.as_bytes())?;
        if let Some(cache) = self.cache.as_mut() {
            cache.put((world_id, chunk_key(chunk.position)), chunk.blocks().to_vec());
        }
        debug!("Saved chunk {} to {}", chunk.position, path.display());
        Ok(())
    }

    /// Reads a chunk volume, validating its length and every block ordinal.
    pub fn load(&mut self, world_id: u32, position: ChunkPosition) -> Result<Chunk, WorldError> {
        let key = (world_id, chunk_key(position));
        if let Some(blocks) = self.cache.as_mut().and_then(|cache| cache.get(&key)) {
            return Ok(Chunk::from_blocks(position, self.dimensions, blocks.clone()));
        }

        let path = self.chunk_path(world_id, position);
        let bytes = fs::read(&path).map_err(|e| WorldError::io(&path, e))?;
        if bytes.len() != self.dimensions.volume() {
            return Err(WorldError::ChunkLengthMismatch {
                path,
                expected: self.dimensions.volume(),
                actual: bytes.len(),
            });
        }

        let mut cci = ChunkCreationIterator::new(position, self.dimensions);
        for (offset, &value) in bytes.iter().enumerate() {
            let block_type = BlockType::from_ordinal(value).ok_or_else(|| {
                WorldError::UnknownBlockOrdinal {
                    path: path.clone(),
                    offset,
                    value,
                }
            })?;
            cci.push_block_type(block_type);
        }
        let chunk = cci.return_chunk();

        if let Some(cache) = self.cache.as_mut() {
            cache.put(key, chunk.blocks().to_vec());
        }
        debug!("Loaded chunk {position} from {}", path.display());
        Ok(chunk)
    }

    /// Writes the mob list of a chunk, replacing any previous list.
    pub fn save_mobs(
        &self,
        mobs: &[MobSnapshot],
        world_id: u32,
        position: ChunkPosition,
    ) -> Result<(), WorldError> {
        let path = self.mob_path(world_id, position);
        write_file(&path, bytemuck::cast_slice(mobs))
    }

    /// Reads the mob list of a chunk. A missing file means the chunk never had mobs saved.
    pub fn load_mobs(
        &self,
        world_id: u32,
        position: ChunkPosition,
    ) -> Result<Option<Vec<MobSnapshot>>, WorldError> {
        let path = self.mob_path(world_id, position);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WorldError::io(&path, e)),
        };
        if bytes.len() % MOB_RECORD_SIZE != 0 {
            return Err(WorldError::CorruptMobFile {
                path,
                length: bytes.len(),
            });
        }

        let mobs = bytes
            .chunks_exact(MOB_RECORD_SIZE)
            .map(bytemuck::pod_read_unaligned::<MobSnapshot>)
            .collect();
        Ok(Some(mobs))
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), WorldError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| WorldError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| WorldError::io(path, e))
}
