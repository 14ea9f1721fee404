//! # Visibility
//!
//! Decides which blocks need a visual instance. A block is rendered when at least one of
//! its six face neighbours is transparent relative to it (see
//! [`BlockType::is_exposed_to`]).
//!
//! Lateral neighbours on a chunk edge are read from the adjacent chunk snapshots, passed
//! in `LATERAL_SIDES` order (-X, +X, -Z, +Z). Vertical neighbours never cross chunks:
//! reads below the floor or above the ceiling hit an opaque sentinel, as does a lateral
//! read into a chunk that is not resident.

use bitvec::prelude::*;
use cgmath::Point3;

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::Chunk,
};

/// Adjacent chunk snapshots in `LATERAL_SIDES` order.
pub type NeighborChunks<'a> = [Option<&'a Chunk>; 4];

/// Whether the block at `local` needs a visual instance.
pub fn should_render(chunk: &Chunk, neighbors: &NeighborChunks<'_>, local: Point3<usize>) -> bool {
    let block = chunk.get_block_at(local.x, local.y, local.z);
    if block == BlockType::AIR {
        return false;
    }

    let size = chunk.dimensions().size;
    if local.x > 0 && local.x < size - 1 && local.z > 0 && local.z < size - 1 {
        return BlockSide::all().into_iter().any(|side| {
            let offset = side.offset();
            let x = local.x as i32 + offset.x;
            let y = local.y as i32 + offset.y;
            let z = local.z as i32 + offset.z;
            chunk
                .try_get(x, y, z)
                .is_some_and(|neighbor| block.is_exposed_to(neighbor))
        });
    }

    BlockSide::all().into_iter().any(|side| {
        neighbor_block(chunk, neighbors, local, side)
            .is_some_and(|neighbor| block.is_exposed_to(neighbor))
    })
}

/// Reads the block behind `side` of `local`, crossing into an adjacent chunk if needed.
///
/// `None` is the opaque sentinel.
fn neighbor_block(
    chunk: &Chunk,
    neighbors: &NeighborChunks<'_>,
    local: Point3<usize>,
    side: BlockSide,
) -> Option<BlockType> {
    let offset = side.offset();
    let x = local.x as i32 + offset.x;
    let y = local.y as i32 + offset.y;
    let z = local.z as i32 + offset.z;
    if let Some(block) = chunk.try_get(x, y, z) {
        return Some(block);
    }

    let lateral = side.lateral_index()?;
    let size = chunk.dimensions().size as i32;
    let adjacent = neighbors[lateral]?;
    adjacent.try_get(x.rem_euclid(size), y, z.rem_euclid(size))
}

/// Resolves every block of a chunk, returning one bit per block in chunk index order.
pub fn resolve_chunk(chunk: &Chunk, neighbors: &NeighborChunks<'_>) -> BitVec {
    let dimensions = chunk.dimensions();
    let mut visible = bitvec![0; dimensions.volume()];
    for (local, _) in chunk.solid_blocks() {
        if should_render(chunk, neighbors, local) {
            visible.set(dimensions.index(local.x, local.y, local.z), true);
        }
    }
    visible
}
