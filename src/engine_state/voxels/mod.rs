//! # Voxel World Core
//!
//! This module contains the voxel world itself: what a block is, how chunks are stored,
//! generated and persisted, and how the resident window follows the player.
//!
//! ## Architecture
//!
//! * **Block**: block type ordinals and the one-byte `Block` record
//! * **Chunk**: fixed-size flat volumes of blocks and the coordinate math around them
//! * **Generation**: noise heightmaps, layered terrain and structure placement
//! * **Storage**: chunk and mob files under the save root
//! * **Visibility**: which blocks need a visual instance
//! * **World**: the `ChunkWindow` of resident chunks
//! * **Streamer**: the state machine moving the window with the player
//! * **Tasks**: incremental operations the streamer queues
//!
//! ## Data Flow
//!
//! 1. The player crosses a chunk border and the streamer queues a row shift
//! 2. The shift persists the departing row and loads or generates the arriving one
//! 3. Visibility is resolved for the row entering view and sent to the render sink
//! 4. Edits go straight to the owning chunk and re-resolve only the touched cells
//!
//! ## Threading
//!
//! Everything here runs on the thread that owns the world. Long operations are split
//! into steps instead of being moved to other threads.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod mob;
pub mod storage;
pub mod streamer;
pub mod tasks;
pub mod visibility;
pub mod world;
