//! # Voxel Task System
//!
//! Incremental world operations driven by the `TaskManager`. Each task does one column
//! of generation, one chunk load or one chunk render per step, so a frame never waits on
//! a whole row.

pub mod chunk_loading;
pub mod initial_load_task;
pub mod row_shift_task;
