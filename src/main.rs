//! # Voxel World Headless Driver
//!
//! Loads (or creates) a world, walks a player across a few chunk borders, saves
//! everything and prints the streaming counters. Useful for warming a save directory and
//! for watching the streamer with `RUST_LOG=debug`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [world.json]
//! ```

use std::process::ExitCode;

use cgmath::Point3;
use log::{error, info};
use voxel_world::{EngineState, InstanceRecorder, WorldConfig, WorldError};
use web_time::Duration;

/// Time given to queued world tasks per simulated frame.
const FRAME_BUDGET: Duration = Duration::from_millis(4);

/// Player height while walking; above any generated terrain.
const WALK_HEIGHT: f32 = 100.0;

fn main() -> ExitCode {
    voxel_world::init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), WorldError> {
    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::from_file(path)?,
        None => {
            let config = WorldConfig::default();
            config.validate()?;
            config
        }
    };
    let chunk_size = config.chunk_size as f32;

    let mut engine = EngineState::new(&config, InstanceRecorder::new())?;
    engine.start(Point3::new(0.5, WALK_HEIGHT, 0.5))?;

    // Three chunks east, two north, then back to spawn.
    let waypoints = [(3.0, 0.0), (3.0, 2.0), (0.0, 0.0)];
    let mut position = Point3::new(0.5, WALK_HEIGHT, 0.5);
    for (chunk_x, chunk_z) in waypoints {
        let target = Point3::new(
            chunk_x * chunk_size + 0.5,
            WALK_HEIGHT,
            chunk_z * chunk_size + 0.5,
        );
        while position != target {
            position.x = step_towards(position.x, target.x);
            position.z = step_towards(position.z, target.z);
            engine.update(position, FRAME_BUDGET)?;
        }
    }
    engine.finish_tasks()?;

    let saved = engine.save_all()?;
    let progress = engine.progress();
    info!(
        "Walk finished: {saved} chunks saved, {} block instances live",
        engine.sink().instance_count()
    );
    match serde_json::to_string_pretty(&progress) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize progress: {e}"),
    }
    Ok(())
}

/// Moves one block towards `target`.
fn step_towards(current: f32, target: f32) -> f32 {
    if (target - current).abs() <= 1.0 {
        target
    } else {
        current + (target - current).signum()
    }
}
