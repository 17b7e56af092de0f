//! # Buckland Blocks
//!
//! The world core of a first-person voxel sandbox: chunked voxel storage, deterministic
//! terrain with real-world building and road footprints stamped on top, face-culled
//! chunk meshing, a player controller that mines and places blocks, and JSON saves.
//!
//! ## Key Modules
//!
//! * `config` - Engine configuration loaded from JSON
//! * `core` - Shared-resource primitive used across threads
//! * `engine_state` - The engine itself: world, generation, meshing, player and tasks
//!
//! ## Architecture
//!
//! The engine follows a modular architecture with clear separation between:
//! * Voxel data and the world store
//! * Chunk generation and overlay stamping
//! * Meshing and the mesh cache
//! * Task scheduling and execution
//!
//! Drawing is left to the embedding application: `EngineState::render_list` hands out
//! the chunk meshes to draw each frame.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     buckland_blocks::run();
//! }
//! ```

use log::{error, info};
use web_time::{Duration, Instant};

pub mod config;
pub mod core;
pub mod engine_state;

use config::EngineConfig;
use engine_state::{player_state::PlayerAction, save::SaveFile, EngineState};

/// Simulated time per tick of the headless driver.
pub const TICK_DURATION: Duration = Duration::from_millis(16);

/// Headless driver: loads the config and save, walks the player forward for the
/// configured number of ticks, then writes the save back.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match EngineConfig::load_or_default(EngineConfig::path_from_env().as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let mut engine = EngineState::new(&config);
    if let Some(path) = &config.save_path {
        engine.restore_from(path);
    }

    let started = Instant::now();
    let walk = PlayerAction {
        move_forward: true,
        ..Default::default()
    };
    let mut edits = 0;
    for _ in 0..config.simulated_ticks {
        if engine.tick(&walk, TICK_DURATION).is_some() {
            edits += 1;
        }
    }

    let position = engine.player.position();
    info!(
        "Simulated {} ticks in {:?}: {} chunks resident, {} meshes cached, {} edits, player at ({:.1}, {:.1}, {:.1}), game time {:.0}",
        config.simulated_ticks,
        started.elapsed(),
        engine.world.chunk_count(),
        engine.mesh_manager.len(),
        edits,
        position.x,
        position.y,
        position.z,
        engine.clock.time()
    );

    if let Some(path) = &config.save_path {
        if let Err(e) = SaveFile::new(path).save(&engine.snapshot()) {
            error!("{}", e);
        }
    }
}
