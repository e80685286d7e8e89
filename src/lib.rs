#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! Streams an endless, deterministic voxel landscape around a moving observer.
//!
//! The world is split into 16 x 256 x 16 chunks grouped into 4 x 4 chunk
//! zones. As the observer moves, zones entering a square window around it are
//! generated and meshed on a worker pool, zones leaving the window give their
//! geometry back to the render backend, and cell data is kept for good so a
//! returning observer sees every edit it made.
//!
//! ## Key Modules
//!
//! * `core` - Configuration, errors, logging and the shared-lock wrapper
//! * `engine_state` - The streaming pipeline: world, terrain generation,
//!   meshing, task management and the render backend seam
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_terrain::run();
//! }
//! ```
//!
//! `run()` reads an optional JSON configuration from the path in
//! `VOXEL_TERRAIN_CONFIG` and flies a headless observer east, logging what
//! the pipeline does. Set `RUST_LOG=debug` to see per-task timings.

use cgmath::Point3;
use log::{error, info, warn};
use web_time::{Duration, Instant};

use crate::core::EngineConfig;
use engine_state::{rendering::RecordingGateway, EngineState};

pub mod core;
pub mod engine_state;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_TERRAIN_CONFIG";

/// Ticks of the demo flight.
const FLIGHT_TICKS: usize = 600;
/// Distance covered per tick, in cells.
const FLIGHT_SPEED: f32 = 0.5;
/// Ticks between statistics lines.
const STATS_INTERVAL: usize = 100;
/// Height the observer flies at.
const FLIGHT_ALTITUDE: f32 = 200.0;

fn load_config() -> EngineConfig {
    let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
        return EngineConfig::default();
    };
    match EngineConfig::load(&path) {
        Ok(config) => {
            info!("Loaded configuration from {}", path);
            config
        }
        Err(err) => {
            warn!("Ignoring configuration {}: {}", path, err);
            EngineConfig::default()
        }
    }
}

/// Runs a headless flight over the terrain.
pub fn run() {
    core::logging::init();

    let config = load_config();
    let mut engine = EngineState::new(config, RecordingGateway::new());

    let start = Instant::now();
    let mut previous = Point3::new(0.0, FLIGHT_ALTITUDE, 0.0);
    for step in 0..FLIGHT_TICKS {
        let current = Point3::new(step as f32 * FLIGHT_SPEED, FLIGHT_ALTITUDE, 0.0);
        let report = match engine.tick(current, previous) {
            Ok(report) => report,
            Err(err) => {
                error!("Tick {} failed: {}", step, err);
                return;
            }
        };
        let drawn = engine.draw(&());
        if step % STATS_INTERVAL == 0 {
            info!("Tick {}: {} chunks drawn, {:?}", step, drawn, report);
        }
        engine.gateway_mut().take_calls();
        previous = current;
        std::thread::sleep(Duration::from_millis(5));
    }

    let settle_deadline = Instant::now() + Duration::from_secs(60);
    while !engine.is_idle() && Instant::now() < settle_deadline {
        if let Err(err) = engine.tick(previous, previous) {
            error!("Settling tick failed: {}", err);
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    engine.world().log_summary();
    info!(
        "Flight finished in {:?}: {} chunks resident ({} indices), {} backend contract violations",
        start.elapsed(),
        engine.gateway().resident_count(),
        engine.gateway().resident_index_count(),
        engine.gateway().violations()
    );
}
