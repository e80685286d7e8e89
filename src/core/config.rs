//! # Engine Configuration
//!
//! Settings are plain serde structs so they can be kept in a JSON file next to
//! the binary. Every field has a default, and a partial file only overrides the
//! keys it names.
//!
//! ```json
//! {
//!     "render_radius_zones": 2,
//!     "worker_count": 4,
//!     "terrain": { "seed": 7 }
//! }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::Result;

/// Top-level configuration for an `EngineState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Half-width of the streaming window, in zones. The window spans
    /// `2 * radius + 1` zones on each axis.
    pub render_radius_zones: i32,
    /// Number of background worker threads.
    pub worker_count: usize,
    /// Generation parameters.
    pub terrain: TerrainConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_radius_zones: 4,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            terrain: TerrainConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: EngineConfig = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn normalize(&mut self) {
        self.render_radius_zones = self.render_radius_zones.max(0);
        self.worker_count = self.worker_count.max(1);
    }
}

/// Parameters of the procedural terrain field.
///
/// The vertical constants are tuned against a 256-cell tall chunk; moving them
/// far from their defaults mostly changes how much of the column is sea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for every noise field and for vegetation placement.
    pub seed: u32,
    /// First cell above the stone base; terrain heights are offset by this.
    pub sea_level: i32,
    /// Last cell of the water band that floods empty cells after the base fill.
    pub water_top: i32,
    /// Remapped cave density below which a cell is hollowed out.
    pub cave_threshold: f64,
    /// Carved cells at or below this height fill with lava.
    pub lava_ceiling: i32,
    /// Mountain columns taller than this get a snow cap.
    pub snow_line: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            sea_level: 128,
            water_top: 138,
            cave_threshold: 0.25,
            lava_ceiling: 24,
            snow_line: 175,
        }
    }
}
