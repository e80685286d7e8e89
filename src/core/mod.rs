//! # Core Module
//!
//! Cross-cutting pieces shared by every subsystem of the terrain engine.
//!
//! ## Key Components
//! - `MtResource`: thread-safe, reference-counted chunk container with read-write locking
//! - `Error` / `Result`: the crate-wide error taxonomy
//! - `EngineConfig`: JSON-loadable engine and terrain settings
//! - `logging`: `env_logger` bootstrap used by the binary and by tests

pub mod config;
pub mod error;
pub mod logging;
pub mod mt_resource;

pub use config::{EngineConfig, TerrainConfig};
pub use error::{Error, Result};
pub use mt_resource::MtResource;
