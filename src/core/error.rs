//! Error types for the terrain engine

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// A block query or edit hit a column with no instantiated chunk.
    #[error("no chunk loaded at block ({x}, {y}, {z})")]
    OutOfBounds {
        /// World x of the cell.
        x: i32,
        /// World y of the cell.
        y: i32,
        /// World z of the cell.
        z: i32,
    },

    /// Something that correct operation can never produce.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A config file that is not valid JSON for `EngineConfig`.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// A config file that could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
