//! # Voxel Terrain Entry Point
//!
//! Calls into the library's `run()`.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_terrain::run();
}
