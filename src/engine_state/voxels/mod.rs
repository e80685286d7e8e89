//! # Voxel Terrain Core
//!
//! Everything that describes the cells of the world and how they come to be.
//!
//! ## Architecture
//!
//! * **Block**: The closed set of cell kinds and the six face directions
//! * **Chunk**: 16 x 256 x 16 columns of cells, their coordinates and their
//!   lifecycle stage
//! * **Terrain**: Deterministic noise-driven generation of a chunk's cells
//! * **World**: The chunk arena, zone bookkeeping, world-space block access
//!   and ray picking
//! * **Tasks**: Generation work executed on the worker pool
//!
//! ## Data Flow
//!
//! 1. The streaming controller asks the world to generate a zone
//! 2. The world instantiates the zone's 16 chunks and links them to their
//!    neighbors
//! 3. A generation task fills the cells off-thread and installs them
//! 4. The chunk is then eligible for meshing
//!
//! ## Thread Safety
//!
//! Chunks sit behind `MtResource` locks. Workers write a chunk only to
//! install freshly generated cells; every other mutation happens on the
//! owning thread.

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod terrain;
pub mod world;
