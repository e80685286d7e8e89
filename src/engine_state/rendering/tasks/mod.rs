//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: extracts the opaque and transparent meshes of
//!   one generated chunk

pub mod chunk_mesh_generation_task;
