//! # Voxel Task System
//!
//! Tasks that fill chunks with terrain on worker threads.

pub mod chunk_generation_task;
