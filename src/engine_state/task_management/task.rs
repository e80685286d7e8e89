//! # Task System Core Traits
//!
//! ## Core Components
//! - `Task`: a unit of work executed on a worker thread
//! - `TaskResultSenders`: the typed result channels a task posts into
//!
//! ## Task Lifecycle
//! 1. A `Task` is published via `TaskManager::publish_task()`
//! 2. The task's `process()` runs on a worker thread
//! 3. The task posts zero or more typed results into `TaskResultSenders`
//! 4. The owning thread drains each result kind once per tick
//!
//! Tasks never touch render resources. They compute data, write it into the
//! chunk they own (generation) or into a result (meshing), and return.

use std::sync::mpsc::Sender;

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTaskResult,
    voxels::tasks::chunk_generation_task::ChunkGenerationTaskResult,
};

/// A unit of work that can be executed on a worker thread.
///
/// # Implementation Guidelines
/// - Own everything needed; shared chunk data is reached through `MtResource`
/// - Hold a lock only while reading or writing, never while computing
/// - Post results as soon as they are ready; a task may post several
pub trait Task: Send {
    /// Performs the work and posts results.
    ///
    /// # Arguments
    /// * `results` - Channels back to the owning thread. A send only fails
    ///   once the manager is gone, in which case the result is dropped.
    fn process(&self, results: &TaskResultSenders);
}

/// Producer ends of the per-kind result queues, one clone per worker.
#[derive(Clone)]
pub struct TaskResultSenders {
    /// Chunks whose cells just finished generating.
    pub generated: Sender<ChunkGenerationTaskResult>,
    /// Chunks whose mesh just finished extraction.
    pub meshed: Sender<ChunkMeshGenerationTaskResult>,
}
