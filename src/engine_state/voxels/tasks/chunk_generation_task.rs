//! # Chunk Generation Task
//!
//! Fills every chunk of one zone with generated terrain. The world dispatches
//! at most one of these per zone for its whole lifetime.

use std::sync::Arc;

use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::{Task, TaskResultSenders},
        voxels::{
            chunk::{Chunk, ChunkHandle, ZoneCoord},
            terrain::Generator,
        },
    },
};

/// Generates the 16 chunks of a zone.
///
/// The task owns the contents of its chunks until it posts them: the world
/// moved them to `ChunkStage::Generating`, and nothing meshes or reads a
/// chunk in that stage as a neighbor.
pub struct ChunkGenerationTask {
    zone: ZoneCoord,
    chunks: Vec<(ChunkHandle, MtResource<Chunk>)>,
    generator: Arc<Generator>,
}

impl ChunkGenerationTask {
    /// # Arguments
    /// * `zone` - The zone being generated, for logging
    /// * `chunks` - Handles and shared chunks to fill, in the order to post them
    /// * `generator` - The world's terrain generator
    pub fn new(
        zone: ZoneCoord,
        chunks: Vec<(ChunkHandle, MtResource<Chunk>)>,
        generator: Arc<Generator>,
    ) -> Self {
        ChunkGenerationTask {
            zone,
            chunks,
            generator,
        }
    }

    /// The zone being generated.
    pub fn zone(&self) -> ZoneCoord {
        self.zone
    }
}

impl Task for ChunkGenerationTask {
    /// Generates each chunk and posts it as soon as its cells are installed,
    /// so meshing can begin before the rest of the zone is done.
    fn process(&self, results: &TaskResultSenders) {
        let start = web_time::Instant::now();

        for (handle, chunk) in &self.chunks {
            // generate without holding the lock; the write is a single move
            let coord = chunk.get().coord();
            let blocks = self.generator.generate(coord);
            chunk.get_mut().install_blocks(blocks);

            let _ = results
                .generated
                .send(ChunkGenerationTaskResult { handle: *handle });
        }

        debug!(
            "Generated zone ({}, {}) in {:?}",
            self.zone.x,
            self.zone.z,
            start.elapsed()
        );
    }
}

/// A chunk whose cells were just installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGenerationTaskResult {
    /// The chunk that reached `ChunkStage::Generated`.
    pub handle: ChunkHandle,
}
