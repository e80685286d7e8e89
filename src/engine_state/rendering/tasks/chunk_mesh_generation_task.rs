//! Task for extracting chunk geometry on a worker thread.
//!
//! A mesh task can only be built from a [`GeneratedChunk`], which the world
//! hands out for chunks whose cells are final. Meshing a chunk that is still
//! generating is therefore not expressible.

use std::sync::Arc;

use log::debug;

use crate::engine_state::{
    rendering::meshing::{mesh_chunk, ChunkMesh},
    task_management::task::{Task, TaskResultSenders},
    voxels::{
        chunk::{Chunk, ChunkHandle, ChunkStage, Neighborhood},
        world::GeneratedChunk,
    },
};

/// Extracts the geometry of one chunk.
///
/// The chunk and each generated neighbor are copied under a short shared
/// lock, one at a time, and the geometry is built from the copies. The
/// chunk's revision is read before any neighbor: a neighbor that changes
/// afterwards bumps that revision, so the result comes back stale instead of
/// wrong.
pub struct ChunkMeshGenerationTask {
    chunk: GeneratedChunk,
}

enum MeshSource {
    Cached(Arc<ChunkMesh>),
    Cells(Chunk),
}

impl ChunkMeshGenerationTask {
    /// Creates a task for a chunk whose cells are final.
    pub fn new(chunk: GeneratedChunk) -> Self {
        ChunkMeshGenerationTask { chunk }
    }

    /// Handle of the chunk this task meshes.
    pub fn handle(&self) -> ChunkHandle {
        self.chunk.handle()
    }

    /// Copies of the linked neighbors whose cells are final.
    fn copy_neighbors(&self) -> [Option<Chunk>; 4] {
        self.chunk.neighbors().each_ref().map(|neighbor| {
            neighbor.as_ref().and_then(|neighbor| {
                let neighbor = neighbor.get();
                (neighbor.stage() >= ChunkStage::Generated).then(|| neighbor.snapshot())
            })
        })
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Meshes the chunk, or reuses its cached mesh when that is still valid,
    /// and posts the result with the revision that was read.
    fn process(&self, results: &TaskResultSenders) {
        let start = web_time::Instant::now();

        let (revision, source) = {
            let chunk = self.chunk.chunk().get();
            let source = match chunk.mesh() {
                Some(mesh) if chunk.is_cpu_mesh_valid() => MeshSource::Cached(mesh.clone()),
                _ => MeshSource::Cells(chunk.snapshot()),
            };
            (chunk.revision(), source)
        };

        let (mesh, reused) = match source {
            MeshSource::Cached(mesh) => (mesh, true),
            MeshSource::Cells(cells) => {
                let neighbors = self.copy_neighbors();
                let neighborhood = Neighborhood::new(neighbors.each_ref().map(Option::as_ref));
                (Arc::new(mesh_chunk(&cells, &neighborhood)), false)
            }
        };

        debug!(
            "Meshed chunk {:?} in {:?} ({} opaque quads, {} transparent quads{})",
            self.chunk.handle(),
            start.elapsed(),
            mesh.opaque.quad_count(),
            mesh.transparent.quad_count(),
            if reused { ", cached" } else { "" }
        );

        let _ = results.meshed.send(ChunkMeshGenerationTaskResult {
            handle: self.chunk.handle(),
            mesh,
            revision,
            reused,
        });
    }
}

/// Geometry of one chunk, tagged with the cell revision it was built from.
pub struct ChunkMeshGenerationTaskResult {
    /// The chunk the geometry belongs to.
    pub handle: ChunkHandle,
    /// The extracted or reused geometry.
    pub mesh: Arc<ChunkMesh>,
    /// `Chunk::revision` at the time the cells were read.
    pub revision: u64,
    /// `true` when the cached mesh was still valid and no extraction ran.
    pub reused: bool,
}
