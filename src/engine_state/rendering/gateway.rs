//! The seam between the terrain pipeline and a render backend.
//!
//! The pipeline only needs five operations from a backend: upload either of
//! a chunk's two meshes, release whatever the backend holds for a chunk, and
//! draw either mesh with a shader. [`RecordingGateway`] is a headless backend
//! that keeps the bookkeeping a GPU backend would and records every call.

use std::collections::HashMap;

use log::warn;

use crate::engine_state::voxels::chunk::ChunkHandle;

use super::meshing::MeshBuffers;

/// Operations the terrain pipeline issues against a render backend.
///
/// All calls come from the thread that owns the world. A chunk is uploaded
/// before it is drawn, and after `release_gpu_resources` it is not drawn
/// again until it has been re-uploaded.
pub trait RenderGateway {
    /// Whatever the backend binds for a draw call.
    type Shader;

    /// Replaces whatever opaque geometry the backend holds for `chunk`.
    fn upload_opaque(&mut self, chunk: ChunkHandle, buffers: &MeshBuffers);
    /// Replaces whatever transparent geometry the backend holds for `chunk`.
    fn upload_transparent(&mut self, chunk: ChunkHandle, buffers: &MeshBuffers);
    /// Frees both meshes of `chunk`. Releasing a chunk with nothing resident
    /// is a no-op.
    fn release_gpu_resources(&mut self, chunk: ChunkHandle);
    /// Draws the opaque mesh of a resident chunk.
    fn draw_opaque(&mut self, chunk: ChunkHandle, shader: &Self::Shader);
    /// Draws the transparent mesh of a resident chunk.
    fn draw_transparent(&mut self, chunk: ChunkHandle, shader: &Self::Shader);
}

/// One call received by a [`RecordingGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCall {
    /// `upload_opaque`, with the size of the index buffer.
    UploadOpaque {
        /// Target chunk.
        chunk: ChunkHandle,
        /// Number of indices uploaded.
        index_count: usize,
    },
    /// `upload_transparent`, with the size of the index buffer.
    UploadTransparent {
        /// Target chunk.
        chunk: ChunkHandle,
        /// Number of indices uploaded.
        index_count: usize,
    },
    /// `release_gpu_resources`.
    Release(ChunkHandle),
    /// `draw_opaque`.
    DrawOpaque(ChunkHandle),
    /// `draw_transparent`.
    DrawTransparent(ChunkHandle),
}

#[derive(Debug, Default, Clone, Copy)]
struct ResidentMesh {
    opaque_indices: Option<usize>,
    transparent_indices: Option<usize>,
}

/// Headless render backend that tracks residency and records calls.
///
/// A draw of a mesh that is not resident is counted as a violation and
/// logged; the pipeline should never produce one.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    resident: HashMap<ChunkHandle, ResidentMesh>,
    calls: Vec<GatewayCall>,
    violations: usize,
}

impl RecordingGateway {
    /// A gateway with nothing resident and no calls recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> &[GatewayCall] {
        &self.calls
    }

    /// Takes the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<GatewayCall> {
        std::mem::take(&mut self.calls)
    }

    /// Whether both meshes of `chunk` are uploaded.
    pub fn is_resident(&self, chunk: ChunkHandle) -> bool {
        self.resident.get(&chunk).is_some_and(|mesh| {
            mesh.opaque_indices.is_some() && mesh.transparent_indices.is_some()
        })
    }

    /// Number of chunks with at least one uploaded mesh.
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Total indices currently uploaded across all chunks.
    pub fn resident_index_count(&self) -> usize {
        self.resident
            .values()
            .map(|m| m.opaque_indices.unwrap_or(0) + m.transparent_indices.unwrap_or(0))
            .sum()
    }

    /// Draws issued against a mesh that was not resident.
    pub fn violations(&self) -> usize {
        self.violations
    }

    fn check_draw(&mut self, chunk: ChunkHandle, uploaded: impl Fn(&ResidentMesh) -> bool) {
        if !self.resident.get(&chunk).is_some_and(uploaded) {
            warn!("Draw issued for non-resident chunk {:?}", chunk);
            self.violations += 1;
        }
    }
}

impl RenderGateway for RecordingGateway {
    type Shader = ();

    fn upload_opaque(&mut self, chunk: ChunkHandle, buffers: &MeshBuffers) {
        let index_count = buffers.indices.len();
        self.resident.entry(chunk).or_default().opaque_indices = Some(index_count);
        self.calls.push(GatewayCall::UploadOpaque { chunk, index_count });
    }

    fn upload_transparent(&mut self, chunk: ChunkHandle, buffers: &MeshBuffers) {
        let index_count = buffers.indices.len();
        self.resident.entry(chunk).or_default().transparent_indices = Some(index_count);
        self.calls.push(GatewayCall::UploadTransparent { chunk, index_count });
    }

    fn release_gpu_resources(&mut self, chunk: ChunkHandle) {
        self.resident.remove(&chunk);
        self.calls.push(GatewayCall::Release(chunk));
    }

    fn draw_opaque(&mut self, chunk: ChunkHandle, _shader: &()) {
        self.check_draw(chunk, |mesh| mesh.opaque_indices.is_some());
        self.calls.push(GatewayCall::DrawOpaque(chunk));
    }

    fn draw_transparent(&mut self, chunk: ChunkHandle, _shader: &()) {
        self.check_draw(chunk, |mesh| mesh.transparent_indices.is_some());
        self.calls.push(GatewayCall::DrawTransparent(chunk));
    }
}
