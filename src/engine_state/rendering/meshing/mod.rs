//! Mesh extraction for chunks.
//!
//! A chunk produces two meshes: an opaque one and a transparent one (water
//! and lava), drawn in that order. Each is a flat vertex list plus a triangle
//! index list in which every quad contributes `[0, 1, 2, 0, 2, 3]` relative to
//! its first vertex.
//!
//! # Architecture
//! - [`ChunkMesh`] / [`MeshBuffers`]: the CPU-side geometry a chunk caches
//! - `face`: corner, normal and UV templates for the six block faces
//! - `culling`: the face-culling mesher ([`mesh_chunk`])

mod culling;
mod face;

pub use culling::mesh_chunk;
pub use face::{FaceTemplate, FACE_TEMPLATES};

use super::Vertex;

/// Indices emitted per quad, relative to the quad's first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// One vertex/index buffer pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Four vertices per quad.
    pub vertices: Vec<Vertex>,
    /// Six indices per quad, into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Appends a quad given its four corners in winding order.
    pub fn push_quad(&mut self, corners: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Number of quads held.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex data as raw bytes, ready for a GPU buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes, ready for a GPU buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// The geometry cached for one chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    /// Everything except water and lava. Drawn first.
    pub opaque: MeshBuffers,
    /// Water and lava faces. Drawn after every opaque mesh.
    pub transparent: MeshBuffers,
}

impl ChunkMesh {
    /// Whether both buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_quad_offsets_indices() {
        let mut buffers = MeshBuffers::default();
        let corner = Vertex::new([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2]);
        buffers.push_quad([corner; 4]);
        buffers.push_quad([corner; 4]);

        assert_eq!(buffers.quad_count(), 2);
        assert_eq!(buffers.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(buffers.vertex_bytes().len(), 8 * 32);
        assert_eq!(buffers.index_bytes().len(), 12 * 4);
    }
}
