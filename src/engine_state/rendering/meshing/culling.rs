//! Face-culling mesher.
//!
//! Every face of every non-`EMPTY` cell is visited once. A face is emitted
//! when the cell on the other side is `EMPTY` or transparent and is not the
//! same kind as the current cell. Coplanar faces are never merged.

use crate::engine_state::{
    rendering::Vertex,
    voxels::{
        block::{atlas_offset, block_type::BlockType},
        chunk::{Chunk, Neighborhood, CHUNK_HEIGHT, CHUNK_WIDTH},
    },
};

use super::{ChunkMesh, FACE_TEMPLATES};

/// Builds the opaque and transparent meshes of `chunk`.
///
/// Reads across chunk edges go through `neighborhood`; a missing neighbor
/// reads as `UNKNOWN`, which hides the face until the neighbor is linked and
/// the chunk is meshed again. Output depends only on the cells of `chunk` and
/// its neighbors, so meshing unchanged data twice gives identical buffers.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `neighborhood` - Its lateral neighbors, locked for reading
///
/// # Returns
/// A `ChunkMesh` with vertex positions in world space.
pub fn mesh_chunk(chunk: &Chunk, neighborhood: &Neighborhood<'_>) -> ChunkMesh {
    let mut mesh = ChunkMesh::default();
    let origin = chunk.coord();

    for z in 0..CHUNK_WIDTH {
        for y in 0..CHUNK_HEIGHT {
            for x in 0..CHUNK_WIDTH {
                let current = chunk.get_local(x as usize, y, z as usize);
                if current == BlockType::EMPTY {
                    continue;
                }

                let block_origin = [
                    (x + origin.x) as f32,
                    y as f32,
                    (z + origin.z) as f32,
                ];

                for face in &FACE_TEMPLATES {
                    let step = face.direction.offset();
                    let neighbor = chunk.get(x + step.x, y + step.y, z + step.z, neighborhood);

                    if neighbor == current {
                        continue;
                    }
                    if neighbor != BlockType::EMPTY && !neighbor.is_transparent() {
                        continue;
                    }

                    let tile = atlas_offset(current, face.direction);
                    let normal = face.direction.normal();
                    let corners = std::array::from_fn(|i| {
                        let [cx, cy, cz] = face.corners[i];
                        let [u, v] = face.uvs[i];
                        Vertex::new(
                            [block_origin[0] + cx, block_origin[1] + cy, block_origin[2] + cz],
                            normal,
                            [tile[0] + u, tile[1] + v],
                        )
                    });

                    if current.is_transparent() {
                        mesh.transparent.push_quad(corners);
                    } else {
                        mesh.opaque.push_quad(corners);
                    }
                }
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::direction::Direction,
        chunk::{ChunkCoord, ChunkHandle},
    };

    fn chunk_with(blocks: &[((usize, usize, usize), BlockType)]) -> Chunk {
        let mut chunk = Chunk::new(ChunkCoord { x: 0, z: 0 });
        for &((x, y, z), kind) in blocks {
            chunk.set(x, y, z, kind);
        }
        chunk
    }

    #[test]
    fn test_isolated_block_emits_six_quads() {
        let chunk = chunk_with(&[((5, 100, 5), BlockType::STONE)]);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());

        assert_eq!(mesh.opaque.vertices.len(), 24);
        assert_eq!(mesh.opaque.indices.len(), 36);
        assert!(mesh.transparent.is_empty());
        for (quad, chunk_of_indices) in mesh.opaque.indices.chunks(6).enumerate() {
            let base = 4 * quad as u32;
            assert_eq!(chunk_of_indices, &[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    #[test]
    fn test_isolated_water_goes_to_transparent_mesh() {
        let chunk = chunk_with(&[((5, 100, 5), BlockType::WATER)]);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());

        assert!(mesh.opaque.is_empty());
        assert_eq!(mesh.transparent.quad_count(), 6);
    }

    #[test]
    fn test_shared_faces_are_culled() {
        let chunk = chunk_with(&[
            ((5, 100, 5), BlockType::STONE),
            ((6, 100, 5), BlockType::STONE),
        ]);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());
        assert_eq!(mesh.opaque.quad_count(), 10);
    }

    #[test]
    fn test_faces_behind_water_stay_visible() {
        let chunk = chunk_with(&[
            ((5, 100, 5), BlockType::STONE),
            ((6, 100, 5), BlockType::WATER),
        ]);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());

        assert_eq!(mesh.opaque.quad_count(), 6);
        // the water face against stone is hidden
        assert_eq!(mesh.transparent.quad_count(), 5);
    }

    #[test]
    fn test_same_kind_transparent_neighbors_cull() {
        let chunk = chunk_with(&[
            ((5, 100, 5), BlockType::WATER),
            ((5, 101, 5), BlockType::WATER),
        ]);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());
        assert_eq!(mesh.transparent.quad_count(), 10);
    }

    #[test]
    fn test_unlinked_edge_hides_boundary_face() {
        let chunk = chunk_with(&[((0, 10, 7), BlockType::DIRT)]);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());
        assert_eq!(mesh.opaque.quad_count(), 5);
        assert!(mesh.opaque.vertices.iter().all(|v| v.normal != [-1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_linked_edge_consults_neighbor() {
        let mut left = Chunk::new(ChunkCoord { x: -16, z: 0 });
        let mut right = chunk_with(&[((0, 10, 7), BlockType::DIRT)]);
        right.set_neighbor(Direction::XNEG, ChunkHandle(0));
        left.set_neighbor(Direction::XPOS, ChunkHandle(1));

        let open = mesh_chunk(&right, &Neighborhood::new([None, Some(&left), None, None]));
        assert_eq!(open.opaque.quad_count(), 6);

        left.set(15, 10, 7, BlockType::STONE);
        let closed = mesh_chunk(&right, &Neighborhood::new([None, Some(&left), None, None]));
        assert_eq!(closed.opaque.quad_count(), 5);
    }

    #[test]
    fn test_vertices_are_in_world_space_with_atlas_uvs() {
        let mut chunk = Chunk::new(ChunkCoord { x: 32, z: -16 });
        chunk.set(1, 2, 3, BlockType::GRASS_BLOCK);
        let mesh = mesh_chunk(&chunk, &Neighborhood::isolated());

        let top: Vec<&Vertex> = mesh
            .opaque
            .vertices
            .iter()
            .filter(|v| v.normal == [0.0, 1.0, 0.0])
            .collect();
        assert_eq!(top.len(), 4);
        assert!(top.iter().all(|v| v.position[1] == 3.0));
        assert!(top.iter().any(|v| v.position == [33.0, 3.0, -13.0]));
        assert!(top.iter().any(|v| v.position == [34.0, 3.0, -12.0]));
        for v in top {
            assert!(v.tex_coords[0] >= 0.5 && v.tex_coords[0] <= 0.5 + 1.0 / 16.0);
            assert!(v.tex_coords[1] >= 13.0 / 16.0 && v.tex_coords[1] <= 14.0 / 16.0);
        }
    }

    #[test]
    fn test_meshing_is_idempotent() {
        let mut chunk = Chunk::new(ChunkCoord { x: 0, z: 0 });
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..2_000 {
            let kind = BlockType::from_int(rng.u8(2..23));
            chunk.set(rng.usize(0..16), rng.usize(0..256), rng.usize(0..16), kind);
        }

        let first = mesh_chunk(&chunk, &Neighborhood::isolated());
        let second = mesh_chunk(&chunk, &Neighborhood::isolated());

        assert_eq!(first.opaque.vertex_bytes(), second.opaque.vertex_bytes());
        assert_eq!(first.opaque.index_bytes(), second.opaque.index_bytes());
        assert_eq!(first.transparent.vertex_bytes(), second.transparent.vertex_bytes());
        assert_eq!(first.transparent.index_bytes(), second.transparent.index_bytes());
    }
}
