//! # Chunk Module
//!
//! A `Chunk` is one 16 × 256 × 16 column of the world together with the state
//! the streaming pipeline tracks for it:
//!
//! - its cells, stored densely in a [`BlockGrid`],
//! - handles to up to four lateral neighbors in the world's chunk arena,
//! - the cached mesh and the two validity flags (CPU mesh valid, GPU resource valid),
//! - a [`ChunkStage`] marker recording how far through the pipeline it has come.
//!
//! ## Neighbor lookups
//!
//! Cross-boundary reads go through [`Chunk::get`] with a [`Neighborhood`] of
//! borrowed neighbor chunks. Delegation is exactly one hop: a read that
//! leaves the chunk on both x and z is answered `UNKNOWN` instead of walking a
//! diagonal. Keep it that way unless the termination argument is revisited.
//!
//! ## Mesh invalidation
//!
//! Every mutation bumps a revision counter and clears the CPU mesh flag. Mesh
//! jobs record the revision they read, so a mesh that raced with an edit is
//! recognized as stale when it comes back.

use std::sync::Arc;

use crate::engine_state::rendering::meshing::ChunkMesh;

use super::block::{block_type::BlockType, direction::Direction};

pub mod block_grid;
pub mod coordinates;

pub use block_grid::BlockGrid;
pub use coordinates::{ChunkCoord, ZoneCoord, CHUNK_HEIGHT, CHUNK_WIDTH};

/// Index of a chunk in the world's arena. Stable for the life of the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkHandle(pub(crate) u32);

impl ChunkHandle {
    /// Position of the chunk in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How far a chunk has progressed through generate → mesh → upload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkStage {
    /// Instantiated; cells are all `EMPTY`.
    NotGenerated,
    /// A generation job owns this chunk's future contents.
    Generating,
    /// Cells are final; no mesh reflects them yet.
    Generated,
    /// A mesh matching the current cells is cached on the CPU.
    Meshed,
    /// That mesh has been handed to the render backend.
    Uploaded,
}

/// Borrowed lateral neighbors of a chunk, indexed by [`Direction::lateral_index`].
#[derive(Default, Clone, Copy)]
pub struct Neighborhood<'a> {
    chunks: [Option<&'a Chunk>; 4],
}

impl<'a> Neighborhood<'a> {
    /// Wraps neighbors in slot order: `XPOS`, `XNEG`, `ZPOS`, `ZNEG`.
    pub fn new(chunks: [Option<&'a Chunk>; 4]) -> Self {
        Neighborhood { chunks }
    }

    /// A neighborhood where every neighbor is absent.
    pub fn isolated() -> Self {
        Self::default()
    }

    /// The neighbor in a lateral `direction`. Vertical directions have none.
    pub fn get(&self, direction: Direction) -> Option<&'a Chunk> {
        direction.lateral_index().and_then(|slot| self.chunks[slot])
    }
}

/// One column of the world.
pub struct Chunk {
    coord: ChunkCoord,
    blocks: BlockGrid,
    neighbors: [Option<ChunkHandle>; 4],
    stage: ChunkStage,
    mesh: Option<Arc<ChunkMesh>>,
    cpu_mesh_valid: bool,
    gpu_resource_valid: bool,
    revision: u64,
}

impl Chunk {
    /// Creates an all-`EMPTY`, unlinked chunk at `coord`.
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            coord,
            blocks: BlockGrid::new(),
            neighbors: [None; 4],
            stage: ChunkStage::NotGenerated,
            mesh: None,
            cpu_mesh_valid: false,
            gpu_resource_valid: false,
            revision: 0,
        }
    }

    /// World position of the chunk's minimum corner.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// The chunk's own cells. All `EMPTY` until generation installs them.
    pub fn blocks(&self) -> &BlockGrid {
        &self.blocks
    }

    /// How far along the pipeline the chunk is.
    pub fn stage(&self) -> ChunkStage {
        self.stage
    }

    /// Counter bumped by every change that can alter this chunk's mesh.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the cached mesh matches the current cells and neighbors.
    pub fn is_cpu_mesh_valid(&self) -> bool {
        self.cpu_mesh_valid
    }

    /// Whether the backend holds this chunk's current mesh.
    pub fn is_gpu_resource_valid(&self) -> bool {
        self.gpu_resource_valid
    }

    /// Cached mesh, if one is held. It may be stale; check
    /// [`Chunk::is_cpu_mesh_valid`].
    pub fn mesh(&self) -> Option<&Arc<ChunkMesh>> {
        self.mesh.as_ref()
    }

    /// Handle of the neighbor in `direction`. Always `None` for ±Y.
    pub fn neighbor(&self, direction: Direction) -> Option<ChunkHandle> {
        direction
            .lateral_index()
            .and_then(|slot| self.neighbors[slot])
    }

    /// All four lateral neighbor handles in table order.
    pub fn neighbors(&self) -> [Option<ChunkHandle>; 4] {
        self.neighbors
    }

    /// Reads a cell of this column with the vertical rules applied:
    /// `UNKNOWN` below the world, `EMPTY` above it.
    pub fn get_local(&self, x: usize, y: i32, z: usize) -> BlockType {
        if y < 0 {
            BlockType::UNKNOWN
        } else if y >= CHUNK_HEIGHT {
            BlockType::EMPTY
        } else {
            self.blocks.get(x, y as usize, z)
        }
    }

    /// Reads a cell, crossing into a lateral neighbor when `x` or `z` leaves
    /// `[0, 16)`.
    ///
    /// Out-of-range reads go to the neighbor at the mirrored edge (`15` for a
    /// negative coordinate, `0` otherwise) or return `UNKNOWN` when that
    /// neighbor is absent. A read outside on both axes is `UNKNOWN`.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Chunk-local coordinates
    /// * `neighborhood` - This chunk's neighbors, borrowed for reading
    pub fn get(&self, x: i32, y: i32, z: i32, neighborhood: &Neighborhood<'_>) -> BlockType {
        let x_inside = (0..CHUNK_WIDTH).contains(&x);
        let z_inside = (0..CHUNK_WIDTH).contains(&z);

        match (x_inside, z_inside) {
            (true, true) => self.get_local(x as usize, y, z as usize),
            (false, true) => {
                let (direction, edge) = if x < 0 {
                    (Direction::XNEG, CHUNK_WIDTH as usize - 1)
                } else {
                    (Direction::XPOS, 0)
                };
                neighborhood
                    .get(direction)
                    .map_or(BlockType::UNKNOWN, |n| n.get_local(edge, y, z as usize))
            }
            (true, false) => {
                let (direction, edge) = if z < 0 {
                    (Direction::ZNEG, CHUNK_WIDTH as usize - 1)
                } else {
                    (Direction::ZPOS, 0)
                };
                neighborhood
                    .get(direction)
                    .map_or(BlockType::UNKNOWN, |n| n.get_local(x as usize, y, edge))
            }
            (false, false) => BlockType::UNKNOWN,
        }
    }

    /// Writes an interior cell.
    ///
    /// Writing the kind a cell already holds changes nothing. Otherwise the
    /// CPU mesh is invalidated, and when the cell sits on a lateral edge the
    /// linked neighbor across that edge is returned so the caller can
    /// invalidate it too.
    ///
    /// # Returns
    /// Handles of neighbors whose meshes the write made stale (at most two).
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) -> Vec<ChunkHandle> {
        if self.blocks.get(x, y, z) == block_type {
            return Vec::new();
        }
        self.blocks.set(x, y, z, block_type);
        self.invalidate_mesh();

        let last = CHUNK_WIDTH as usize - 1;
        let mut edges = Vec::with_capacity(2);
        if x == 0 {
            edges.push(Direction::XNEG);
        } else if x == last {
            edges.push(Direction::XPOS);
        }
        if z == 0 {
            edges.push(Direction::ZNEG);
        } else if z == last {
            edges.push(Direction::ZPOS);
        }
        edges.into_iter().filter_map(|d| self.neighbor(d)).collect()
    }

    /// Copies the cells, coordinates, links, stage and revision, leaving the
    /// geometry behind. Mesh tasks extract from copies so they never hold a
    /// lock while meshing.
    pub(crate) fn snapshot(&self) -> Chunk {
        Chunk {
            coord: self.coord,
            blocks: self.blocks.clone(),
            neighbors: self.neighbors,
            stage: self.stage,
            mesh: None,
            cpu_mesh_valid: false,
            gpu_resource_valid: false,
            revision: self.revision,
        }
    }

    /// Records `neighbor` in the slot for `direction` and invalidates the mesh.
    ///
    /// Only the world calls this, always in pairs, so the links stay mutual.
    pub(crate) fn set_neighbor(&mut self, direction: Direction, neighbor: ChunkHandle) {
        if let Some(slot) = direction.lateral_index() {
            self.neighbors[slot] = Some(neighbor);
            self.invalidate_mesh();
        }
    }

    /// Marks the cached mesh as no longer matching the cells.
    pub fn invalidate_mesh(&mut self) {
        self.cpu_mesh_valid = false;
        self.revision += 1;
        if self.stage > ChunkStage::Generated {
            self.stage = ChunkStage::Generated;
        }
    }

    pub(crate) fn begin_generation(&mut self) {
        self.stage = ChunkStage::Generating;
    }

    /// Replaces every cell with the generator's output.
    pub(crate) fn install_blocks(&mut self, blocks: BlockGrid) {
        self.blocks = blocks;
        self.invalidate_mesh();
        self.stage = ChunkStage::Generated;
    }

    /// Caches a mesh built from the cells at `revision`.
    ///
    /// # Returns
    /// `true` if the mesh still matches the cells and is now CPU-valid,
    /// `false` if an edit landed after the mesh was read.
    pub(crate) fn store_mesh(&mut self, mesh: Arc<ChunkMesh>, revision: u64) -> bool {
        self.mesh = Some(mesh);
        if revision != self.revision || self.stage < ChunkStage::Generated {
            return false;
        }
        self.cpu_mesh_valid = true;
        self.gpu_resource_valid = false;
        self.stage = ChunkStage::Meshed;
        true
    }

    pub(crate) fn mark_uploaded(&mut self) {
        self.gpu_resource_valid = true;
        if self.stage == ChunkStage::Meshed {
            self.stage = ChunkStage::Uploaded;
        }
    }

    /// Drops both the GPU-side and the CPU-side geometry. Cells are kept.
    pub(crate) fn release_geometry(&mut self) {
        self.mesh = None;
        self.cpu_mesh_valid = false;
        self.gpu_resource_valid = false;
        if self.stage > ChunkStage::Generated {
            self.stage = ChunkStage::Generated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_at(x: i32, z: i32) -> Chunk {
        Chunk::new(ChunkCoord { x, z })
    }

    fn link(a: &mut Chunk, a_handle: ChunkHandle, b: &mut Chunk, b_handle: ChunkHandle, dir: Direction) {
        a.set_neighbor(dir, b_handle);
        b.set_neighbor(dir.opposite(), a_handle);
    }

    #[test]
    fn test_vertical_rules() {
        let chunk = chunk_at(0, 0);
        let isolated = Neighborhood::isolated();
        assert_eq!(chunk.get(3, -1, 3, &isolated), BlockType::UNKNOWN);
        assert_eq!(chunk.get(3, 256, 3, &isolated), BlockType::EMPTY);
        assert_eq!(chunk.get(3, 255, 3, &isolated), BlockType::EMPTY);
    }

    #[test]
    fn test_missing_neighbor_reads_unknown() {
        let chunk = chunk_at(0, 0);
        let isolated = Neighborhood::isolated();
        assert_eq!(chunk.get(-1, 10, 0, &isolated), BlockType::UNKNOWN);
        assert_eq!(chunk.get(16, 10, 0, &isolated), BlockType::UNKNOWN);
        assert_eq!(chunk.get(0, 10, 16, &isolated), BlockType::UNKNOWN);
    }

    #[test]
    fn test_boundary_delegation_matches_neighbor_edge() {
        let mut a = chunk_at(0, 0);
        let mut b = chunk_at(16, 0);
        link(&mut a, ChunkHandle(0), &mut b, ChunkHandle(1), Direction::XPOS);

        let mut rng = fastrand::Rng::with_seed(9);
        for y in 0..256 {
            for z in 0..16 {
                let kind = BlockType::from_int(rng.u8(2..23));
                b.set(0, y, z, kind);
            }
        }

        let a_view = Neighborhood::new([Some(&b), None, None, None]);
        let b_view = Neighborhood::new([None, Some(&a), None, None]);
        for y in 0..256 {
            for z in 0..16 {
                assert_eq!(
                    a.get(16, y, z, &a_view),
                    b.get(0, y, z, &b_view),
                    "mismatch at y={y} z={z}"
                );
            }
        }
        assert_eq!(b.get(-1, 5, 5, &b_view), a.get(15, 5, 5, &a_view));
    }

    #[test]
    fn test_diagonal_reads_do_not_chain() {
        let mut a = chunk_at(0, 0);
        let mut b = chunk_at(16, 0);
        link(&mut a, ChunkHandle(0), &mut b, ChunkHandle(1), Direction::XPOS);
        b.set(0, 10, 0, BlockType::STONE);

        let a_view = Neighborhood::new([Some(&b), None, None, None]);
        assert_eq!(a.get(16, 10, -1, &a_view), BlockType::UNKNOWN);
    }

    #[test]
    fn test_set_invalidates_and_reports_edge_neighbors() {
        let mut a = chunk_at(0, 0);
        let mut b = chunk_at(16, 0);
        link(&mut a, ChunkHandle(0), &mut b, ChunkHandle(1), Direction::XPOS);

        let interior = a.set(7, 100, 7, BlockType::DIRT);
        assert!(interior.is_empty());
        assert!(!a.is_cpu_mesh_valid());

        assert_eq!(a.set(15, 100, 7, BlockType::DIRT), vec![ChunkHandle(1)]);
        // x == 0 has no linked neighbor on this side
        assert!(a.set(0, 100, 7, BlockType::DIRT).is_empty());
    }

    #[test]
    fn test_noop_set_keeps_mesh_valid() {
        let mut chunk = chunk_at(0, 0);
        chunk.install_blocks(BlockGrid::new());
        let revision = chunk.revision();
        assert!(chunk.store_mesh(Arc::new(ChunkMesh::default()), revision));

        assert!(chunk.set(15, 3, 0, BlockType::EMPTY).is_empty());
        assert!(chunk.is_cpu_mesh_valid());
        assert_eq!(chunk.revision(), revision);
    }

    #[test]
    fn test_stale_mesh_is_not_marked_valid() {
        let mut chunk = chunk_at(0, 0);
        chunk.install_blocks(BlockGrid::new());
        let read_at = chunk.revision();
        chunk.set(1, 1, 1, BlockType::SAND);

        assert!(!chunk.store_mesh(Arc::new(ChunkMesh::default()), read_at));
        assert!(!chunk.is_cpu_mesh_valid());
        assert_eq!(chunk.stage(), ChunkStage::Generated);
    }

    #[test]
    fn test_stage_progression_and_release() {
        let mut chunk = chunk_at(0, 0);
        assert_eq!(chunk.stage(), ChunkStage::NotGenerated);
        chunk.begin_generation();
        chunk.install_blocks(BlockGrid::new());
        assert_eq!(chunk.stage(), ChunkStage::Generated);

        let revision = chunk.revision();
        chunk.store_mesh(Arc::new(ChunkMesh::default()), revision);
        chunk.mark_uploaded();
        assert_eq!(chunk.stage(), ChunkStage::Uploaded);
        assert!(chunk.is_gpu_resource_valid());

        chunk.release_geometry();
        assert_eq!(chunk.stage(), ChunkStage::Generated);
        assert!(!chunk.is_gpu_resource_valid());
        assert!(chunk.mesh().is_none());
    }

    #[test]
    fn test_snapshot_keeps_cells_and_drops_geometry() {
        let mut chunk = chunk_at(32, -16);
        chunk.install_blocks(BlockGrid::new());
        chunk.set(4, 90, 4, BlockType::CACTUS);
        let revision = chunk.revision();
        chunk.store_mesh(Arc::new(ChunkMesh::default()), revision);

        let copy = chunk.snapshot();
        assert_eq!(copy.coord(), chunk.coord());
        assert!(copy.blocks() == chunk.blocks());
        assert_eq!(copy.revision(), revision);
        assert!(copy.mesh().is_none());
        assert!(!copy.is_cpu_mesh_valid());

        chunk.set(4, 91, 4, BlockType::CACTUS);
        assert_eq!(copy.get_local(4, 91, 4), BlockType::EMPTY);
    }
}
