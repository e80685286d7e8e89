//! # World Module
//!
//! The `World` owns every chunk ever instantiated, the set of zones already
//! handed to the generator, and the generator itself.
//!
//! ## Architecture
//!
//! Chunks live in an arena (`Vec<MtResource<Chunk>>`) and are addressed by
//! [`ChunkHandle`]. A hash map from chunk key to handle gives O(1) lookup by
//! coordinate. Neighbor links are handles into the same arena, so they can
//! never dangle. Chunks are never removed; leaving the view only releases
//! their geometry.
//!
//! ## Threading
//!
//! The arena, the key map and the zone set are touched only by the owning
//! thread. Chunk contents are shared with workers through `MtResource`:
//!
//! - a generation task writes a chunk once, under a brief write lock, to
//!   install the cells it built while the chunk was `Generating`,
//! - mesh tasks copy a chunk and then each generated neighbor, one shared
//!   lock at a time, and extract geometry from the copies,
//! - the owning thread edits cells through `set_block_at`, taking one write
//!   lock at a time, and refuses edits to chunks that are not generated yet.
//!
//! No lock is held across a second lock acquisition or across generation
//! and meshing work, so the scheme cannot deadlock and the owning thread only
//! ever waits for a copy to finish.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info};

use crate::{
    core::{Error, MtResource, Result},
    engine_state::{
        task_management::TaskManager,
        voxels::{
            block::{block_type::BlockType, direction::Direction},
            chunk::{Chunk, ChunkCoord, ChunkHandle, ChunkStage, ZoneCoord, CHUNK_HEIGHT},
            tasks::chunk_generation_task::ChunkGenerationTask,
            terrain::Generator,
        },
    },
};

/// A chunk whose cells are final, bundled with its linked neighbors.
///
/// Only [`World::generated_chunk`] builds one, and only for chunks at
/// `ChunkStage::Generated` or later. A mesh task takes one of these, so a
/// chunk cannot be meshed before it is generated.
pub struct GeneratedChunk {
    handle: ChunkHandle,
    chunk: MtResource<Chunk>,
    neighbors: [Option<MtResource<Chunk>>; 4],
}

impl GeneratedChunk {
    /// Arena handle of the chunk to mesh.
    pub fn handle(&self) -> ChunkHandle {
        self.handle
    }

    /// The chunk to mesh.
    pub fn chunk(&self) -> &MtResource<Chunk> {
        &self.chunk
    }

    /// Lateral neighbors linked when this token was made, in
    /// `Direction::lateral_index` order. A neighbor may still be generating;
    /// the mesh task checks its stage when it reads it.
    pub fn neighbors(&self) -> &[Option<MtResource<Chunk>>; 4] {
        &self.neighbors
    }
}

/// The first solid cell along a picking ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World coordinate of the hit cell.
    pub block: Point3<i32>,
    /// Distance travelled along the ray, never more than the ray length.
    pub distance: f32,
    /// Axis (0 = x, 1 = y, 2 = z) whose cell boundary the ray crossed last.
    pub axis: usize,
}

/// The sparse voxel world.
pub struct World {
    chunks: Vec<MtResource<Chunk>>,
    chunk_handles: HashMap<i64, ChunkHandle>,
    generated_zones: HashSet<i64>,
    generator: Arc<Generator>,
}

impl World {
    /// Creates a world with no chunks.
    pub fn new(generator: Arc<Generator>) -> Self {
        World {
            chunks: Vec::new(),
            chunk_handles: HashMap::new(),
            generated_zones: HashSet::new(),
            generator,
        }
    }

    /// The generator every zone of this world is built with.
    pub fn generator(&self) -> &Arc<Generator> {
        &self.generator
    }

    /// Number of chunks instantiated so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Whether a chunk holds world column `(x, z)`.
    pub fn has_chunk_at(&self, x: i32, z: i32) -> bool {
        self.chunk_handles
            .contains_key(&ChunkCoord::containing(x, z).key())
    }

    /// Handle of the chunk holding world column `(x, z)`.
    pub fn chunk_handle_at(&self, x: i32, z: i32) -> Option<ChunkHandle> {
        self.chunk_handles
            .get(&ChunkCoord::containing(x, z).key())
            .copied()
    }

    /// The chunk behind `handle`, if it belongs to this world.
    pub fn chunk(&self, handle: ChunkHandle) -> Option<&MtResource<Chunk>> {
        self.chunks.get(handle.index())
    }

    /// Like [`World::chunk`], but a foreign handle is an invariant violation.
    pub fn resolve(&self, handle: ChunkHandle) -> Result<&MtResource<Chunk>> {
        self.chunk(handle).ok_or_else(|| {
            Error::InvariantViolation(format!("{handle:?} is not in the chunk arena"))
        })
    }

    /// Handles of the instantiated chunks of `zone`, x-major.
    pub fn zone_chunks(&self, zone: ZoneCoord) -> Vec<ChunkHandle> {
        zone.chunks()
            .filter_map(|coord| self.chunk_handles.get(&coord.key()).copied())
            .collect()
    }

    /// Reads the cell at world `(x, y, z)`.
    ///
    /// # Errors
    /// `OutOfBounds` if no chunk holds the column. Callers on hot paths
    /// should check [`World::has_chunk_at`] first.
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> Result<BlockType> {
        let handle = self
            .chunk_handle_at(x, z)
            .ok_or(Error::OutOfBounds { x, y, z })?;
        let coord = ChunkCoord::containing(x, z);
        let chunk = self.chunks[handle.index()].get();
        Ok(chunk.get_local((x - coord.x) as usize, y, (z - coord.z) as usize))
    }

    /// Writes the cell at world `(x, y, z)`.
    ///
    /// Writing the kind a cell already holds changes nothing. Otherwise the
    /// chunk's mesh is invalidated, and so is the mesh of any linked neighbor
    /// sharing the face the cell sits on.
    ///
    /// # Returns
    /// Every chunk whose mesh the write made stale, the edited chunk first.
    ///
    /// # Errors
    /// `OutOfBounds` if no chunk holds the column, the chunk's cells are not
    /// generated yet, or `y` is outside the world.
    pub fn set_block_at(
        &self,
        x: i32,
        y: i32,
        z: i32,
        block_type: BlockType,
    ) -> Result<Vec<ChunkHandle>> {
        let handle = self
            .chunk_handle_at(x, z)
            .filter(|_| (0..CHUNK_HEIGHT).contains(&y))
            .ok_or(Error::OutOfBounds { x, y, z })?;
        let coord = ChunkCoord::containing(x, z);

        let (changed, neighbors) = {
            let mut chunk = self.chunks[handle.index()].get_mut();
            // the generation task owns the cells until it installs them
            if chunk.stage() < ChunkStage::Generated {
                return Err(Error::OutOfBounds { x, y, z });
            }
            let before = chunk.revision();
            let neighbors = chunk.set(
                (x - coord.x) as usize,
                y as usize,
                (z - coord.z) as usize,
                block_type,
            );
            (chunk.revision() != before, neighbors)
        };
        if !changed {
            return Ok(Vec::new());
        }

        for &neighbor in &neighbors {
            self.resolve(neighbor)?.get_mut().invalidate_mesh();
        }

        let mut affected = Vec::with_capacity(1 + neighbors.len());
        affected.push(handle);
        affected.extend(neighbors);
        Ok(affected)
    }

    /// Creates an empty chunk at `coord` and links it with every lateral
    /// neighbor that already exists.
    ///
    /// Returns the existing handle unchanged if `coord` is already present.
    pub fn instantiate_chunk_at(&mut self, coord: ChunkCoord) -> ChunkHandle {
        if let Some(&existing) = self.chunk_handles.get(&coord.key()) {
            return existing;
        }

        let handle = ChunkHandle(self.chunks.len() as u32);
        self.chunks.push(MtResource::new(Chunk::new(coord)));
        self.chunk_handles.insert(coord.key(), handle);

        for direction in Direction::lateral() {
            let step = direction.offset();
            let neighbor_key = coord.offset(step.x, step.z).key();
            if let Some(&neighbor) = self.chunk_handles.get(&neighbor_key) {
                self.link(handle, neighbor, direction);
            }
        }
        handle
    }

    /// Links `a` to `b` as its neighbor in `direction`, and `b` back to `a`.
    /// Both meshes are invalidated.
    pub fn link_neighbors(
        &self,
        a: ChunkHandle,
        b: ChunkHandle,
        direction: Direction,
    ) -> Result<()> {
        self.resolve(a)?;
        self.resolve(b)?;
        if a == b || direction.lateral_index().is_none() {
            return Err(Error::InvariantViolation(format!(
                "cannot link {a:?} to {b:?} along {direction:?}"
            )));
        }
        self.link(a, b, direction);
        Ok(())
    }

    fn link(&self, a: ChunkHandle, b: ChunkHandle, direction: Direction) {
        self.chunks[a.index()].get_mut().set_neighbor(direction, b);
        self.chunks[b.index()]
            .get_mut()
            .set_neighbor(direction.opposite(), a);
    }

    /// Whether `zone` was ever dispatched for generation.
    pub fn is_zone_generated(&self, zone: ZoneCoord) -> bool {
        self.generated_zones.contains(&zone.key())
    }

    /// Dispatches generation of `zone` unless it was dispatched before.
    ///
    /// The zone is recorded before the task is published, so at most one
    /// generation task per zone ever exists. Missing chunks of the zone are
    /// instantiated and linked first.
    ///
    /// # Returns
    /// `true` if a task was dispatched.
    pub fn ensure_zone_generated(&mut self, zone: ZoneCoord, task_manager: &mut TaskManager) -> bool {
        if !self.generated_zones.insert(zone.key()) {
            return false;
        }

        let mut chunks = Vec::with_capacity(16);
        for coord in zone.chunks() {
            let handle = self.instantiate_chunk_at(coord);
            let chunk = self.chunks[handle.index()].clone();
            chunk.get_mut().begin_generation();
            chunks.push((handle, chunk));
        }

        debug!("Dispatching generation of zone ({}, {})", zone.x, zone.z);
        task_manager.publish_task(Box::new(ChunkGenerationTask::new(
            zone,
            chunks,
            self.generator.clone(),
        )));
        true
    }

    /// Number of zones dispatched for generation so far.
    pub fn generated_zone_count(&self) -> usize {
        self.generated_zones.len()
    }

    /// A meshing token for `handle`, or `None` while its cells are not final.
    pub fn generated_chunk(&self, handle: ChunkHandle) -> Option<GeneratedChunk> {
        let chunk = self.chunk(handle)?.clone();
        let links = {
            let locked = chunk.get();
            if locked.stage() < ChunkStage::Generated {
                return None;
            }
            locked.neighbors()
        };

        let neighbors = links.map(|link| link.and_then(|neighbor| self.chunk(neighbor)).cloned());

        Some(GeneratedChunk {
            handle,
            chunk,
            neighbors,
        })
    }

    /// Marches a ray through the voxel grid and returns the first solid cell.
    ///
    /// The ray starts at `origin` and runs for `direction.magnitude()`
    /// units. Water, lava and empty cells are passed through, and so are
    /// columns with no chunk.
    ///
    /// A ray passing exactly through a cell edge or corner steps one axis at
    /// a time, lowest axis first.
    ///
    /// # Errors
    /// `InvariantViolation` if no axis boundary can be found to step to,
    /// which only happens for non-finite input.
    pub fn grid_march(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Result<Option<RayHit>> {
        let max_len = direction.magnitude();
        if max_len <= 0.0 || max_len.is_nan() {
            return Ok(None);
        }
        let direction = direction.normalize();

        let mut position = origin;
        let mut cell = Point3::new(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        );
        let mut travelled = 0.0_f32;

        while travelled < max_len {
            let mut min_t = f32::INFINITY;
            let mut crossing = None;

            for axis in 0..3 {
                if direction[axis] == 0.0 {
                    continue;
                }
                let mut offset = direction[axis].signum().max(0.0);
                // sitting exactly on a boundary while heading negative
                if cell[axis] as f32 == position[axis] && offset == 0.0 {
                    offset = -1.0;
                }
                let intercept = cell[axis] as f32 + offset;
                let axis_t = (intercept - position[axis]) / direction[axis];
                // ties go to the lowest axis
                if axis_t < min_t {
                    min_t = axis_t;
                    crossing = Some((axis, intercept));
                }
            }

            let (axis, intercept) = crossing.ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "grid march from {origin:?} along {direction:?} found no axis to cross"
                ))
            })?;

            travelled += min_t;
            if travelled > max_len {
                break;
            }
            position += direction * min_t;
            position[axis] = intercept;

            cell = Point3::new(
                position.x.floor() as i32,
                position.y.floor() as i32,
                position.z.floor() as i32,
            );
            if direction[axis] < 0.0 {
                cell[axis] -= 1;
            }

            let block = if self.has_chunk_at(cell.x, cell.z) {
                self.get_block_at(cell.x, cell.y, cell.z)?
            } else {
                BlockType::EMPTY
            };

            if block.is_pickable() && block.is_material() {
                return Ok(Some(RayHit {
                    block: cell,
                    distance: travelled,
                    axis,
                }));
            }
        }

        Ok(None)
    }

    /// Logs a one-line summary of the world's size.
    pub fn log_summary(&self) {
        info!(
            "World holds {} chunks across {} generated zones",
            self.chunks.len(),
            self.generated_zones.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TerrainConfig;
    use crate::engine_state::voxels::chunk::BlockGrid;
    use std::time::{Duration, Instant};

    fn world() -> World {
        World::new(Arc::new(Generator::new(TerrainConfig::default())))
    }

    /// Instantiates a chunk and fills it with `grid` as if a task had run.
    fn install(world: &mut World, x: i32, z: i32, grid: BlockGrid) -> ChunkHandle {
        let handle = world.instantiate_chunk_at(ChunkCoord { x, z });
        let chunk = world.chunk(handle).unwrap();
        chunk.get_mut().begin_generation();
        chunk.get_mut().install_blocks(grid);
        handle
    }

    #[test]
    fn test_instantiation_links_neighbors_mutually() {
        let mut world = world();
        let a = world.instantiate_chunk_at(ChunkCoord { x: 0, z: 0 });
        let b = world.instantiate_chunk_at(ChunkCoord { x: 16, z: 0 });
        let c = world.instantiate_chunk_at(ChunkCoord { x: 0, z: -16 });

        let chunk_a = world.chunk(a).unwrap().get();
        assert_eq!(chunk_a.neighbor(Direction::XPOS), Some(b));
        assert_eq!(chunk_a.neighbor(Direction::ZNEG), Some(c));
        assert_eq!(chunk_a.neighbor(Direction::XNEG), None);
        drop(chunk_a);

        assert_eq!(world.chunk(b).unwrap().get().neighbor(Direction::XNEG), Some(a));
        assert_eq!(world.chunk(c).unwrap().get().neighbor(Direction::ZPOS), Some(a));
        // diagonal chunks are never linked
        assert_eq!(world.chunk(b).unwrap().get().neighbor(Direction::ZNEG), None);
    }

    #[test]
    fn test_instantiate_twice_returns_same_handle() {
        let mut world = world();
        let coord = ChunkCoord { x: 32, z: 48 };
        let first = world.instantiate_chunk_at(coord);
        assert_eq!(world.instantiate_chunk_at(coord), first);
        assert_eq!(world.chunk_count(), 1);
    }

    #[test]
    fn test_link_neighbors_is_symmetric_and_invalidates() {
        let mut world = world();
        let a = install(&mut world, 0, 0, BlockGrid::new());
        let b = install(&mut world, 160, 160, BlockGrid::new());
        let revision = world.chunk(a).unwrap().get().revision();

        world.link_neighbors(a, b, Direction::ZPOS).unwrap();

        assert_eq!(world.chunk(a).unwrap().get().neighbor(Direction::ZPOS), Some(b));
        assert_eq!(world.chunk(b).unwrap().get().neighbor(Direction::ZNEG), Some(a));
        assert!(world.chunk(a).unwrap().get().revision() > revision);
        assert!(world.link_neighbors(a, a, Direction::XPOS).is_err());
        assert!(world.link_neighbors(a, b, Direction::YPOS).is_err());
    }

    #[test]
    fn test_block_queries_follow_bounds_contract() {
        let mut world = world();
        install(&mut world, 0, 0, BlockGrid::new());

        assert!(matches!(
            world.get_block_at(100, 10, 3),
            Err(Error::OutOfBounds { x: 100, y: 10, z: 3 })
        ));
        assert_eq!(world.get_block_at(3, -1, 3).unwrap(), BlockType::UNKNOWN);
        assert_eq!(world.get_block_at(3, 256, 3).unwrap(), BlockType::EMPTY);
        assert!(world.set_block_at(100, 10, 3, BlockType::DIRT).is_err());
        assert!(world.set_block_at(3, 256, 3, BlockType::DIRT).is_err());
    }

    #[test]
    fn test_set_block_reports_affected_chunks() {
        let mut world = world();
        let a = install(&mut world, 0, 0, BlockGrid::new());
        let b = install(&mut world, -16, 0, BlockGrid::new());

        assert_eq!(world.set_block_at(5, 70, 5, BlockType::STONE).unwrap(), vec![a]);
        assert_eq!(world.get_block_at(5, 70, 5).unwrap(), BlockType::STONE);
        // same kind again is a no-op
        assert!(world.set_block_at(5, 70, 5, BlockType::STONE).unwrap().is_empty());

        let revision_b = world.chunk(b).unwrap().get().revision();
        assert_eq!(world.set_block_at(0, 70, 5, BlockType::STONE).unwrap(), vec![a, b]);
        assert!(world.chunk(b).unwrap().get().revision() > revision_b);

        // negative world coordinates land in the chunk at -16
        assert_eq!(world.set_block_at(-1, 70, 5, BlockType::SAND).unwrap(), vec![b, a]);
        assert_eq!(world.get_block_at(-1, 70, 5).unwrap(), BlockType::SAND);
    }

    #[test]
    fn test_edits_wait_for_generated_cells() {
        let mut world = world();
        let handle = world.instantiate_chunk_at(ChunkCoord { x: 0, z: 0 });
        assert!(matches!(
            world.set_block_at(5, 250, 5, BlockType::PUMPKIN),
            Err(Error::OutOfBounds { x: 5, y: 250, z: 5 })
        ));

        world.chunk(handle).unwrap().get_mut().begin_generation();
        assert!(world.set_block_at(5, 250, 5, BlockType::PUMPKIN).is_err());
        assert_eq!(world.get_block_at(5, 250, 5).unwrap(), BlockType::EMPTY);

        let mut generated = BlockGrid::new();
        generated.set(5, 250, 5, BlockType::SNOW);
        world.chunk(handle).unwrap().get_mut().install_blocks(generated);
        assert_eq!(world.get_block_at(5, 250, 5).unwrap(), BlockType::SNOW);

        assert_eq!(world.set_block_at(5, 250, 5, BlockType::PUMPKIN).unwrap(), vec![handle]);
        assert_eq!(world.get_block_at(5, 250, 5).unwrap(), BlockType::PUMPKIN);
    }

    #[test]
    fn test_generated_chunk_requires_final_cells() {
        let mut world = world();
        let a = world.instantiate_chunk_at(ChunkCoord { x: 0, z: 0 });
        assert!(world.generated_chunk(a).is_none());

        let b = install(&mut world, 16, 0, BlockGrid::new());
        world.chunk(a).unwrap().get_mut().begin_generation();

        let token = world.generated_chunk(b).unwrap();
        assert_eq!(token.handle(), b);
        let xneg = Direction::XNEG.lateral_index().unwrap();
        assert!(token.neighbors()[xneg]
            .as_ref()
            .unwrap()
            .ptr_eq(world.chunk(a).unwrap()));
        assert_eq!(token.neighbors().iter().flatten().count(), 1);
    }

    #[test]
    fn test_zone_generation_dispatches_once() {
        let mut world = world();
        let mut task_manager = TaskManager::new(2);
        let zone = ZoneCoord { x: -64, z: 0 };

        assert!(world.ensure_zone_generated(zone, &mut task_manager));
        assert!(!world.ensure_zone_generated(zone, &mut task_manager));
        assert!(world.is_zone_generated(zone));
        assert_eq!(world.zone_chunks(zone).len(), 16);

        let deadline = Instant::now() + Duration::from_secs(120);
        let mut posted = 0;
        while posted < 16 {
            assert!(Instant::now() < deadline, "zone never finished generating");
            task_manager.process_completed_tasks();
            posted += task_manager.drain_generated().len();
            std::thread::sleep(Duration::from_millis(5));
        }

        for handle in world.zone_chunks(zone) {
            let chunk = world.chunk(handle).unwrap().get();
            assert_eq!(chunk.stage(), ChunkStage::Generated);
            assert_eq!(chunk.blocks().get(0, 0, 0), BlockType::BEDROCK);
        }
    }

    fn stone_at(cells: &[(usize, usize, usize, BlockType)]) -> BlockGrid {
        let mut grid = BlockGrid::new();
        for &(x, y, z, kind) in cells {
            grid.set(x, y, z, kind);
        }
        grid
    }

    #[test]
    fn test_grid_march_hits_first_solid_cell() {
        let mut world = world();
        install(
            &mut world,
            0,
            0,
            stone_at(&[(3, 10, 0, BlockType::WATER), (5, 10, 0, BlockType::STONE)]),
        );

        let hit = world
            .grid_march(Point3::new(0.5, 10.5, 0.5), Vector3::new(10.0, 0.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(hit.block, Point3::new(5, 10, 0));
        assert_eq!(hit.axis, 0);
        assert!((hit.distance - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_grid_march_negative_direction() {
        let mut world = world();
        install(&mut world, 0, 0, stone_at(&[(1, 10, 0, BlockType::DIRT)]));

        let hit = world
            .grid_march(Point3::new(5.5, 10.5, 0.5), Vector3::new(-10.0, 0.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(hit.block, Point3::new(1, 10, 0));
        assert!((hit.distance - 3.5).abs() < 1e-4);
    }

    #[test]
    fn test_grid_march_misses() {
        let mut world = world();
        install(&mut world, 0, 0, stone_at(&[(9, 10, 0, BlockType::STONE)]));

        // too short to reach the stone
        let short = world.grid_march(Point3::new(0.5, 10.5, 0.5), Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(short.unwrap(), None);
        // unloaded columns are empty space
        let outside = world.grid_march(Point3::new(0.5, 10.5, 0.5), Vector3::new(-8.0, 0.0, 0.0));
        assert_eq!(outside.unwrap(), None);
        let zero = world.grid_march(Point3::new(0.5, 10.5, 0.5), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(zero.unwrap(), None);
    }

    #[test]
    fn test_grid_march_through_cell_corners() {
        let mut world = world();
        install(&mut world, 0, 0, stone_at(&[(3, 13, 3, BlockType::STONE)]));

        let hit = world
            .grid_march(Point3::new(0.0, 10.0, 0.0), Vector3::new(5.0, 5.0, 5.0))
            .unwrap()
            .unwrap();
        assert_eq!(hit.block, Point3::new(3, 13, 3));
        assert!((hit.distance - 3.0 * 3.0_f32.sqrt()).abs() < 1e-3);

        let short = world.grid_march(Point3::new(1.0, 10.0, 1.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(short.unwrap(), None);
        let falling = world.grid_march(Point3::new(2.0, 20.0, 2.0), Vector3::new(3.0, -3.0, 3.0));
        assert_eq!(falling.unwrap(), None);
    }

    #[test]
    fn test_grid_march_degenerate_direction_is_an_invariant_violation() {
        let world = world();
        let result = world.grid_march(
            Point3::new(0.5, 10.5, 0.5),
            Vector3::new(f32::INFINITY, 0.0, 0.0),
        );
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }
}
