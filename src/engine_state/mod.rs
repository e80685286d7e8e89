//! # Engine State Module
//!
//! Ties the terrain pipeline together around one owning thread.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the worker pool, the streaming controller
//!   and the render backend
//! * `rendering` - Mesh extraction and the render backend seam
//! * `streaming` - Per-tick decisions about what to generate, mesh and release
//! * `task_management` - The worker pool and its typed result queues
//! * `voxels` - Blocks, chunks, terrain generation and the world
//!
//! ## Architecture
//!
//! Every mutation of the chunk arena and every call into the render backend
//! happens on the thread that owns the `EngineState`. Workers only generate
//! cells and extract meshes, then post results that the next `tick` drains.
//!
//! ## Example
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_terrain::core::EngineConfig;
//! use voxel_terrain::engine_state::{rendering::RecordingGateway, EngineState};
//!
//! let mut engine = EngineState::new(EngineConfig::default(), RecordingGateway::new());
//! let mut previous = Point3::new(0.0, 180.0, 0.0);
//! for step in 0..100 {
//!     let current = Point3::new(step as f32, 180.0, 0.0);
//!     engine.tick(current, previous).unwrap();
//!     engine.draw(&());
//!     previous = current;
//! }
//! ```

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::info;

use crate::core::{EngineConfig, Result};

use rendering::RenderGateway;
use streaming::{StreamingController, TickReport};
use task_management::TaskManager;
use voxels::{block::block_type::BlockType, terrain::Generator, world::World};

pub mod rendering;
pub mod streaming;
pub mod task_management;
pub mod voxels;

/// The owning-thread side of the terrain pipeline.
///
/// Generic over the render backend so the same pipeline drives a GPU backend
/// or the headless `RecordingGateway`.
pub struct EngineState<G: RenderGateway> {
    config: EngineConfig,
    world: World,
    task_manager: TaskManager,
    streaming: StreamingController,
    gateway: G,
}

impl<G: RenderGateway> EngineState<G> {
    /// Builds the pipeline and starts the worker pool.
    ///
    /// # Arguments
    ///
    /// * `config` - Window radius, worker count and terrain parameters
    /// * `gateway` - The render backend that receives uploads and draws
    pub fn new(config: EngineConfig, gateway: G) -> Self {
        let generator = Arc::new(Generator::new(config.terrain.clone()));
        let world = World::new(generator);
        let task_manager = TaskManager::new(config.worker_count);
        let streaming = StreamingController::new(config.render_radius_zones);

        info!(
            "Engine started: radius {} zones, {} workers, seed {}",
            config.render_radius_zones, config.worker_count, config.terrain.seed
        );

        EngineState {
            config,
            world,
            task_manager,
            streaming,
            gateway,
        }
    }

    /// Advances streaming by one step for an observer that moved from
    /// `previous` to `current`.
    pub fn tick(&mut self, current: Point3<f32>, previous: Point3<f32>) -> Result<TickReport> {
        self.streaming.tick(
            &mut self.world,
            &mut self.task_manager,
            &mut self.gateway,
            current,
            previous,
        )
    }

    /// Draws every resident chunk in the window: all opaque meshes first,
    /// then all transparent ones.
    ///
    /// # Returns
    /// The number of chunks drawn.
    pub fn draw(&mut self, shader: &G::Shader) -> usize {
        let chunks = self.streaming.drawable_chunks(&self.world);
        for &chunk in &chunks {
            self.gateway.draw_opaque(chunk, shader);
        }
        for &chunk in &chunks {
            self.gateway.draw_transparent(chunk, shader);
        }
        chunks.len()
    }

    /// Whether a chunk is instantiated over world column `(x, z)`.
    pub fn has_chunk_at(&self, x: i32, z: i32) -> bool {
        self.world.has_chunk_at(x, z)
    }

    /// The block at a world cell. `OutOfBounds` if no chunk holds it.
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> Result<BlockType> {
        self.world.get_block_at(x, y, z)
    }

    /// Writes one cell and schedules meshing for every chunk it affected.
    pub fn set_block_at(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<()> {
        let affected = self.world.set_block_at(x, y, z, block_type)?;
        self.streaming
            .remesh(&self.world, &mut self.task_manager, &affected);
        Ok(())
    }

    /// Clears the first solid cell along the ray, if any.
    ///
    /// # Returns
    /// The cell that was cleared.
    pub fn break_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Result<Option<Point3<i32>>> {
        let Some(hit) = self.world.grid_march(origin, direction)? else {
            return Ok(None);
        };
        self.set_block_at(hit.block.x, hit.block.y, hit.block.z, BlockType::EMPTY)?;
        Ok(Some(hit.block))
    }

    /// Places `block_type` against the face of the first solid cell the ray
    /// enters through.
    ///
    /// # Returns
    /// The cell that was filled, or `None` if the ray hit nothing or the cell
    /// in front of the face is already solid.
    pub fn place_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        block_type: BlockType,
    ) -> Result<Option<Point3<i32>>> {
        let Some(hit) = self.world.grid_march(origin, direction)? else {
            return Ok(None);
        };

        let mut target = hit.block;
        target[hit.axis] -= direction[hit.axis].signum() as i32;

        let current = self.world.get_block_at(target.x, target.y, target.z)?;
        if current.is_material() && current.is_pickable() {
            return Ok(None);
        }
        self.set_block_at(target.x, target.y, target.z, block_type)?;
        Ok(Some(target))
    }

    /// `true` when no generation or meshing work is queued or running.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the chunk arena.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The streaming controller and its current window.
    pub fn streaming(&self) -> &StreamingController {
        &self.streaming
    }

    /// The render backend.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the render backend.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }
}
