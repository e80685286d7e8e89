//! # Streaming Controller
//!
//! Once per tick the controller compares the zone window around the
//! observer's current position with the window around its previous position
//! and moves chunks through the pipeline:
//!
//! 1. chunks of zones leaving the window release their geometry,
//! 2. already-generated zones entering the window are meshed again,
//! 3. zones in the window that were never generated are dispatched,
//! 4. freshly generated chunks are meshed, and their resident neighbors are
//!    meshed again to close the seam,
//! 5. finished meshes inside the window are uploaded.
//!
//! Cell data is never evicted; only geometry churns.

use std::collections::HashSet;

use cgmath::Point3;
use log::{debug, info};

use crate::{
    core::Result,
    engine_state::{
        rendering::{
            tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask, RenderGateway,
        },
        task_management::TaskManager,
        voxels::{
            chunk::{ChunkHandle, ChunkStage, ZoneCoord},
            world::World,
        },
    },
};

/// Zone-level work for one tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamingPlan {
    /// Zones in the previous window but not the current one.
    pub release: Vec<ZoneCoord>,
    /// Generated zones entering the window.
    pub remesh: Vec<ZoneCoord>,
    /// Zones in the current window never dispatched for generation.
    pub generate: Vec<ZoneCoord>,
}

/// Decides which zones to release, remesh and generate.
///
/// # Arguments
/// * `current` / `previous` - Zones of the observer this tick and last tick
/// * `radius` - Half-width of the window in zones
/// * `is_generated` - Whether a zone was already dispatched for generation
pub fn plan(
    current: ZoneCoord,
    previous: ZoneCoord,
    radius: i32,
    is_generated: impl Fn(ZoneCoord) -> bool,
) -> StreamingPlan {
    let current_zones = current.zones_around(radius);
    let previous_zones = previous.zones_around(radius);
    let current_keys: HashSet<i64> = current_zones.iter().map(|z| z.key()).collect();
    let previous_keys: HashSet<i64> = previous_zones.iter().map(|z| z.key()).collect();

    let mut plan = StreamingPlan {
        release: previous_zones
            .into_iter()
            .filter(|zone| !current_keys.contains(&zone.key()))
            .collect(),
        ..Default::default()
    };

    for zone in current_zones {
        if !is_generated(zone) {
            plan.generate.push(zone);
        } else if !previous_keys.contains(&zone.key()) {
            plan.remesh.push(zone);
        }
    }
    plan
}

/// What one tick did, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Zones that left the window.
    pub zones_released: usize,
    /// Chunks whose backend geometry was released.
    pub chunks_released: usize,
    /// Zones sent to the workers for generation.
    pub zones_dispatched: usize,
    /// Mesh tasks published.
    pub meshes_dispatched: usize,
    /// Generation results drained.
    pub chunks_generated: usize,
    /// Mesh results drained.
    pub meshes_received: usize,
    /// Chunks whose meshes went to the backend.
    pub meshes_uploaded: usize,
    /// Mesh results dropped because the cells changed after they were read.
    pub stale_meshes: usize,
}

/// Keeps a square window of zones around the observer generated, meshed and
/// resident, and releases what falls out of it.
pub struct StreamingController {
    radius: i32,
    visible_zones: Vec<ZoneCoord>,
    visible_keys: HashSet<i64>,
}

impl StreamingController {
    /// A controller with an empty window. Negative radii count as zero.
    pub fn new(radius: i32) -> Self {
        StreamingController {
            radius: radius.max(0),
            visible_zones: Vec::new(),
            visible_keys: HashSet::new(),
        }
    }

    /// Half-width of the window in zones.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Zones of the window as of the last tick.
    pub fn visible_zones(&self) -> &[ZoneCoord] {
        &self.visible_zones
    }

    /// Whether `zone` was in the window at the last tick.
    pub fn is_zone_visible(&self, zone: ZoneCoord) -> bool {
        self.visible_keys.contains(&zone.key())
    }

    /// Chunks in the window whose geometry is resident in the backend, zone
    /// by zone.
    pub fn drawable_chunks(&self, world: &World) -> Vec<ChunkHandle> {
        self.visible_zones
            .iter()
            .flat_map(|&zone| world.zone_chunks(zone))
            .filter(|&handle| {
                world
                    .chunk(handle)
                    .is_some_and(|chunk| chunk.get().is_gpu_resource_valid())
            })
            .collect()
    }

    /// Runs one streaming step.
    ///
    /// # Errors
    /// `InvariantViolation` if a task result names a chunk the world does not
    /// hold. Nothing else in here can fail.
    pub fn tick<G: RenderGateway>(
        &mut self,
        world: &mut World,
        task_manager: &mut TaskManager,
        gateway: &mut G,
        current: Point3<f32>,
        previous: Point3<f32>,
    ) -> Result<TickReport> {
        let mut report = TickReport::default();
        let current_zone = ZoneCoord::of_position(current);
        let previous_zone = ZoneCoord::of_position(previous);

        let plan = plan(current_zone, previous_zone, self.radius, |zone| {
            world.is_zone_generated(zone)
        });
        self.visible_zones = current_zone.zones_around(self.radius);
        self.visible_keys = self.visible_zones.iter().map(|z| z.key()).collect();

        for &zone in &plan.release {
            report.zones_released += 1;
            for handle in world.zone_chunks(zone) {
                let was_resident = {
                    let mut chunk = world.resolve(handle)?.get_mut();
                    let resident = chunk.is_gpu_resource_valid();
                    chunk.release_geometry();
                    resident
                };
                if was_resident {
                    gateway.release_gpu_resources(handle);
                    report.chunks_released += 1;
                }
            }
        }

        let mut dispatched = HashSet::new();
        for &zone in &plan.remesh {
            for handle in world.zone_chunks(zone) {
                self.dispatch_mesh(world, task_manager, handle, &mut dispatched, &mut report);
            }
        }

        for &zone in &plan.generate {
            if world.ensure_zone_generated(zone, task_manager) {
                report.zones_dispatched += 1;
            }
        }

        task_manager.process_completed_tasks();

        for generated in task_manager.drain_generated() {
            report.chunks_generated += 1;
            self.dispatch_mesh(world, task_manager, generated.handle, &mut dispatched, &mut report);

            // neighbors meshed while this chunk was missing show a seam
            let links = world.resolve(generated.handle)?.get().neighbors();
            for neighbor in links.into_iter().flatten() {
                let resident = {
                    let mut chunk = world.resolve(neighbor)?.get_mut();
                    if chunk.stage() < ChunkStage::Generated {
                        continue;
                    }
                    chunk.invalidate_mesh();
                    chunk.is_gpu_resource_valid()
                };
                if resident {
                    self.dispatch_mesh(world, task_manager, neighbor, &mut dispatched, &mut report);
                }
            }
        }

        for meshed in task_manager.drain_meshed() {
            report.meshes_received += 1;
            let handle = meshed.handle;
            let resource = world.resolve(handle)?;
            let mut chunk = resource.get_mut();
            let in_view = self.is_zone_visible(chunk.coord().zone());

            if chunk.is_cpu_mesh_valid()
                && chunk.is_gpu_resource_valid()
                && chunk.revision() == meshed.revision
            {
                // duplicate of what is already resident
                continue;
            }

            if !chunk.store_mesh(meshed.mesh.clone(), meshed.revision) {
                drop(chunk);
                report.stale_meshes += 1;
                if in_view {
                    self.dispatch_mesh(world, task_manager, handle, &mut dispatched, &mut report);
                }
                continue;
            }

            if in_view {
                gateway.upload_opaque(handle, &meshed.mesh.opaque);
                gateway.upload_transparent(handle, &meshed.mesh.transparent);
                chunk.mark_uploaded();
                report.meshes_uploaded += 1;
            }
        }

        if report.zones_dispatched > 0 || report.zones_released > 0 {
            info!(
                "Observer in zone ({}, {}): {} zones dispatched, {} released",
                current_zone.x, current_zone.z, report.zones_dispatched, report.zones_released
            );
        }
        debug!("{report:?}");
        Ok(report)
    }

    /// Dispatches meshing for edited chunks that sit inside the window.
    /// Chunks outside it are picked up when their zone re-enters.
    ///
    /// # Returns
    /// The number of mesh tasks published.
    pub fn remesh(
        &self,
        world: &World,
        task_manager: &mut TaskManager,
        handles: &[ChunkHandle],
    ) -> usize {
        let mut report = TickReport::default();
        let mut dispatched = HashSet::new();
        for &handle in handles {
            let visible = world
                .chunk(handle)
                .is_some_and(|chunk| self.is_zone_visible(chunk.get().coord().zone()));
            if visible {
                self.dispatch_mesh(world, task_manager, handle, &mut dispatched, &mut report);
            }
        }
        report.meshes_dispatched
    }

    /// Publishes a mesh task for `handle` once per tick, if its cells are final.
    fn dispatch_mesh(
        &self,
        world: &World,
        task_manager: &mut TaskManager,
        handle: ChunkHandle,
        dispatched: &mut HashSet<ChunkHandle>,
        report: &mut TickReport,
    ) {
        if !dispatched.insert(handle) {
            return;
        }
        match world.generated_chunk(handle) {
            Some(chunk) => {
                task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(chunk)));
                report.meshes_dispatched += 1;
            }
            None => {
                dispatched.remove(&handle);
            }
        }
    }
}
