//! # World Orchestrator
//!
//! Decides which chunks must exist around the viewer and keeps the render list.
//!
//! Each tick the viewer's chunk is recomputed; only when it changes is the square
//! neighbourhood within the view distance rebuilt (nearest chunks first) and
//! generation requested for every chunk the world does not hold. Chunks that leave the
//! neighbourhood stay resident in the world; they only drop off the render list.
//!
//! The orchestrator also owns the current overlay. Overlay requests carry an id, and a
//! result is accepted only for the latest id.

use std::collections::HashSet;
use std::sync::Arc;

use cgmath::{Point2, Point3};
use log::{debug, info};

use crate::engine_state::{
    overlay::OverlayData,
    task_management::TaskManager,
    voxels::{
        chunk::{coordinates::chunk_of_position, ChunkDimensions},
        generation::terrain::TerrainGenerator,
        tasks::chunk_generation_task::ChunkGenerationTask,
        world::World,
    },
};

/// Default number of chunks rendered in each direction around the viewer.
pub const VIEW_DISTANCE: i32 = 4;

pub struct WorldOrchestrator {
    dimensions: ChunkDimensions,
    view_distance: i32,
    /// Viewer chunk of the last residency pass
    center: Option<Point2<i32>>,
    /// Current render list, nearest first
    rendered: Vec<Point2<i32>>,
    /// Chunks with a generation task out
    pending: HashSet<Point2<i32>>,
    generator: Arc<TerrainGenerator>,
    overlay: Option<Arc<OverlayData>>,
    overlay_request_id: u64,
}

impl WorldOrchestrator {
    pub fn new(generator: TerrainGenerator, dimensions: ChunkDimensions, view_distance: i32) -> Self {
        WorldOrchestrator {
            dimensions,
            view_distance: view_distance.max(0),
            center: None,
            rendered: Vec::new(),
            pending: HashSet::new(),
            generator: Arc::new(generator),
            overlay: None,
            overlay_request_id: 0,
        }
    }

    /// Recomputes residency if the viewer entered a new chunk.
    ///
    /// # Arguments
    /// * `viewer` - Viewer world position
    /// * `world` - Checked for chunks that already exist
    /// * `task_manager` - Receives generation tasks for missing chunks
    ///
    /// # Returns
    /// `true` if the viewer chunk changed and the render list was rebuilt.
    pub fn update(&mut self, viewer: Point3<f32>, world: &World, task_manager: &mut TaskManager) -> bool {
        let chunk = chunk_of_position(&self.dimensions, viewer.x, viewer.z);
        if self.center == Some(chunk) {
            return false;
        }

        self.center = Some(chunk);
        self.rendered = neighbourhood(chunk, self.view_distance);
        let requested = self.request_missing(world, task_manager);
        debug!(
            "Viewer entered chunk {:?}: {} rendered, {} requested",
            chunk,
            self.rendered.len(),
            requested
        );
        true
    }

    /// Forgets the last viewer chunk so the next `update` runs a full residency pass.
    pub fn invalidate(&mut self) {
        self.center = None;
    }

    /// Publishes generation for every rendered chunk that is neither present nor pending.
    fn request_missing(&mut self, world: &World, task_manager: &mut TaskManager) -> usize {
        let mut requested = 0;
        for &position in &self.rendered {
            if world.has_chunk(position) || !self.pending.insert(position) {
                continue;
            }
            task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                position,
                self.dimensions,
                Arc::clone(&self.generator),
                self.overlay.clone(),
            )));
            requested += 1;
        }
        requested
    }

    /// Called when a generation result comes back, used or not.
    pub fn finish_generation(&mut self, position: Point2<i32>) {
        self.pending.remove(&position);
    }

    /// Starts a new overlay request, superseding any earlier one.
    ///
    /// # Returns
    /// The id the matching fetch must report back with.
    pub fn begin_overlay_request(&mut self) -> u64 {
        self.overlay_request_id += 1;
        self.overlay_request_id
    }

    /// Applies an overlay fetch outcome; `None` means no overlay is available.
    ///
    /// # Returns
    /// `false` if the result belongs to a superseded request and was dropped.
    pub fn accept_overlay(&mut self, request_id: u64, overlay: Option<OverlayData>) -> bool {
        if request_id != self.overlay_request_id {
            info!(
                "Dropping overlay result {} (latest request is {})",
                request_id, self.overlay_request_id
            );
            return false;
        }
        self.overlay = overlay.map(Arc::new);
        true
    }

    pub fn overlay(&self) -> Option<&OverlayData> {
        self.overlay.as_deref()
    }

    pub fn center(&self) -> Option<Point2<i32>> {
        self.center
    }

    pub fn rendered(&self) -> &[Point2<i32>] {
        &self.rendered
    }

    pub fn is_pending(&self, position: Point2<i32>) -> bool {
        self.pending.contains(&position)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }
}

/// Every chunk within Chebyshev distance `view_distance` of `center`, nearest first.
///
/// Ties are broken by Euclidean distance, then by coordinate, so the order is stable.
pub fn neighbourhood(center: Point2<i32>, view_distance: i32) -> Vec<Point2<i32>> {
    let mut offsets = Vec::with_capacity(((2 * view_distance + 1) * (2 * view_distance + 1)) as usize);
    for dx in -view_distance..=view_distance {
        for dz in -view_distance..=view_distance {
            offsets.push((dx, dz));
        }
    }
    offsets.sort_by_key(|&(dx, dz)| (dx.abs().max(dz.abs()), dx * dx + dz * dz, dx, dz));
    offsets
        .into_iter()
        .map(|(dx, dz)| Point2::new(center.x + dx, center.y + dz))
        .collect()
}
