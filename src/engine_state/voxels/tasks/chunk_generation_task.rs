//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which produces the voxels of one chunk
//! coordinate off the main thread. It is scheduled by the orchestrator when the viewer's
//! neighbourhood contains a chunk the world does not have yet.

use std::sync::Arc;

use cgmath::Point2;
use log::{debug, error};

use crate::engine_state::{
    overlay::OverlayData,
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{
        block::BlockTypeSize,
        chunk::{coordinates::chunk_origin, ChunkDimensions},
        generation::{overlay::apply_overlay, terrain::TerrainGenerator},
    },
};

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating base terrain for the chunk
/// 2. Stamping the overlay on top, when one was available at request time
/// 3. Handing the voxels back for insertion on the main thread
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    position: Point2<i32>,
    dimensions: ChunkDimensions,
    generator: Arc<TerrainGenerator>,
    overlay: Option<Arc<OverlayData>>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates to generate
    /// * `dimensions` - The world's chunk size
    /// * `generator` - Shared terrain generator
    /// * `overlay` - Footprints to stamp, if loaded
    pub fn new(
        position: Point2<i32>,
        dimensions: ChunkDimensions,
        generator: Arc<TerrainGenerator>,
        overlay: Option<Arc<OverlayData>>,
    ) -> Self {
        ChunkGenerationTask {
            position,
            dimensions,
            generator,
            overlay,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let origin = chunk_origin(&self.dimensions, self.position);
        let mut voxels = self
            .generator
            .generate(origin.x, origin.y, origin.z, &self.dimensions);

        if let Some(overlay) = &self.overlay {
            let stamped = apply_overlay(&mut voxels, overlay, self.position, &self.dimensions);
            if stamped > 0 {
                debug!("Stamped {} overlay voxels into chunk {:?}", stamped, self.position);
            }
        }

        Box::new(ChunkGenerationTaskResult {
            position: self.position,
            voxels,
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    position: Point2<i32>,
    voxels: Vec<BlockTypeSize>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Inserts the chunk unless it appeared in the world meanwhile (loaded from a save,
    /// or generated by an earlier duplicate request); in that case the result is dropped.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        context.orchestrator.finish_generation(self.position);

        if context.world.has_chunk(self.position) {
            debug!("Discarding generated chunk {:?}: already present", self.position);
            return Vec::new();
        }

        if let Err(e) = context.world.put_chunk(self.position, self.voxels) {
            error!("Generated chunk {:?} rejected: {}", self.position, e);
        }
        Vec::new()
    }
}
