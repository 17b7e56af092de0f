//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which builds the face-culled mesh
//! of one chunk from a voxel snapshot. This keeps the tick responsive while meshing runs.

use cgmath::{Point2, Point3};
use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::{ChunkMesh, Mesh},
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::chunk::{ChunkDimensions, VoxelArray},
};

/// A task that generates mesh data for a chunk in a background thread.
///
/// The task owns a shared snapshot of the chunk's voxels, so edits made after it was
/// scheduled copy the array instead of racing with it.
pub struct ChunkMeshGenerationTask {
    position: Point2<i32>,
    /// Chunk version the snapshot was taken at
    version: u64,
    origin: Point3<i32>,
    voxels: VoxelArray,
    dimensions: ChunkDimensions,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `position` - Chunk coordinate
    /// * `version` - Chunk version at snapshot time
    /// * `origin` - World position of the chunk's first voxel
    /// * `voxels` - Snapshot of the chunk's voxels
    /// * `dimensions` - Size of the snapshot
    pub fn new(
        position: Point2<i32>,
        version: u64,
        origin: Point3<i32>,
        voxels: VoxelArray,
        dimensions: ChunkDimensions,
    ) -> Self {
        ChunkMeshGenerationTask {
            position,
            version,
            origin,
            voxels,
            dimensions,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let mesh = Mesh::build(&self.voxels, &self.dimensions);
        debug!(
            "Meshed chunk {:?}: {} quads in {:?}",
            self.position,
            mesh.quad_count(),
            start.elapsed()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            position: self.position,
            chunk_mesh: ChunkMesh {
                origin: self.origin,
                version: self.version,
                mesh,
            },
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    position: Point2<i32>,
    chunk_mesh: ChunkMesh,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Stores the mesh, unless the chunk was edited or removed after the snapshot.
    ///
    /// A stale build is dropped; the edit left the chunk dirty, so the next scheduling
    /// pass rebuilds it from fresh voxels.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        let current = context
            .world
            .get_chunk_at(self.position)
            .map(|chunk| chunk.version);

        if current == Some(self.chunk_mesh.version) {
            context.mesh_manager.insert(self.position, self.chunk_mesh);
        } else {
            debug!(
                "Discarding stale mesh for chunk {:?} (built from version {}, chunk at {:?})",
                self.position, self.chunk_mesh.version, current
            );
            context.mesh_manager.cancel(self.position);
        }
        Vec::new()
    }
}
