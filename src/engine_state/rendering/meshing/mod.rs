//! Mesh generation and management for voxel rendering.
//!
//! This module turns chunk voxels into per-chunk meshes and keeps the most recently
//! built ones around for whatever draws them.
//!
//! # Architecture
//! - `MeshManager`: decides which chunks need a rebuild, schedules the builds as
//!   background tasks and caches the results
//! - `mesh/`: the face-culling mesher and its data structures
//!
//! # Rebuild Rules
//! A chunk is rebuilt when it is dirty, has never been meshed, or its cached mesh was
//! built from an older voxel version. The dirty flag is consumed when the build is
//! scheduled; a build whose version no longer matches the chunk is dropped and the
//! chunk is picked up again on the next pass.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use cgmath::{Point2, Point3};
use log::debug;
use lru::LruCache;

mod mesh;

pub use mesh::*;

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
    task_management::TaskManager,
    voxels::{
        chunk::{coordinates::chunk_origin, Chunk},
        world::World,
    },
};

/// A built mesh together with where it goes and what it was built from.
#[derive(Debug, Clone)]
pub struct ChunkMesh {
    /// World position of the chunk's (0, 0, 0) voxel
    pub origin: Point3<i32>,
    /// Chunk version the mesh was built from
    pub version: u64,
    pub mesh: Mesh,
}

/// Central manager for chunk meshes.
///
/// # Memory Management
/// Meshes live in an LRU cache sized to the rendered square, with some slack, so
/// chunks that drop out of view are the first to go.
pub struct MeshManager {
    /// LRU cache of built meshes by chunk position
    meshes: LruCache<Point2<i32>, ChunkMesh>,
    /// Chunks with a build task out
    in_flight: HashSet<Point2<i32>>,
}

impl MeshManager {
    /// Extra cache room beyond the rendered square.
    const CACHE_SLACK: usize = 8;

    /// Creates a manager whose cache holds every chunk within `view_distance`.
    pub fn new(view_distance: i32) -> Self {
        let side = (2 * view_distance.max(0) + 1) as usize;
        let capacity = NonZeroUsize::new(side * side + Self::CACHE_SLACK).unwrap_or(NonZeroUsize::MIN);

        MeshManager {
            meshes: LruCache::new(capacity),
            in_flight: HashSet::new(),
        }
    }

    /// `true` if the chunk at `position` should be (re)meshed and no build is pending.
    pub fn needs_mesh(&self, position: Point2<i32>, chunk: &Chunk) -> bool {
        if self.in_flight.contains(&position) {
            return false;
        }
        match self.meshes.peek(&position) {
            Some(cached) => chunk.dirty || cached.version != chunk.version,
            None => true,
        }
    }

    /// Publishes build tasks for every listed chunk that needs one.
    ///
    /// # Arguments
    /// * `positions` - Chunks to consider, in priority order
    /// * `world` - Source of voxels; dirty flags of scheduled chunks are cleared
    /// * `task_manager` - Where the builds run
    ///
    /// # Returns
    /// Number of builds scheduled.
    pub fn schedule_rebuilds(
        &mut self,
        positions: &[Point2<i32>],
        world: &mut World,
        task_manager: &mut TaskManager,
    ) -> usize {
        let dimensions = *world.dimensions();
        let mut scheduled = 0;

        for &position in positions {
            let Some(chunk) = world.get_chunk_at(position) else {
                continue;
            };
            if !self.needs_mesh(position, chunk) {
                continue;
            }

            let task = ChunkMeshGenerationTask::new(
                position,
                chunk.version,
                chunk_origin(&dimensions, position),
                chunk.snapshot(),
                dimensions,
            );
            world.clear_dirty(position);
            self.in_flight.insert(position);
            task_manager.publish_task(Box::new(task));
            scheduled += 1;
        }

        if scheduled > 0 {
            debug!("Scheduled {} mesh rebuilds", scheduled);
        }
        scheduled
    }

    /// Stores a finished build and marks it no longer pending.
    pub fn insert(&mut self, position: Point2<i32>, chunk_mesh: ChunkMesh) {
        self.in_flight.remove(&position);
        self.meshes.put(position, chunk_mesh);
    }

    /// Marks a pending build as abandoned so the chunk can be scheduled again.
    pub fn cancel(&mut self, position: Point2<i32>) {
        self.in_flight.remove(&position);
    }

    pub fn is_in_flight(&self, position: Point2<i32>) -> bool {
        self.in_flight.contains(&position)
    }

    /// Cached mesh for a chunk, without touching its recency.
    pub fn get(&self, position: Point2<i32>) -> Option<&ChunkMesh> {
        self.meshes.peek(&position)
    }

    /// `(origin, mesh)` for each listed chunk that has a mesh, in the given order.
    ///
    /// Listed chunks are marked as recently used.
    pub fn meshes_for(&mut self, positions: &[Point2<i32>]) -> Vec<(Point3<i32>, &Mesh)> {
        for position in positions {
            self.meshes.promote(position);
        }
        positions
            .iter()
            .filter_map(|position| self.meshes.peek(position))
            .map(|cached| (cached.origin, &cached.mesh))
            .collect()
    }

    pub fn remove(&mut self, position: Point2<i32>) {
        self.meshes.pop(&position);
        self.in_flight.remove(&position);
    }

    /// Drops every mesh and pending build.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.in_flight.clear();
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.meshes.cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::ChunkDimensions};

    fn cached(version: u64) -> ChunkMesh {
        ChunkMesh {
            origin: Point3::new(0, 0, 0),
            version,
            mesh: Mesh::new(),
        }
    }

    #[test]
    fn capacity_covers_the_view_square() {
        assert_eq!(MeshManager::new(4).capacity(), 81 + MeshManager::CACHE_SLACK);
        assert_eq!(MeshManager::new(0).capacity(), 1 + MeshManager::CACHE_SLACK);
    }

    #[test]
    fn unmeshed_dirty_and_outdated_chunks_need_a_mesh() {
        let dims = ChunkDimensions::new(2, 2, 2);
        let position = Point2::new(0, 0);
        let mut chunk = Chunk::empty(position, &dims);
        let mut manager = MeshManager::new(1);

        assert!(manager.needs_mesh(position, &chunk));

        manager.insert(position, cached(chunk.version));
        assert!(!manager.needs_mesh(position, &chunk));

        chunk.set_block_at(0, BlockType::DIRT);
        assert!(manager.needs_mesh(position, &chunk));

        chunk.dirty = false;
        assert!(manager.needs_mesh(position, &chunk), "version moved on");
    }

    #[test]
    fn in_flight_chunks_are_not_scheduled_twice() {
        let dims = ChunkDimensions::new(2, 2, 2);
        let mut world = World::new(dims);
        let position = Point2::new(3, -1);
        world.put_chunk(position, dims.air_array()).unwrap();
        world.flush_changes();

        let mut manager = MeshManager::new(1);
        let mut tasks = TaskManager::new(0);

        assert_eq!(manager.schedule_rebuilds(&[position, Point2::new(9, 9)], &mut world, &mut tasks), 1);
        assert!(manager.is_in_flight(position));
        assert!(!world.get_chunk_at(position).unwrap().dirty);
        assert_eq!(manager.schedule_rebuilds(&[position], &mut world, &mut tasks), 0);

        manager.cancel(position);
        assert_eq!(manager.schedule_rebuilds(&[position], &mut world, &mut tasks), 1);
    }

    #[test]
    fn meshes_for_keeps_order_and_skips_missing() {
        let mut manager = MeshManager::new(1);
        let a = Point2::new(0, 0);
        let b = Point2::new(1, 0);
        manager.insert(b, ChunkMesh { origin: Point3::new(16, 0, 0), ..cached(1) });
        manager.insert(a, cached(1));

        let origins: Vec<_> = manager
            .meshes_for(&[b, Point2::new(5, 5), a])
            .into_iter()
            .map(|(origin, _)| origin)
            .collect();
        assert_eq!(origins, vec![Point3::new(16, 0, 0), Point3::new(0, 0, 0)]);
    }
}
