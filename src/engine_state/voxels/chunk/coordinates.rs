//! World, chunk and local coordinate transforms.
//!
//! Chunk keys use floor division, so negative world coordinates land in negative
//! chunks and local coordinates are always inside `[0, width) x [0, height) x [0, depth)`.
//! The Y axis is not chunked.

use cgmath::{Point2, Point3};

use super::ChunkDimensions;

/// A voxel position split into its chunk key and the offset inside that chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocalPosition {
    pub chunk: Point2<i32>,
    pub local: Point3<usize>,
}

/// Chunk coordinate containing world column `(x, z)`.
pub fn world_to_chunk(dimensions: &ChunkDimensions, x: i32, z: i32) -> Point2<i32> {
    Point2::new(
        x.div_euclid(dimensions.width as i32),
        z.div_euclid(dimensions.depth as i32),
    )
}

/// Splits a world voxel coordinate into chunk key and local offset.
///
/// # Returns
/// `None` when `y` is outside the world height.
pub fn world_to_local(dimensions: &ChunkDimensions, world: Point3<i32>) -> Option<LocalPosition> {
    if world.y < 0 || world.y as usize >= dimensions.height {
        return None;
    }
    let chunk = world_to_chunk(dimensions, world.x, world.z);
    Some(LocalPosition {
        chunk,
        local: Point3::new(
            world.x.rem_euclid(dimensions.width as i32) as usize,
            world.y as usize,
            world.z.rem_euclid(dimensions.depth as i32) as usize,
        ),
    })
}

/// Inverse of `world_to_local`.
pub fn local_to_world(dimensions: &ChunkDimensions, position: &LocalPosition) -> Point3<i32> {
    let origin = chunk_origin(dimensions, position.chunk);
    Point3::new(
        origin.x + position.local.x as i32,
        position.local.y as i32,
        origin.z + position.local.z as i32,
    )
}

/// World-space coordinate of a chunk's local voxel (0, 0, 0).
pub fn chunk_origin(dimensions: &ChunkDimensions, chunk: Point2<i32>) -> Point3<i32> {
    Point3::new(
        chunk.x * dimensions.width as i32,
        0,
        chunk.y * dimensions.depth as i32,
    )
}

/// Chunk containing a floating point world position, e.g. the camera.
pub fn chunk_of_position(dimensions: &ChunkDimensions, x: f32, z: f32) -> Point2<i32> {
    world_to_chunk(dimensions, x.floor() as i32, z.floor() as i32)
}
