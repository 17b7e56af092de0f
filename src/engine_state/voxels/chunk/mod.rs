//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size column of voxels spanning the
//! full world height, addressed by its `(chunk_x, chunk_z)` coordinate.
//!
//! ## Storage Layout
//!
//! Each chunk owns one dense array with one `BlockTypeSize` byte per voxel. The index of
//! local voxel `(x, y, z)` is `x + y * width + z * width * height`, so X varies fastest,
//! then Y, then Z. The array length always equals `width * height * depth` and is never
//! resized after creation.
//!
//! ## Copy-on-Write
//!
//! The array lives behind an `Arc`. Readers such as mesh tasks clone the `Arc` and work
//! on that snapshot; an edit goes through `Arc::make_mut`, which copies the array first
//! if any snapshot is still alive. A reader therefore never observes a half-written array.
//!
//! ### Performance Characteristics
//! - **Voxel Lookup**: O(1)
//! - **Snapshot**: O(1), one reference count increment
//! - **First edit after a snapshot**: O(n) copy of the array

use std::sync::Arc;

use cgmath::{Point2, Point3};
use serde::{Deserialize, Serialize};

use super::block::{block_type::BlockType, BlockTypeSize};

pub mod chunk_iteration;
pub mod coordinates;

/// Default chunk width (X) in voxels.
pub const CHUNK_WIDTH: usize = 16;
/// Default chunk height (Y) in voxels; chunks span the whole world height.
pub const CHUNK_HEIGHT: usize = 128;
/// Default chunk depth (Z) in voxels.
pub const CHUNK_DEPTH: usize = 16;

/// Immutable snapshot of a chunk's voxel bytes.
pub type VoxelArray = Arc<Vec<BlockTypeSize>>;

/// The size of every chunk in a world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkDimensions {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        Self {
            width: CHUNK_WIDTH,
            height: CHUNK_HEIGHT,
            depth: CHUNK_DEPTH,
        }
    }
}

impl ChunkDimensions {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self { width, height, depth }
    }

    /// Number of voxels in one chunk.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Array index of a local coordinate.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Local coordinates, each inside the chunk bounds
    ///
    /// # Returns
    /// `x + y * width + z * width * height`
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.width + z * self.width * self.height
    }

    /// Same as `index`, but for signed coordinates that may fall outside the chunk.
    #[inline]
    pub fn checked_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if self.contains_local(x, y, z) {
            Some(self.index(x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    /// `true` when the signed local coordinate lies inside the chunk.
    #[inline]
    pub fn contains_local(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    /// A fresh all-air voxel array of the right length.
    pub fn air_array(&self) -> Vec<BlockTypeSize> {
        vec![BlockType::AIR.to_byte(); self.volume()]
    }
}

/// A `width x height x depth` column of voxels in the world.
///
/// Chunks are the unit of world storage and of mesh rebuilds. A chunk is created on the
/// first reference to its coordinate (generation or load) and is never evicted.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates `(chunk_x, chunk_z)`.
    pub position: Point2<i32>,

    voxels: VoxelArray,

    /// Set when the voxels changed since the last mesh was scheduled.
    pub dirty: bool,

    /// Moves on every change (the world stamps it from a counter shared by all its
    /// chunks); lets mesh results built from an older snapshot be dropped.
    pub version: u64,
}

impl Chunk {
    /// Wraps a voxel array into a clean chunk.
    ///
    /// # Arguments
    /// * `position` - Chunk coordinate
    /// * `voxels` - Dense voxel bytes; the caller guarantees the length matches the world's dimensions
    pub fn new(position: Point2<i32>, voxels: Vec<BlockTypeSize>) -> Self {
        Chunk {
            position,
            voxels: Arc::new(voxels),
            dirty: false,
            version: 0,
        }
    }

    /// An all-air chunk.
    pub fn empty(position: Point2<i32>, dimensions: &ChunkDimensions) -> Self {
        Chunk::new(position, dimensions.air_array())
    }

    /// Read access to the voxel bytes.
    pub fn voxels(&self) -> &[BlockTypeSize] {
        &self.voxels
    }

    /// A cheap shared snapshot of the voxel bytes for use on another thread.
    pub fn snapshot(&self) -> VoxelArray {
        Arc::clone(&self.voxels)
    }

    /// The block at `index`, air when the index is out of range.
    pub fn block_at(&self, index: usize) -> BlockType {
        self.voxels
            .get(index)
            .map(|byte| BlockType::from_byte(*byte))
            .unwrap_or(BlockType::AIR)
    }

    /// Writes one voxel, copying the array first if a snapshot still shares it.
    ///
    /// Any in-range write marks the chunk dirty. The version only moves when the byte
    /// actually changes. Returns `true` if the voxel changed; an out-of-range index
    /// leaves the chunk untouched.
    pub fn set_block_at(&mut self, index: usize, block_type: BlockType) -> bool {
        let byte = block_type.to_byte();
        let Some(&current) = self.voxels.get(index) else {
            return false;
        };
        self.dirty = true;
        if current == byte {
            return false;
        }
        Arc::make_mut(&mut self.voxels)[index] = byte;
        self.version += 1;
        true
    }

    /// Replaces all voxel data and clears the dirty flag.
    pub fn replace_voxels(&mut self, voxels: Vec<BlockTypeSize>) {
        self.voxels = Arc::new(voxels);
        self.dirty = false;
        self.version += 1;
    }

    /// World-space position of local voxel (0, 0, 0).
    pub fn world_origin(&self, dimensions: &ChunkDimensions) -> Point3<i32> {
        coordinates::chunk_origin(dimensions, self.position)
    }
}
