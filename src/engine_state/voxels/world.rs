//! # World Module
//!
//! This module provides the `World` struct, the single owner of authoritative voxel
//! state. It maps chunk coordinates to chunks and translates world voxel coordinates
//! into chunk-local array offsets.
//!
//! ## Architecture
//!
//! The world uses sparse storage: only chunks that were generated or loaded exist.
//! Chunks are never evicted. Only `set_voxel` and `put_chunk` mutate voxel data.
//!
//! ## Change Notification
//!
//! Edits and inserts record the touched chunk in a pending set. `flush_changes` hands
//! each pending chunk to every subscribed listener exactly once, so a batch of edits
//! to one chunk produces a single notification instead of one per voxel.
//!
//! ## Versions
//!
//! The world stamps every stored or edited chunk with a version drawn from one
//! counter that survives `clear`, so a mesh built before a restore can never match
//! a chunk inserted after it.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - Voxel arrays are copy-on-write (see `Chunk`), so readers on other threads hold
//!   snapshots while the main thread keeps editing

use std::collections::{hash_map::Entry, HashMap, HashSet};
use std::fmt;

use cgmath::{Point2, Point3};
use log::debug;

use super::block::{block_type::BlockType, BlockTypeSize};
use super::chunk::{coordinates, Chunk, ChunkDimensions};

/// Callback invoked with the position of each changed chunk.
pub type ChunkListener = Box<dyn FnMut(Point2<i32>) + Send>;

/// Errors raised by chunk insertion.
#[derive(Debug, PartialEq, Eq)]
pub enum WorldError {
    /// The voxel array does not match the world's chunk dimensions.
    VoxelCount { expected: usize, actual: usize },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::VoxelCount { expected, actual } => write!(
                f,
                "voxel array holds {actual} voxels, chunk needs {expected}"
            ),
        }
    }
}

impl std::error::Error for WorldError {}

/// Represents a voxel world composed of chunks.
///
/// # Examples
///
/// ```
/// use buckland_blocks::engine_state::voxels::{
///     block::block_type::BlockType,
///     chunk::ChunkDimensions,
///     world::World,
/// };
/// use cgmath::Point2;
///
/// let dims = ChunkDimensions::default();
/// let mut world = World::new(dims);
/// world.put_chunk(Point2::new(0, 0), dims.air_array()).unwrap();
///
/// world.set_voxel(1, 2, 3, BlockType::STONE);
/// assert_eq!(world.get_voxel(1, 2, 3), BlockType::STONE);
/// ```
pub struct World {
    dimensions: ChunkDimensions,
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<Point2<i32>, Chunk>,
    listeners: Vec<ChunkListener>,
    changed: Vec<Point2<i32>>,
    changed_set: HashSet<Point2<i32>>,
    last_version: u64,
}

impl World {
    /// Creates a new, empty world.
    ///
    /// # Arguments
    ///
    /// * `dimensions` - Size shared by every chunk of this world
    pub fn new(dimensions: ChunkDimensions) -> Self {
        World {
            dimensions,
            chunks: HashMap::new(),
            listeners: Vec::new(),
            changed: Vec::new(),
            changed_set: HashSet::new(),
            last_version: 0,
        }
    }

    pub fn dimensions(&self) -> &ChunkDimensions {
        &self.dimensions
    }

    /// Returns the block at a world voxel coordinate.
    ///
    /// Absent chunks and coordinates outside the world height read as air; this
    /// never fails.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> BlockType {
        let Some(split) = coordinates::world_to_local(&self.dimensions, Point3::new(x, y, z)) else {
            return BlockType::AIR;
        };
        match self.chunks.get(&split.chunk) {
            Some(chunk) => chunk.block_at(self.local_index(&split.local)),
            None => BlockType::AIR,
        }
    }

    /// Writes a block at a world voxel coordinate.
    ///
    /// Edits never create chunks: if the owning chunk is absent, or `y` is outside
    /// the world height, nothing happens. Otherwise the chunk is marked dirty and
    /// queued for change notification, even when the voxel already held `block_type`.
    ///
    /// # Returns
    ///
    /// `true` if a voxel changed.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        let Some(split) = coordinates::world_to_local(&self.dimensions, Point3::new(x, y, z)) else {
            return false;
        };
        let index = self.local_index(&split.local);
        let Some(chunk) = self.chunks.get_mut(&split.chunk) else {
            return false;
        };
        let changed = chunk.set_block_at(index, block_type);
        if changed {
            self.last_version += 1;
            chunk.version = self.last_version;
        }
        self.record_change(split.chunk);
        changed
    }

    pub fn has_chunk(&self, position: Point2<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Inserts or replaces a chunk's voxel data and clears its dirty flag.
    ///
    /// Used by generation and by save loading.
    ///
    /// # Errors
    ///
    /// `WorldError::VoxelCount` if `voxels` does not hold exactly one byte per voxel.
    pub fn put_chunk(
        &mut self,
        position: Point2<i32>,
        voxels: Vec<BlockTypeSize>,
    ) -> Result<(), WorldError> {
        let expected = self.dimensions.volume();
        if voxels.len() != expected {
            return Err(WorldError::VoxelCount {
                expected,
                actual: voxels.len(),
            });
        }
        self.last_version += 1;
        match self.chunks.entry(position) {
            Entry::Occupied(mut entry) => {
                let chunk = entry.get_mut();
                chunk.replace_voxels(voxels);
                chunk.version = self.last_version;
            }
            Entry::Vacant(entry) => {
                let mut chunk = Chunk::new(position, voxels);
                chunk.version = self.last_version;
                entry.insert(chunk);
            }
        }
        debug!("Chunk {:?} stored", position);
        self.record_change(position);
        Ok(())
    }

    /// Flags a chunk's mesh as stale. Idempotent; absent chunks are ignored.
    pub fn mark_dirty(&mut self, position: Point2<i32>) {
        if let Some(chunk) = self.chunks.get_mut(&position) {
            chunk.dirty = true;
            self.record_change(position);
        }
    }

    /// Clears the dirty flag once a rebuild has been scheduled.
    pub fn clear_dirty(&mut self, position: Point2<i32>) {
        if let Some(chunk) = self.chunks.get_mut(&position) {
            chunk.dirty = false;
        }
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    pub fn get_chunk_at(&self, position: Point2<i32>) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Registers a listener for chunk-changed notifications.
    pub fn subscribe(&mut self, listener: ChunkListener) {
        self.listeners.push(listener);
    }

    /// Delivers pending chunk changes to every listener, once per chunk.
    ///
    /// # Returns
    ///
    /// The number of distinct chunks that changed since the previous flush.
    pub fn flush_changes(&mut self) -> usize {
        let changed = std::mem::take(&mut self.changed);
        self.changed_set.clear();
        for position in &changed {
            for listener in self.listeners.iter_mut() {
                listener(*position);
            }
        }
        changed.len()
    }

    /// Drops every chunk and pending notification. Listeners stay subscribed and the
    /// version counter keeps counting.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.changed.clear();
        self.changed_set.clear();
    }

    fn record_change(&mut self, position: Point2<i32>) {
        if self.changed_set.insert(position) {
            self.changed.push(position);
        }
    }

    fn local_index(&self, local: &Point3<usize>) -> usize {
        self.dimensions.index(local.x, local.y, local.z)
    }
}
