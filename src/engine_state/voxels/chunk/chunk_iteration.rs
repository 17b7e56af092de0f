//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air voxels of a dense voxel array.
//!
//! The iterator walks local coordinates with X outermost, then Y, then Z innermost,
//! which is the scan order the mesher emits quads in. Air voxels are skipped.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::ChunkDimensions;

/// An iterator over all non-air voxels of a voxel array.
///
/// Yields `(local position, block type)` pairs.
pub struct ChunkBlockIterator<'a> {
    /// The voxel bytes being iterated over
    voxels: &'a [BlockTypeSize],
    dimensions: ChunkDimensions,
    /// Current X position within the chunk
    local_x: usize,
    /// Current Y position within the chunk
    local_y: usize,
    /// Current Z position within the chunk
    local_z: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given voxel array.
    ///
    /// # Arguments
    /// * `voxels` - Dense voxel bytes laid out as `dimensions` describes
    /// * `dimensions` - The chunk size the array was built for
    ///
    /// # Returns
    /// A new `ChunkBlockIterator` positioned before the first voxel
    pub fn new(voxels: &'a [BlockTypeSize], dimensions: ChunkDimensions) -> Self {
        ChunkBlockIterator {
            voxels,
            dimensions,
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }

    fn advance(&mut self) {
        self.local_z += 1;
        if self.local_z == self.dimensions.depth {
            self.local_z = 0;
            self.local_y += 1;
            if self.local_y == self.dimensions.height {
                self.local_y = 0;
                self.local_x += 1;
            }
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        if self.dimensions.volume() == 0 {
            return None;
        }
        while self.local_x < self.dimensions.width {
            let (x, y, z) = (self.local_x, self.local_y, self.local_z);
            self.advance();

            let byte = *self.voxels.get(self.dimensions.index(x, y, z))?;
            let block_type = BlockType::from_byte(byte);
            if !block_type.is_air() {
                return Some((Point3::new(x, y, z), block_type));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_air_and_scans_x_outermost() {
        let dims = ChunkDimensions::new(2, 2, 2);
        let mut voxels = dims.air_array();
        voxels[dims.index(1, 0, 0)] = BlockType::DIRT.to_byte();
        voxels[dims.index(0, 0, 1)] = BlockType::STONE.to_byte();

        let found: Vec<_> = ChunkBlockIterator::new(&voxels, dims).collect();
        assert_eq!(
            found,
            vec![
                (Point3::new(0, 0, 1), BlockType::STONE),
                (Point3::new(1, 0, 0), BlockType::DIRT),
            ]
        );
    }

    #[test]
    fn all_air_yields_nothing() {
        let dims = ChunkDimensions::new(3, 5, 2);
        let voxels = dims.air_array();
        assert_eq!(ChunkBlockIterator::new(&voxels, dims).count(), 0);
    }
}
