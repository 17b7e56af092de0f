//! Mesh generation for voxel rendering.
//!
//! This module converts a chunk's dense voxel array into a face-culled triangle mesh
//! whose index buffer is split into per-material groups, so a consumer can draw one
//! chunk with one geometry and several materials.
//!
//! # Architecture
//! - [`Mesh`]: vertices, indices and material groups of one chunk
//! - [`Face`]: a single unit quad on one side of a voxel
//! - [`Material`]: the block type to material bucket mapping shared with the renderer
//!
//! # Usage
//! ```
//! use buckland_blocks::engine_state::rendering::meshing::Mesh;
//! use buckland_blocks::engine_state::voxels::chunk::ChunkDimensions;
//!
//! let dims = ChunkDimensions::new(2, 2, 2);
//! let mut voxels = dims.air_array();
//! voxels[0] = 3; // stone
//! let mesh = Mesh::build(&voxels, &dims);
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use face::{Face, QUAD_UVS};
pub use mesh::*;
