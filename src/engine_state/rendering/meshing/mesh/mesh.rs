//! Mesh data structures and the face-culling mesher.
//!
//! This module converts a dense voxel array into a triangle mesh grouped by material.
//!
//! # Algorithm
//! Every voxel is visited in a fixed scan order (X outermost, then Y, then Z). Air is
//! skipped. For each of the six sides, a quad is emitted iff the neighbour across that
//! side is transparent; neighbours outside the array count as air. Each quad gets four
//! fresh vertices (no welding, since normals and UVs differ per face) and six indices,
//! and records one `(start, 6, material)` group.
//!
//! Transparency is resolved once per rebuild into a padded bit mask, the same wrapped
//! layout trick the engine uses for solidity, so neighbour checks never branch on bounds.

use bitvec::prelude::BitVec;
use serde::{Deserialize, Serialize};

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::{
    block::{self, block_side::BlockSide, block_type::BlockType, BlockTypeSize},
    chunk::{chunk_iteration::ChunkBlockIterator, ChunkDimensions},
};

use super::face::Face;

/// Indices of one quad relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Material buckets the renderer binds, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Material {
    Dirt = 0,
    Grass = 1,
    Stone = 2,
    Wood = 3,
    Sand = 4,
    Sky = 5,
}

/// Texture for each `Material`, indexed by material index.
pub const MATERIAL_TEXTURES: [&str; 6] = [
    "/textures/dirt.png",
    "/textures/grass.png",
    "/textures/stone.png",
    "/textures/wood.jpg",
    "/textures/sand.jpg",
    "/textures/sky.png",
];

impl Material {
    /// Material bucket of a block type; anything without its own bucket draws as dirt.
    pub fn from_block_type(block_type: BlockType) -> Self {
        match block_type {
            BlockType::GRASS => Material::Grass,
            BlockType::STONE | BlockType::COBBLESTONE => Material::Stone,
            BlockType::WOOD_LOG | BlockType::WOOD_PLANK | BlockType::WOOD => Material::Wood,
            BlockType::SAND => Material::Sand,
            BlockType::SKY => Material::Sky,
            _ => Material::Dirt,
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn texture(self) -> &'static str {
        MATERIAL_TEXTURES[self as usize]
    }
}

/// A contiguous range of the index buffer drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialGroup {
    /// First index of the range
    pub start: u32,
    /// Number of indices in the range
    pub count: u32,
    pub material_index: u32,
}

/// Renderable geometry for one chunk.
///
/// Derived and disposable: it is always rebuilt in full from the chunk's voxels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// One group per quad, in emission order
    pub groups: Vec<MaterialGroup>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Mesh::default()
    }

    /// Builds the face-culled mesh of a voxel array.
    ///
    /// # Arguments
    /// * `voxels` - Dense voxel bytes in the chunk layout
    /// * `dimensions` - Size the array was built with
    ///
    /// # Returns
    /// The mesh; empty when every voxel is air.
    pub fn build(voxels: &[BlockTypeSize], dimensions: &ChunkDimensions) -> Self {
        let see_through = TransparencyMask::new(voxels, dimensions);
        let mut mesh = Mesh::new();

        for (position, block_type) in ChunkBlockIterator::new(voxels, *dimensions) {
            let material = Material::from_block_type(block_type);
            for side in BlockSide::all() {
                let offset = side.offset();
                let neighbour = (
                    position.x as i32 + offset.x,
                    position.y as i32 + offset.y,
                    position.z as i32 + offset.z,
                );
                if see_through.get(neighbour.0, neighbour.1, neighbour.2) {
                    mesh.add_face(&Face::new(position, side, material));
                }
            }
        }

        mesh
    }

    /// Appends one quad, its two triangles and its material group.
    pub fn add_face(&mut self, face: &Face) {
        let base = self.vertices.len() as u32;
        let start = self.indices.len() as u32;

        self.vertices.extend_from_slice(&face.vertices());
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        self.groups.push(MaterialGroup {
            start,
            count: QUAD_INDICES.len() as u32,
            material_index: face.material.index(),
        });
    }

    pub fn quad_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Groups with neighbouring ranges of the same material merged, for issuing fewer
    /// draw calls.
    pub fn draw_ranges(&self) -> Vec<MaterialGroup> {
        let mut ranges: Vec<MaterialGroup> = Vec::new();
        for group in &self.groups {
            match ranges.last_mut() {
                Some(last)
                    if last.material_index == group.material_index
                        && last.start + last.count == group.start =>
                {
                    last.count += group.count;
                }
                _ => ranges.push(*group),
            }
        }
        ranges
    }
}

/// Transparency of every voxel plus a one-voxel transparent border.
struct TransparencyMask {
    bits: BitVec,
    wrapped_width: usize,
    wrapped_plane: usize,
    dimensions: ChunkDimensions,
}

impl TransparencyMask {
    fn new(voxels: &[BlockTypeSize], dimensions: &ChunkDimensions) -> Self {
        let wrapped_width = dimensions.width + 2;
        let wrapped_plane = wrapped_width * (dimensions.height + 2);
        let mut bits = BitVec::repeat(true, wrapped_plane * (dimensions.depth + 2));

        for z in 0..dimensions.depth {
            for y in 0..dimensions.height {
                for x in 0..dimensions.width {
                    let block_type = voxels
                        .get(dimensions.index(x, y, z))
                        .map(|byte| BlockType::from_byte(*byte))
                        .unwrap_or(BlockType::AIR);
                    let wrapped = (x + 1) + (y + 1) * wrapped_width + (z + 1) * wrapped_plane;
                    bits.set(wrapped, block::is_transparent(block_type));
                }
            }
        }

        TransparencyMask {
            bits,
            wrapped_width,
            wrapped_plane,
            dimensions: *dimensions,
        }
    }

    /// Transparency at a local coordinate that may sit one voxel outside the chunk.
    fn get(&self, x: i32, y: i32, z: i32) -> bool {
        let inside_border = x >= -1
            && y >= -1
            && z >= -1
            && x <= self.dimensions.width as i32
            && y <= self.dimensions.height as i32
            && z <= self.dimensions.depth as i32;
        if !inside_border {
            return true;
        }
        let wrapped = (x + 1) as usize
            + (y + 1) as usize * self.wrapped_width
            + (z + 1) as usize * self.wrapped_plane;
        self.bits[wrapped]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(dims: &ChunkDimensions, x: usize, y: usize, z: usize, block_type: BlockType) -> Vec<u8> {
        let mut voxels = dims.air_array();
        voxels[dims.index(x, y, z)] = block_type.to_byte();
        voxels
    }

    #[test]
    fn all_air_builds_an_empty_mesh() {
        for dims in [ChunkDimensions::default(), ChunkDimensions::new(1, 1, 1), ChunkDimensions::new(3, 7, 2)] {
            let mesh = Mesh::build(&dims.air_array(), &dims);
            assert!(mesh.is_empty());
            assert!(mesh.indices.is_empty());
            assert!(mesh.groups.is_empty());
        }
    }

    #[test]
    fn isolated_voxel_emits_six_quads() {
        let dims = ChunkDimensions::new(4, 4, 4);
        let mesh = Mesh::build(&single(&dims, 1, 1, 1, BlockType::STONE), &dims);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.groups.len(), 6);
        assert!(mesh.groups.iter().all(|g| g.count == 6 && g.material_index == 2));
    }

    #[test]
    fn voxel_on_the_chunk_edge_treats_outside_as_air() {
        let dims = ChunkDimensions::new(1, 1, 1);
        let mesh = Mesh::build(&single(&dims, 0, 0, 0, BlockType::DIRT), &dims);
        assert_eq!(mesh.quad_count(), 6);
    }

    #[test]
    fn shared_faces_between_opaque_voxels_are_culled() {
        let dims = ChunkDimensions::new(4, 4, 4);
        let mut voxels = single(&dims, 1, 1, 1, BlockType::DIRT);
        voxels[dims.index(2, 1, 1)] = BlockType::DIRT.to_byte();
        let mesh = Mesh::build(&voxels, &dims);
        assert_eq!(mesh.quad_count(), 10);
        assert_eq!(mesh.vertices.len(), 40);
    }

    #[test]
    fn faces_next_to_transparent_blocks_are_kept() {
        let dims = ChunkDimensions::new(4, 4, 4);
        let mut voxels = single(&dims, 1, 1, 1, BlockType::DIRT);
        voxels[dims.index(2, 1, 1)] = BlockType::GLASS.to_byte();
        let mesh = Mesh::build(&voxels, &dims);
        assert_eq!(mesh.quad_count(), 11);
    }

    #[test]
    fn quads_never_share_vertices() {
        let dims = ChunkDimensions::new(4, 4, 4);
        let mesh = Mesh::build(&single(&dims, 0, 0, 0, BlockType::SAND), &dims);
        for (quad, group) in mesh.groups.iter().enumerate() {
            let base = quad as u32 * 4;
            assert_eq!(group.start, quad as u32 * 6);
            assert_eq!(
                &mesh.indices[group.start as usize..(group.start + 6) as usize],
                &[base, base + 1, base + 2, base, base + 2, base + 3]
            );
            let uvs: Vec<_> = mesh.vertices[base as usize..base as usize + 4]
                .iter()
                .map(|v| v.tex_coords)
                .collect();
            assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        }
    }

    #[test]
    fn first_quad_is_the_front_face() {
        let dims = ChunkDimensions::new(2, 2, 2);
        let mesh = Mesh::build(&single(&dims, 0, 0, 0, BlockType::GRASS), &dims);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.groups[0].material_index, 1);
    }

    #[test]
    fn material_mapping() {
        assert_eq!(Material::from_block_type(BlockType::COBBLESTONE), Material::Stone);
        assert_eq!(Material::from_block_type(BlockType::WOOD_PLANK), Material::Wood);
        assert_eq!(Material::from_block_type(BlockType::BRICK), Material::Dirt);
        assert_eq!(Material::from_block_type(BlockType::LEAF).index(), 0);
        assert_eq!(Material::Sky.texture(), "/textures/sky.png");
    }

    #[test]
    fn draw_ranges_merge_runs_of_one_material() {
        let dims = ChunkDimensions::new(4, 4, 4);
        let mut voxels = single(&dims, 0, 0, 0, BlockType::STONE);
        voxels[dims.index(3, 3, 3)] = BlockType::WOOD.to_byte();
        let mesh = Mesh::build(&voxels, &dims);
        let ranges = mesh.draw_ranges();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0], MaterialGroup { start: 0, count: 36, material_index: 2 });
        assert_eq!(ranges[1], MaterialGroup { start: 36, count: 36, material_index: 3 });
    }
}
