//! Vertex data structures for chunk meshes.
//!
//! This module defines the vertex format handed across the rendering boundary.

use cgmath::{Point3, Vector3};

/// A vertex of a chunk mesh.
///
/// Positions are chunk-local; the renderer offsets them by the chunk's world origin.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// Unit face normal, shared by the four corners of a quad
    pub normal: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `pos` - Chunk-local position of the corner
    /// * `normal` - Face normal
    /// * `uv` - Texture coordinate of the corner
    pub fn new(pos: Point3<f32>, normal: Vector3<f32>, uv: [f32; 2]) -> Self {
        Vertex {
            position: pos.into(),
            normal: normal.into(),
            tex_coords: uv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_cast_to_a_flat_float_buffer() {
        let vertices = [
            Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0), [0.0, 1.0]),
            Vertex::new(Point3::new(4.0, 5.0, 6.0), Vector3::new(0.0, 0.0, -1.0), [1.0, 1.0]),
        ];
        let floats: &[f32] = bytemuck::cast_slice(&vertices);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(floats.len(), 16);
        assert_eq!(&floats[8..11], &[4.0, 5.0, 6.0]);
    }
}
