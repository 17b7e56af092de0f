use cgmath::Point3;

use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::block_side::BlockSide;

use super::Material;

/// UV of the four quad corners, in emission order.
pub const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Represents a single unit quad on one side of a voxel.
///
/// The four corners wind counter-clockwise when seen from outside the voxel, so the
/// index pattern `[0, 1, 2, 0, 2, 3]` yields two front-facing triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Chunk-local coordinate of the voxel that owns the face
    pub voxel: Point3<usize>,
    /// Which side of the voxel this face covers
    pub block_side: BlockSide,
    pub material: Material,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `voxel` - The coordinates of the voxel in chunk space
    /// * `block_side` - Which side of the block this face represents
    /// * `material` - Material bucket the face is drawn with
    pub fn new(voxel: Point3<usize>, block_side: BlockSide, material: Material) -> Self {
        Face {
            voxel,
            block_side,
            material,
        }
    }

    /// The four corner positions of the face, in winding order.
    pub fn corners(&self) -> [Point3<f32>; 4] {
        let (x, y, z) = (
            self.voxel.x as f32,
            self.voxel.y as f32,
            self.voxel.z as f32,
        );
        let p = Point3::new;
        match self.block_side {
            BlockSide::FRONT => [
                p(x, y, z + 1.0),
                p(x + 1.0, y, z + 1.0),
                p(x + 1.0, y + 1.0, z + 1.0),
                p(x, y + 1.0, z + 1.0),
            ],
            BlockSide::BACK => [
                p(x + 1.0, y, z),
                p(x, y, z),
                p(x, y + 1.0, z),
                p(x + 1.0, y + 1.0, z),
            ],
            BlockSide::RIGHT => [
                p(x + 1.0, y, z + 1.0),
                p(x + 1.0, y, z),
                p(x + 1.0, y + 1.0, z),
                p(x + 1.0, y + 1.0, z + 1.0),
            ],
            BlockSide::LEFT => [
                p(x, y, z),
                p(x, y, z + 1.0),
                p(x, y + 1.0, z + 1.0),
                p(x, y + 1.0, z),
            ],
            BlockSide::TOP => [
                p(x, y + 1.0, z + 1.0),
                p(x + 1.0, y + 1.0, z + 1.0),
                p(x + 1.0, y + 1.0, z),
                p(x, y + 1.0, z),
            ],
            BlockSide::BOTTOM => [
                p(x, y, z),
                p(x + 1.0, y, z),
                p(x + 1.0, y, z + 1.0),
                p(x, y, z + 1.0),
            ],
        }
    }

    /// Generates the four vertices of the face.
    pub fn vertices(&self) -> [Vertex; 4] {
        let normal = self.block_side.normal();
        let corners = self.corners();
        std::array::from_fn(|i| Vertex::new(corners[i], normal, QUAD_UVS[i]))
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, InnerSpace};

    use super::*;

    #[test]
    fn corners_lie_on_the_face_plane_and_wind_outwards() {
        for side in BlockSide::all() {
            let face = Face::new(Point3::new(2, 3, 4), side, Material::Dirt);
            let c = face.corners();
            let normal = side.normal();
            let center = Point3::new(2.5, 3.5, 4.5);

            for corner in c {
                let offset = corner - center;
                assert!((offset.dot(normal) - 0.5).abs() < 1e-6, "{side:?}");
            }
            let winding = (c[1] - c[0]).cross(c[2] - c[0]);
            assert!(winding.dot(normal) > 0.0, "{side:?} winds inwards");
            assert_eq!(Point3::centroid(&c), center + normal * 0.5);
        }
    }
}
