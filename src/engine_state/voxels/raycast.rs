//! # Voxel Ray Casting
//!
//! Incremental grid traversal (Amanatides & Woo) from a ray origin through every voxel
//! the ray passes, in order, until the first non-air voxel.
//!
//! ## Algorithm
//!
//! * `step` is the sign of each direction component.
//! * `t_max` is the ray parameter at which the ray crosses the next voxel boundary on
//!   each axis; `t_delta` is how far the parameter moves to cross one whole voxel.
//!   An axis with a (near) zero component never crosses: its `t_delta` and `t_max`
//!   are infinite.
//! * Each iteration advances along the axis with the smallest `t_max`. The entry face
//!   normal is the negated step on that axis, and the distance travelled is the `t_max`
//!   value before it is advanced.
//!
//! The voxel containing the origin is never tested, so a ray cast from inside a block
//! reports the next block along the ray. Traversal stops after `max_distance` or
//! `MAX_STEPS` voxels, whichever comes first.

use cgmath::{InnerSpace, Point3, Vector3};

use super::block::block_type::BlockType;

/// Direction components smaller than this count as zero.
const EPSILON: f32 = 1e-8;
/// Hard cap on visited voxels, whatever the distance.
pub const MAX_STEPS: usize = 1024;

/// The first solid voxel along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Integer coordinate of the hit voxel.
    pub position: Point3<i32>,
    /// Outward normal of the face the ray entered through.
    pub normal: Vector3<i32>,
    /// Distance from the origin to the entry point.
    pub distance: f32,
    pub block_type: BlockType,
}

impl RayHit {
    /// The empty voxel in front of the hit face, where a placed block goes.
    pub fn adjacent(&self) -> Point3<i32> {
        self.position + self.normal
    }
}

/// Casts a ray against a voxel lookup.
///
/// # Arguments
/// * `origin` - Ray start in world space
/// * `direction` - Ray direction; need not be normalised
/// * `max_distance` - Hits further than this are ignored
/// * `lookup` - Block at a world voxel coordinate
///
/// # Returns
/// The first non-air voxel hit, or `None` if the direction is degenerate or nothing is
/// hit within range.
pub fn cast<F>(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    lookup: F,
) -> Option<RayHit>
where
    F: Fn(i32, i32, i32) -> BlockType,
{
    let length = direction.magnitude();
    if !length.is_finite() || length < EPSILON {
        return None;
    }
    let direction = direction / length;

    let mut voxel = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );

    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];

    for axis in 0..3 {
        let d = direction[axis];
        if d.abs() < EPSILON {
            continue;
        }
        let o = origin[axis];
        let cell = voxel[axis] as f32;
        step[axis] = if d > 0.0 { 1 } else { -1 };
        t_delta[axis] = (1.0 / d).abs();
        let boundary = if d > 0.0 { cell + 1.0 } else { cell };
        t_max[axis] = (boundary - o) / d;
    }

    for _ in 0..MAX_STEPS {
        let axis = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] {
                0
            } else {
                2
            }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };

        let distance = t_max[axis];
        if !distance.is_finite() || distance > max_distance {
            return None;
        }

        voxel[axis] += step[axis];
        t_max[axis] += t_delta[axis];

        let block_type = lookup(voxel.x, voxel.y, voxel.z);
        if !block_type.is_air() {
            let mut normal = Vector3::new(0, 0, 0);
            normal[axis] = -step[axis];
            return Some(RayHit {
                position: voxel,
                normal,
                distance,
                block_type,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_voxel(x: i32, y: i32, z: i32) -> BlockType {
        if (x, y, z) == (5, 5, 5) {
            BlockType::STONE
        } else {
            BlockType::AIR
        }
    }

    #[test]
    fn hits_the_known_voxel_through_its_front_face() {
        let hit = cast(
            Point3::new(5.0, 5.0, 10.0),
            Vector3::new(0.0, 0.0, -1.0),
            10.0,
            single_voxel,
        )
        .unwrap();
        assert_eq!(hit.position, Point3::new(5, 5, 5));
        assert_eq!(hit.normal, Vector3::new(0, 0, 1));
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert_eq!(hit.block_type, BlockType::STONE);
        assert_eq!(hit.adjacent(), Point3::new(5, 5, 6));
    }

    #[test]
    fn out_of_range_is_a_miss() {
        let hit = cast(
            Point3::new(5.0, 5.0, 10.0),
            Vector3::new(0.0, 0.0, -1.0),
            3.0,
            single_voxel,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn degenerate_direction_is_a_miss() {
        assert_eq!(cast(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0), 10.0, single_voxel), None);
    }

    #[test]
    fn unnormalised_diagonal_rays_hit_from_the_side() {
        let hit = cast(
            Point3::new(2.5, 5.5, 5.2),
            Vector3::new(4.0, 0.0, 0.0),
            10.0,
            single_voxel,
        )
        .unwrap();
        assert_eq!(hit.normal, Vector3::new(-1, 0, 0));
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn looking_down_hits_the_top_face() {
        let hit = cast(
            Point3::new(5.5, 9.7, 5.5),
            Vector3::new(0.0, -1.0, 0.0),
            10.0,
            single_voxel,
        )
        .unwrap();
        assert_eq!(hit.position, Point3::new(5, 5, 5));
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
    }

    #[test]
    fn empty_world_exhausts_without_looping_forever() {
        let hit = cast(
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 1.0, 1.0),
            f32::MAX,
            |_, _, _| BlockType::AIR,
        );
        assert_eq!(hit, None);
    }
}
