//! # Overlay Stamping
//!
//! Writes building and road footprints into a chunk's voxel array.
//!
//! Geographic points are projected onto the voxel grid with a fixed linear scale around
//! the overlay centre: `x = floor((lon - center_lon) * 100000)` and
//! `z = floor((lat - center_lat) * 100000)`. This is an approximation layer; footprints
//! are treated as their bounding rectangles.
//!
//! * Buildings: every footprint with at least three points whose projected bounding box
//!   overlaps the chunk becomes a hollow box on the ground plane. Its perimeter is brick
//!   up to the building height and its top interior layer is a plank roof.
//! * Roads: every projected point inside the chunk stamps a 3 x 3 patch of cobblestone
//!   at ground level, clipped to the chunk.

use cgmath::{Point2, Point3};

use crate::engine_state::overlay::{Footprint, OverlayData};
use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};
use crate::engine_state::voxels::chunk::{coordinates, ChunkDimensions};

/// Voxels per degree of latitude/longitude.
pub const PROJECTION_SCALE: f64 = 100_000.0;
/// World Y that buildings and roads are stamped at.
pub const GROUND_LEVEL: i32 = 64;
const HOUSE_HEIGHT: i32 = 3;
const DEFAULT_BUILDING_HEIGHT: i32 = 5;
const STOREY_HEIGHT: i32 = 3;

const WALL_BLOCK: BlockType = BlockType::BRICK;
const ROOF_BLOCK: BlockType = BlockType::WOOD_PLANK;
const ROAD_BLOCK: BlockType = BlockType::COBBLESTONE;

/// Projects a `[lat, lon]` pair onto world voxel `(x, z)`.
pub fn project(overlay: &OverlayData, point: [f64; 2]) -> Point2<i32> {
    let [lat, lon] = point;
    Point2::new(
        ((lon - overlay.center_lon) * PROJECTION_SCALE).floor() as i32,
        ((lat - overlay.center_lat) * PROJECTION_SCALE).floor() as i32,
    )
}

/// Wall height of a building, from its tags.
///
/// `building:levels` wins when present; otherwise houses are 3 voxels tall and
/// everything else 5.
pub fn building_height(footprint: &Footprint) -> i32 {
    if let Some(levels) = footprint
        .tags
        .get("building:levels")
        .and_then(|levels| levels.trim().parse::<i32>().ok())
        .filter(|levels| *levels > 0)
    {
        return levels * STOREY_HEIGHT;
    }
    match footprint.tags.get("building").map(String::as_str) {
        Some("house") => HOUSE_HEIGHT,
        _ => DEFAULT_BUILDING_HEIGHT,
    }
}

/// Axis-aligned world-space rectangle, inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Bounds {
    min: Point2<i32>,
    max: Point2<i32>,
}

impl Bounds {
    fn of(points: &[Point2<i32>]) -> Option<Bounds> {
        let first = points.first()?;
        Some(points.iter().fold(
            Bounds {
                min: *first,
                max: *first,
            },
            |bounds, p| Bounds {
                min: Point2::new(bounds.min.x.min(p.x), bounds.min.y.min(p.y)),
                max: Point2::new(bounds.max.x.max(p.x), bounds.max.y.max(p.y)),
            },
        ))
    }

    fn of_chunk(dimensions: &ChunkDimensions, chunk: Point2<i32>) -> Bounds {
        let origin = coordinates::chunk_origin(dimensions, chunk);
        Bounds {
            min: Point2::new(origin.x, origin.z),
            max: Point2::new(
                origin.x + dimensions.width as i32 - 1,
                origin.z + dimensions.depth as i32 - 1,
            ),
        }
    }

    fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// The overlap of two rectangles, `None` when they are disjoint.
    fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        self.intersects(other).then(|| Bounds {
            min: Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    fn contains(&self, p: Point2<i32>) -> bool {
        self.intersects(&Bounds { min: p, max: p })
    }
}

/// Stamps every building and road of `overlay` that touches chunk `chunk` into `voxels`.
///
/// # Arguments
/// * `voxels` - The chunk's voxel array, modified in place
/// * `overlay` - Footprints and projection centre
/// * `chunk` - Chunk coordinate the array belongs to
/// * `dimensions` - Chunk size the array was built with
///
/// # Returns
/// The number of voxels written.
pub fn apply_overlay(
    voxels: &mut [BlockTypeSize],
    overlay: &OverlayData,
    chunk: Point2<i32>,
    dimensions: &ChunkDimensions,
) -> usize {
    let chunk_bounds = Bounds::of_chunk(dimensions, chunk);
    let mut stamper = Stamper {
        voxels,
        dimensions,
        origin: coordinates::chunk_origin(dimensions, chunk),
        written: 0,
    };

    for building in &overlay.buildings {
        if building.geometry.len() < 3 {
            continue;
        }
        let projected: Vec<_> = building.geometry.iter().map(|p| project(overlay, *p)).collect();
        let Some(bounds) = Bounds::of(&projected) else {
            continue;
        };
        if let Some(visible) = bounds.intersection(&chunk_bounds) {
            stamper.building(&bounds, &visible, building_height(building));
        }
    }

    for road in &overlay.roads {
        for point in &road.geometry {
            let projected = project(overlay, *point);
            if chunk_bounds.contains(projected) {
                stamper.road_patch(projected);
            }
        }
    }

    stamper.written
}

struct Stamper<'a> {
    voxels: &'a mut [BlockTypeSize],
    dimensions: &'a ChunkDimensions,
    origin: Point3<i32>,
    written: usize,
}

impl Stamper<'_> {
    /// Stamps the part of a building's box that falls inside `visible`.
    fn building(&mut self, bounds: &Bounds, visible: &Bounds, height: i32) {
        let roof_y = GROUND_LEVEL + height - 1;
        for x in visible.min.x..=visible.max.x {
            for z in visible.min.y..=visible.max.y {
                let on_wall =
                    x == bounds.min.x || x == bounds.max.x || z == bounds.min.y || z == bounds.max.y;
                if on_wall {
                    for y in GROUND_LEVEL..GROUND_LEVEL + height {
                        self.put(x, y, z, WALL_BLOCK);
                    }
                } else {
                    self.put(x, roof_y, z, ROOF_BLOCK);
                }
            }
        }
    }

    fn road_patch(&mut self, center: Point2<i32>) {
        for dx in -1..=1 {
            for dz in -1..=1 {
                self.put(center.x + dx, GROUND_LEVEL, center.y + dz, ROAD_BLOCK);
            }
        }
    }

    /// Writes one world voxel if it lies inside this chunk.
    fn put(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        let local = (x - self.origin.x, y - self.origin.y, z - self.origin.z);
        if let Some(index) = self.dimensions.checked_index(local.0, local.1, local.2) {
            self.voxels[index] = block_type.to_byte();
            self.written += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Geographic point that projects onto world voxel `(x, z)` with a centre at 0, 0.
    fn geo(x: i32, z: i32) -> [f64; 2] {
        [(z as f64 + 0.5) / PROJECTION_SCALE, (x as f64 + 0.5) / PROJECTION_SCALE]
    }

    fn footprint(points: Vec<[f64; 2]>, tags: &[(&str, &str)]) -> Footprint {
        Footprint {
            id: "test".to_string(),
            geometry: points,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn overlay(buildings: Vec<Footprint>, roads: Vec<Footprint>) -> OverlayData {
        OverlayData {
            center_lat: 0.0,
            center_lon: 0.0,
            buildings,
            roads,
        }
    }

    fn block(voxels: &[u8], dims: &ChunkDimensions, x: usize, y: usize, z: usize) -> BlockType {
        BlockType::from_byte(voxels[dims.index(x, y, z)])
    }

    #[test]
    fn projection_is_linear_around_the_centre() {
        let data = overlay(vec![], vec![]);
        assert_eq!(project(&data, geo(5, -3)), Point2::new(5, -3));
        assert_eq!(project(&data, [0.0, 0.0]), Point2::new(0, 0));
    }

    #[test]
    fn house_is_walled_and_roofed() {
        let dims = ChunkDimensions::default();
        let house = footprint(vec![geo(2, 2), geo(6, 2), geo(6, 6), geo(2, 6)], &[("building", "house")]);
        let mut voxels = dims.air_array();
        apply_overlay(&mut voxels, &overlay(vec![house], vec![]), Point2::new(0, 0), &dims);

        for y in 64..67 {
            assert_eq!(block(&voxels, &dims, 2, y, 4), BlockType::BRICK);
            assert_eq!(block(&voxels, &dims, 6, y, 6), BlockType::BRICK);
        }
        assert_eq!(block(&voxels, &dims, 2, 67, 4), BlockType::AIR);
        assert_eq!(block(&voxels, &dims, 4, 66, 4), BlockType::WOOD_PLANK);
        assert_eq!(block(&voxels, &dims, 4, 65, 4), BlockType::AIR);
    }

    #[test]
    fn huge_footprint_only_touches_the_chunk_it_covers() {
        let dims = ChunkDimensions::default();
        let huge = footprint(
            vec![geo(-200_000, -200_000), geo(200_000, -200_000), geo(200_000, 200_000)],
            &[("building", "house")],
        );
        let mut voxels = dims.air_array();
        let written = apply_overlay(&mut voxels, &overlay(vec![huge], vec![]), Point2::new(0, 0), &dims);

        assert_eq!(written, 16 * 16);
        assert_eq!(block(&voxels, &dims, 0, 64, 0), BlockType::AIR);
        assert_eq!(block(&voxels, &dims, 15, 66, 15), BlockType::WOOD_PLANK);
    }

    #[test]
    fn levels_tag_sets_height() {
        let tall = footprint(vec![geo(0, 0), geo(1, 0), geo(1, 1)], &[("building", "yes"), ("building:levels", "4")]);
        assert_eq!(building_height(&tall), 12);
        let plain = footprint(vec![], &[("building", "yes")]);
        assert_eq!(building_height(&plain), 5);
    }

    #[test]
    fn non_intersecting_footprints_leave_the_chunk_unchanged() {
        let dims = ChunkDimensions::default();
        let far = footprint(vec![geo(40, 40), geo(50, 40), geo(50, 50)], &[]);
        let original = dims.air_array();
        let mut voxels = original.clone();
        let written = apply_overlay(&mut voxels, &overlay(vec![far], vec![]), Point2::new(0, 0), &dims);
        assert_eq!(written, 0);
        assert_eq!(voxels, original);
    }

    #[test]
    fn degenerate_footprints_are_skipped() {
        let dims = ChunkDimensions::default();
        let line = footprint(vec![geo(1, 1), geo(8, 8)], &[]);
        let mut voxels = dims.air_array();
        assert_eq!(apply_overlay(&mut voxels, &overlay(vec![line], vec![]), Point2::new(0, 0), &dims), 0);
    }

    #[test]
    fn building_spanning_chunks_is_clipped_per_chunk() {
        let dims = ChunkDimensions::default();
        let wide = footprint(vec![geo(10, 2), geo(20, 2), geo(20, 8), geo(10, 8)], &[]);
        let data = overlay(vec![wide], vec![]);

        let mut right = dims.air_array();
        apply_overlay(&mut right, &data, Point2::new(1, 0), &dims);
        assert_eq!(block(&right, &dims, 4, 64, 2), BlockType::BRICK);
        assert_eq!(block(&right, &dims, 0, 68, 5), BlockType::WOOD_PLANK);
    }

    #[test]
    fn road_points_stamp_three_by_three_patches() {
        let dims = ChunkDimensions::default();
        let road = footprint(vec![geo(0, 8), geo(30, 30)], &[("highway", "residential")]);
        let mut voxels = dims.air_array();
        let written = apply_overlay(&mut voxels, &overlay(vec![], vec![road]), Point2::new(0, 0), &dims);

        assert_eq!(written, 6);
        for z in 7..=9 {
            assert_eq!(block(&voxels, &dims, 0, 64, z), BlockType::COBBLESTONE);
            assert_eq!(block(&voxels, &dims, 1, 64, z), BlockType::COBBLESTONE);
        }
        assert_eq!(block(&voxels, &dims, 2, 64, 8), BlockType::AIR);
    }
}
