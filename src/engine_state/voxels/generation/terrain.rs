//! # Terrain Generation
//!
//! Produces the base voxel array of a chunk from world coordinates and a seed.
//!
//! ## Algorithm
//!
//! 1. Each column `(x, z)` samples two multi-octave value noise fields, a broad one and
//!    a detailed one, and blends them 0.7 / 0.3. Every octave doubles the frequency
//!    and halves the amplitude; the sum is normalised by the total amplitude.
//! 2. The blend is centred around `base_height` and scaled by `height_variation` to get
//!    the terrain height `h`. The top solid voxel sits at `h - 1`.
//! 3. The column is filled by depth band: stone below `h - 4`, dirt below `h - 1`, one
//!    surface voxel, air above. The surface is sand in low terrain, a stone/dirt mix in
//!    high terrain and grass otherwise.
//! 4. A column hash against `tree_threshold` decides whether a tree grows: a log trunk
//!    of height 4 to 6 topped by an octahedral leaf cluster. Leaves overwrite whatever
//!    they land on, including the top log, and are clipped to the chunk.
//!
//! Generation is a pure function of `(seed, config, origin, size)`; the same inputs
//! always yield bit-identical arrays.

use noise::{NoiseFn, Value};
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};
use crate::engine_state::voxels::chunk::ChunkDimensions;

/// Salt for the surface stone/dirt mix hash.
const SURFACE_SALT: u64 = 0x5eed_0001;
/// Salt for tree placement.
const TREE_SALT: u64 = 0x5eed_0002;
/// Salt for trunk height.
const TRUNK_SALT: u64 = 0x5eed_0003;

/// Shape parameters of the generated landscape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub base_height: i32,
    pub height_variation: i32,
    /// Base noise frequency; larger values give rougher terrain.
    pub hilliness: f64,
    pub large_octaves: u32,
    pub small_octaves: u32,
    /// Column hash value above which a tree grows, in `[0, 1)`.
    pub tree_threshold: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            base_height: 64,
            height_variation: 16,
            hilliness: 0.02,
            large_octaves: 4,
            small_octaves: 2,
            tree_threshold: 0.98,
        }
    }
}

/// Deterministic terrain generator.
#[derive(Clone)]
pub struct TerrainGenerator {
    seed: u32,
    config: TerrainConfig,
    noise: Value,
}

impl TerrainGenerator {
    pub fn new(seed: u32, config: TerrainConfig) -> Self {
        Self {
            seed,
            config,
            noise: Value::new(seed),
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Generates the voxel array of the region starting at `origin` with the given size.
    ///
    /// # Arguments
    /// * `origin_x`, `origin_y`, `origin_z` - World coordinate of local voxel (0, 0, 0)
    /// * `size` - Region size; the result holds `size.volume()` bytes
    ///
    /// # Returns
    /// Dense voxel bytes in the chunk layout (`x + y * width + z * width * height`).
    pub fn generate(
        &self,
        origin_x: i32,
        origin_y: i32,
        origin_z: i32,
        size: &ChunkDimensions,
    ) -> Vec<BlockTypeSize> {
        let mut voxels = size.air_array();

        for x in 0..size.width {
            for z in 0..size.depth {
                let world_x = origin_x + x as i32;
                let world_z = origin_z + z as i32;
                let height = self.surface_height(world_x, world_z);
                let surface = self.surface_block(world_x, world_z, height);

                for y in 0..size.height {
                    let world_y = origin_y + y as i32;
                    let block_type = if world_y < height - 4 {
                        BlockType::STONE
                    } else if world_y < height - 1 {
                        BlockType::DIRT
                    } else if world_y == height - 1 {
                        surface
                    } else {
                        break;
                    };
                    voxels[size.index(x, y, z)] = block_type.to_byte();
                }

                if self.has_tree(world_x, world_z) {
                    self.plant_tree(&mut voxels, size, origin_y, x, z, world_x, world_z, height);
                }
            }
        }

        voxels
    }

    /// Terrain height of a column: the world Y directly above its top solid voxel.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let hilliness = self.config.hilliness;
        let (x, z) = (world_x as f64, world_z as f64);

        let large = self.octave_noise(x * hilliness * 0.5, z * hilliness * 0.5, self.config.large_octaves);
        let small = self.octave_noise(x * hilliness * 2.0, z * hilliness * 2.0, self.config.small_octaves);
        let combined = large * 0.7 + small * 0.3;

        self.config.base_height
            + ((combined * 2.0 - 1.0) * self.config.height_variation as f64).floor() as i32
    }

    /// Whether a tree grows on this column.
    pub fn has_tree(&self, world_x: i32, world_z: i32) -> bool {
        self.column_hash(world_x, world_z, TREE_SALT) > self.config.tree_threshold
    }

    fn surface_block(&self, world_x: i32, world_z: i32, height: i32) -> BlockType {
        let base = self.config.base_height;
        if height > base + 8 {
            if self.column_hash(world_x, world_z, SURFACE_SALT) > 0.6 {
                BlockType::STONE
            } else {
                BlockType::DIRT
            }
        } else if height < base - 4 {
            BlockType::SAND
        } else {
            BlockType::GRASS
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn plant_tree(
        &self,
        voxels: &mut [BlockTypeSize],
        size: &ChunkDimensions,
        origin_y: i32,
        x: usize,
        z: usize,
        world_x: i32,
        world_z: i32,
        height: i32,
    ) {
        let trunk_height = 4 + (self.column_hash(world_x, world_z, TRUNK_SALT) * 3.0).floor() as i32;
        let (x, z) = (x as i32, z as i32);

        for trunk_y in 0..trunk_height {
            if let Some(index) = size.checked_index(x, height + trunk_y - origin_y, z) {
                voxels[index] = BlockType::WOOD_LOG.to_byte();
            }
        }

        let crown_y = height + trunk_height;
        for dy in -2..=2i32 {
            for dx in -2..=2i32 {
                for dz in -2..=2i32 {
                    if dx.abs() + dy.abs() + dz.abs() > 3 {
                        continue;
                    }
                    if let Some(index) = size.checked_index(x + dx, crown_y + dy - origin_y, z + dz) {
                        voxels[index] = BlockType::LEAF.to_byte();
                    }
                }
            }
        }
    }

    /// Multi-octave value noise normalised to `[0, 1]`.
    fn octave_noise(&self, x: f64, z: f64, octaves: u32) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves.max(1) {
            let sample = (self.noise.get([x * frequency, z * frequency]) + 1.0) * 0.5;
            value += sample.clamp(0.0, 1.0) * amplitude;
            max_value += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value / max_value
    }

    /// Deterministic `[0, 1)` value for a world column.
    fn column_hash(&self, world_x: i32, world_z: i32, salt: u64) -> f64 {
        let column = ((world_x as u32 as u64) << 32) | world_z as u32 as u64;
        let key = column.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt.rotate_left(29) ^ self.seed as u64;
        fastrand::Rng::with_seed(key).f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::new(12345, TerrainConfig::default())
    }

    #[test]
    fn same_inputs_give_identical_arrays() {
        let dims = ChunkDimensions::default();
        let a = generator().generate(-32, 0, 48, &dims);
        let b = generator().generate(-32, 0, 48, &dims);
        assert_eq!(a.len(), dims.volume());
        assert_eq!(a, b);
    }

    #[test]
    fn heights_stay_within_the_variation_band() {
        let generator = generator();
        for x in -100..100 {
            let height = generator.surface_height(x, x * 3);
            assert!((48..=80).contains(&height), "height {height} at column {x}");
        }
    }

    #[test]
    fn columns_are_layered_by_depth() {
        let dims = ChunkDimensions::default();
        let mut config = TerrainConfig::default();
        config.tree_threshold = 1.0;
        let generator = TerrainGenerator::new(7, config);
        let voxels = generator.generate(0, 0, 0, &dims);

        for (x, z) in [(0, 0), (5, 11), (15, 15)] {
            let height = generator.surface_height(x as i32, z as i32);
            let at = |y: i32| BlockType::from_byte(voxels[dims.index(x, y as usize, z)]);
            assert_eq!(at(0), BlockType::STONE);
            assert_eq!(at(height - 5), BlockType::STONE);
            assert_eq!(at(height - 4), BlockType::DIRT);
            assert_eq!(at(height - 2), BlockType::DIRT);
            assert!(matches!(
                at(height - 1),
                BlockType::GRASS | BlockType::SAND | BlockType::STONE | BlockType::DIRT
            ));
            assert_eq!(at(height), BlockType::AIR);
        }
    }

    #[test]
    fn trees_grow_a_trunk_and_leaves() {
        let dims = ChunkDimensions::default();
        let mut config = TerrainConfig::default();
        config.tree_threshold = -1.0;
        let generator = TerrainGenerator::new(3, config);
        let voxels = generator.generate(0, 0, 0, &dims);

        let height = generator.surface_height(8, 8);
        let at = |y: i32| BlockType::from_byte(voxels[dims.index(8, y as usize, 8)]);
        for y in height..height + 3 {
            assert_eq!(at(y), BlockType::WOOD_LOG);
        }
        let cap = (height..dims.height as i32)
            .find(|y| at(*y) != BlockType::WOOD_LOG)
            .unwrap();
        assert_eq!(at(cap), BlockType::LEAF, "the crown overwrites the top log");
    }
}
