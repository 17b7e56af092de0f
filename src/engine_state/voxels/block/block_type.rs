//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification and conversion from
//! the compact byte form stored in chunk voxel arrays.

use num_derive::FromPrimitive;
use phf::phf_map;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the byte written into chunk voxel arrays and save files,
/// so existing values must never be renumbered. `AIR` is always zero.
///
/// `UNKNOWN` is the catch-all for bytes that do not name a registered block; it
/// keeps every lookup in the registry total.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Transparent, not solid, drops nothing.
    AIR = 0,
    /// Plain dirt.
    DIRT = 1,
    /// Dirt with a grass top, the usual surface block.
    GRASS = 2,
    /// Deep rock; breaks into cobblestone.
    STONE = 3,
    /// Tree trunk.
    WOOD_LOG = 4,
    /// Crafted planks.
    WOOD_PLANK = 5,
    /// Tree foliage. Solid but see-through.
    LEAF = 6,
    /// Glass pane block.
    GLASS = 7,
    /// Building wall material.
    BRICK = 8,
    /// Light source.
    TORCH = 9,
    /// Liquid water.
    WATER = 10,
    /// Low-elevation surface block.
    SAND = 11,
    /// Road surface and the drop of stone.
    COBBLESTONE = 12,
    /// Lower half of a door.
    DOOR_BOTTOM = 13,
    /// Upper half of a door.
    DOOR_TOP = 14,
    /// Generic wood block.
    WOOD = 15,
    /// Decorative sky block.
    SKY = 16,
    /// Fallback for unregistered bytes.
    UNKNOWN = 17,
}

/// Number of registered block types, `UNKNOWN` included.
pub const BLOCK_TYPE_COUNT: usize = 18;

/// Lowercase block names accepted in configuration and recipe files.
static BLOCK_NAMES: phf::Map<&'static str, BlockType> = phf_map! {
    "air" => BlockType::AIR,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "stone" => BlockType::STONE,
    "wood_log" => BlockType::WOOD_LOG,
    "wood_plank" => BlockType::WOOD_PLANK,
    "leaf" => BlockType::LEAF,
    "glass" => BlockType::GLASS,
    "brick" => BlockType::BRICK,
    "torch" => BlockType::TORCH,
    "water" => BlockType::WATER,
    "sand" => BlockType::SAND,
    "cobblestone" => BlockType::COBBLESTONE,
    "door_bottom" => BlockType::DOOR_BOTTOM,
    "door_top" => BlockType::DOOR_TOP,
    "wood" => BlockType::WOOD,
    "sky" => BlockType::SKY,
};

impl BlockType {
    /// Every block type in discriminant order.
    pub const ALL: [BlockType; BLOCK_TYPE_COUNT] = [
        BlockType::AIR,
        BlockType::DIRT,
        BlockType::GRASS,
        BlockType::STONE,
        BlockType::WOOD_LOG,
        BlockType::WOOD_PLANK,
        BlockType::LEAF,
        BlockType::GLASS,
        BlockType::BRICK,
        BlockType::TORCH,
        BlockType::WATER,
        BlockType::SAND,
        BlockType::COBBLESTONE,
        BlockType::DOOR_BOTTOM,
        BlockType::DOOR_TOP,
        BlockType::WOOD,
        BlockType::SKY,
        BlockType::UNKNOWN,
    ];

    /// Converts a stored voxel byte into a `BlockType`.
    ///
    /// Bytes that do not correspond to a registered block decode to
    /// `BlockType::UNKNOWN` instead of failing, so voxel data read from disk
    /// can never produce an unhandled lookup.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    pub fn from_byte(btype: BlockTypeSize) -> Self {
        num_traits::FromPrimitive::from_u8(btype).unwrap_or(BlockType::UNKNOWN)
    }

    /// The compact byte used in voxel arrays.
    pub fn to_byte(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Looks a block up by its lowercase configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_NAMES.get(name).copied()
    }

    /// `true` only for air.
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }
}
