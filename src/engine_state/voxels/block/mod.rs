//! # Block Module
//!
//! This module provides the block registry for the voxel world: block type
//! definitions, block face handling, and the static table of per-type metadata
//! (solidity, transparency, hardness, drops).
//!
//! ## Architecture
//! The registry is a closed `match` over `BlockType`. Every variant, including the
//! `UNKNOWN` fallback, has an entry, and the compiler rejects a missing arm, so a
//! lookup can never be unhandled. The table is `'static` and read-only.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// This is used for efficient storage and serialization of voxel arrays.
pub type BlockTypeSize = u8;

/// A block yielded when another block is mined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockDrop {
    pub block_type: BlockType,
    pub count: u32,
}

/// Static metadata for one block type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockData {
    pub block_type: BlockType,
    /// Display name.
    pub name: &'static str,
    /// Texture reference handed to the renderer.
    pub texture: &'static str,
    pub hardness: f32,
    /// Light, rays and mesh faces pass through.
    pub transparent: bool,
    pub emissive: bool,
    pub liquid: bool,
    /// Collision relevant.
    pub solid: bool,
    pub tool_required: Option<&'static str>,
    pub drops: &'static [BlockDrop],
}

/// A single-item drop table, usable inside static initialisers.
macro_rules! drops_self {
    ($block_type:ident) => {
        &[BlockDrop {
            block_type: BlockType::$block_type,
            count: 1,
        }]
    };
}

const NO_DROPS: &[BlockDrop] = &[];

static AIR: BlockData = BlockData {
    block_type: BlockType::AIR,
    name: "Air",
    texture: "",
    hardness: 0.0,
    transparent: true,
    emissive: false,
    liquid: false,
    solid: false,
    tool_required: None,
    drops: NO_DROPS,
};

/// Builds an opaque, solid entry; the common case in the table below.
const fn opaque(
    block_type: BlockType,
    name: &'static str,
    texture: &'static str,
    hardness: f32,
    drops: &'static [BlockDrop],
) -> BlockData {
    BlockData {
        block_type,
        name,
        texture,
        hardness,
        transparent: false,
        emissive: false,
        liquid: false,
        solid: true,
        tool_required: None,
        drops,
    }
}

static DIRT: BlockData = opaque(BlockType::DIRT, "Dirt", "/textures/grass.png", 0.5, drops_self!(DIRT));
static GRASS: BlockData = opaque(BlockType::GRASS, "Grass Block", "/textures/grass.png", 0.6, drops_self!(DIRT));
static STONE: BlockData = BlockData {
    tool_required: Some("pickaxe"),
    ..opaque(BlockType::STONE, "Stone", "/textures/asphalt.png", 1.5, drops_self!(COBBLESTONE))
};
static WOOD_LOG: BlockData = opaque(BlockType::WOOD_LOG, "Wood Log", "/textures/wood.jpg", 2.0, drops_self!(WOOD_LOG));
static WOOD_PLANK: BlockData = opaque(BlockType::WOOD_PLANK, "Wood Planks", "/textures/wood.jpg", 2.0, drops_self!(WOOD_PLANK));
static LEAF: BlockData = BlockData {
    transparent: true,
    ..opaque(BlockType::LEAF, "Leaves", "/textures/grass.png", 0.2, NO_DROPS)
};
static GLASS: BlockData = BlockData {
    transparent: true,
    ..opaque(BlockType::GLASS, "Glass", "/textures/sky.png", 0.3, NO_DROPS)
};
static BRICK: BlockData = opaque(BlockType::BRICK, "Brick", "/textures/asphalt.png", 2.0, drops_self!(BRICK));
static TORCH: BlockData = BlockData {
    transparent: true,
    emissive: true,
    solid: false,
    ..opaque(BlockType::TORCH, "Torch", "/textures/wood.jpg", 0.1, drops_self!(TORCH))
};
static WATER: BlockData = BlockData {
    transparent: true,
    liquid: true,
    solid: false,
    ..opaque(BlockType::WATER, "Water", "/textures/sky.png", 0.0, NO_DROPS)
};
static SAND: BlockData = opaque(BlockType::SAND, "Sand", "/textures/sand.jpg", 0.5, drops_self!(SAND));
static COBBLESTONE: BlockData = opaque(BlockType::COBBLESTONE, "Cobblestone", "/textures/asphalt.png", 2.0, drops_self!(COBBLESTONE));
static DOOR_BOTTOM: BlockData = BlockData {
    transparent: true,
    ..opaque(BlockType::DOOR_BOTTOM, "Door (Bottom)", "/textures/wood.jpg", 3.0, drops_self!(DOOR_BOTTOM))
};
static DOOR_TOP: BlockData = BlockData {
    transparent: true,
    ..opaque(BlockType::DOOR_TOP, "Door (Top)", "/textures/wood.jpg", 3.0, NO_DROPS)
};
static WOOD: BlockData = opaque(BlockType::WOOD, "Wood", "/textures/wood.jpg", 2.0, drops_self!(WOOD));
static SKY: BlockData = BlockData {
    transparent: true,
    solid: false,
    ..opaque(BlockType::SKY, "Sky", "/textures/sky.png", 0.0, NO_DROPS)
};
// Renders like dirt so corrupted bytes stay visible instead of punching holes.
static UNKNOWN: BlockData = opaque(BlockType::UNKNOWN, "Unknown", "/textures/grass.png", 0.5, NO_DROPS);

/// Returns the registry entry for `block_type`.
///
/// # Arguments
/// * `block_type` - Any block type; the match is exhaustive
///
/// # Returns
/// A `'static` reference to the block's metadata.
pub fn get_block_data(block_type: BlockType) -> &'static BlockData {
    match block_type {
        BlockType::AIR => &AIR,
        BlockType::DIRT => &DIRT,
        BlockType::GRASS => &GRASS,
        BlockType::STONE => &STONE,
        BlockType::WOOD_LOG => &WOOD_LOG,
        BlockType::WOOD_PLANK => &WOOD_PLANK,
        BlockType::LEAF => &LEAF,
        BlockType::GLASS => &GLASS,
        BlockType::BRICK => &BRICK,
        BlockType::TORCH => &TORCH,
        BlockType::WATER => &WATER,
        BlockType::SAND => &SAND,
        BlockType::COBBLESTONE => &COBBLESTONE,
        BlockType::DOOR_BOTTOM => &DOOR_BOTTOM,
        BlockType::DOOR_TOP => &DOOR_TOP,
        BlockType::WOOD => &WOOD,
        BlockType::SKY => &SKY,
        BlockType::UNKNOWN => &UNKNOWN,
    }
}

pub fn is_solid(block_type: BlockType) -> bool {
    get_block_data(block_type).solid
}

pub fn is_transparent(block_type: BlockType) -> bool {
    get_block_data(block_type).transparent
}

/// Blocks added to the inventory when `block_type` is mined.
pub fn get_drops(block_type: BlockType) -> &'static [BlockDrop] {
    get_block_data(block_type).drops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_transparent_non_solid_without_drops() {
        let air = get_block_data(BlockType::AIR);
        assert!(air.transparent);
        assert!(!air.solid);
        assert!(air.drops.is_empty());
        assert_eq!(BlockType::AIR.to_byte(), 0);
    }

    #[test]
    fn every_type_has_a_matching_entry() {
        for block_type in BlockType::ALL {
            assert_eq!(get_block_data(block_type).block_type, block_type);
        }
    }

    #[test]
    fn stone_drops_cobblestone_and_grass_drops_dirt() {
        let cobble = BlockDrop { block_type: BlockType::COBBLESTONE, count: 1 };
        let dirt = BlockDrop { block_type: BlockType::DIRT, count: 1 };
        assert_eq!(get_drops(BlockType::STONE), &[cobble]);
        assert_eq!(get_drops(BlockType::GRASS), &[dirt]);
        assert!(get_drops(BlockType::LEAF).is_empty());
    }

    #[test]
    fn see_through_blocks() {
        assert!(is_transparent(BlockType::LEAF));
        assert!(is_solid(BlockType::LEAF));
        assert!(is_transparent(BlockType::GLASS));
        assert!(!is_transparent(BlockType::STONE));
        assert!(!is_solid(BlockType::WATER));
        assert!(!is_transparent(BlockType::UNKNOWN));
    }
}
