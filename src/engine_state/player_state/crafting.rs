//! # Crafting
//!
//! Positional 2 x 2 recipes. A recipe pattern is two rows of two symbols; each symbol
//! names an ingredient and `.` leaves the cell empty. The grid must match the pattern
//! exactly, cell for cell.

use std::collections::HashMap;
use std::fmt;

use log::info;
use phf::phf_map;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::inventory::Inventory;

/// The crafting grid, row-major: `[top left, top right, bottom left, bottom right]`.
pub type CraftingGrid = [Option<BlockType>; 4];

/// Ingredient symbols used in recipe patterns.
static RECIPE_SYMBOLS: phf::Map<char, BlockType> = phf_map! {
    'L' => BlockType::WOOD_LOG,
    'P' => BlockType::WOOD_PLANK,
    'S' => BlockType::STONE,
    'C' => BlockType::COBBLESTONE,
    'D' => BlockType::SAND,
};

#[derive(Debug, PartialEq, Eq)]
pub struct Recipe {
    pub id: &'static str,
    pub pattern: [&'static str; 2],
    pub result: BlockType,
    pub count: u32,
}

impl Recipe {
    /// The pattern expanded into a grid. Unknown symbols read as empty cells.
    pub fn grid(&self) -> CraftingGrid {
        let mut grid = [None; 4];
        for (row, line) in self.pattern.iter().enumerate() {
            for (col, symbol) in line.chars().take(2).enumerate() {
                grid[row * 2 + col] = RECIPE_SYMBOLS.get(&symbol).copied();
            }
        }
        grid
    }

    /// Blocks consumed by one craft, one per filled cell.
    pub fn ingredients(&self) -> HashMap<BlockType, u32> {
        let mut ingredients = HashMap::new();
        for block_type in self.grid().into_iter().flatten() {
            *ingredients.entry(block_type).or_insert(0) += 1;
        }
        ingredients
    }
}

pub static RECIPES: &[Recipe] = &[
    Recipe { id: "planks", pattern: ["L.", ".."], result: BlockType::WOOD_PLANK, count: 4 },
    Recipe { id: "wood", pattern: ["LL", "LL"], result: BlockType::WOOD, count: 4 },
    Recipe { id: "torch", pattern: ["P.", "P."], result: BlockType::TORCH, count: 4 },
    Recipe { id: "door", pattern: ["PP", "PP"], result: BlockType::DOOR_BOTTOM, count: 1 },
    Recipe { id: "cobblestone", pattern: ["S.", ".."], result: BlockType::COBBLESTONE, count: 1 },
    Recipe { id: "brick", pattern: ["CC", "CC"], result: BlockType::BRICK, count: 4 },
    Recipe { id: "glass", pattern: ["DD", "DD"], result: BlockType::GLASS, count: 4 },
];

#[derive(Debug, PartialEq, Eq)]
pub enum CraftError {
    /// The grid matches no recipe.
    NoRecipe,
    /// The inventory holds fewer of an ingredient than the recipe consumes.
    MissingIngredient {
        block_type: BlockType,
        needed: u32,
        available: u32,
    },
    /// The result has nowhere to go.
    InventoryFull,
}

impl fmt::Display for CraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CraftError::NoRecipe => write!(f, "no recipe matches the grid"),
            CraftError::MissingIngredient { block_type, needed, available } => write!(
                f,
                "need {needed} x {block_type:?} but only {available} held"
            ),
            CraftError::InventoryFull => write!(f, "no room for the crafted blocks"),
        }
    }
}

impl std::error::Error for CraftError {}

/// The recipe whose pattern equals `grid`, if any.
pub fn find_recipe(grid: &CraftingGrid) -> Option<&'static Recipe> {
    RECIPES.iter().find(|recipe| recipe.grid() == *grid)
}

/// Crafts once: consumes the recipe's ingredients and adds its result.
///
/// Either everything happens or, on error, the inventory is left untouched.
///
/// # Returns
/// The recipe that was crafted.
pub fn craft(inventory: &mut Inventory, grid: &CraftingGrid) -> Result<&'static Recipe, CraftError> {
    let recipe = find_recipe(grid).ok_or(CraftError::NoRecipe)?;

    let mut ingredients: Vec<_> = recipe.ingredients().into_iter().collect();
    ingredients.sort_by_key(|(block_type, _)| block_type.to_byte());

    let mut updated = inventory.clone();
    for (block_type, needed) in ingredients {
        if !updated.take(block_type, needed) {
            return Err(CraftError::MissingIngredient {
                block_type,
                needed,
                available: inventory.count_of(block_type),
            });
        }
    }
    if updated.add(recipe.result, recipe.count) > 0 {
        return Err(CraftError::InventoryFull);
    }

    *inventory = updated;
    info!("Crafted {} x {:?}", recipe.count, recipe.result);
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    const L: Option<BlockType> = Some(BlockType::WOOD_LOG);
    const P: Option<BlockType> = Some(BlockType::WOOD_PLANK);

    #[test]
    fn patterns_expand_to_grids() {
        let torch = RECIPES.iter().find(|r| r.id == "torch").unwrap();
        assert_eq!(torch.grid(), [P, None, P, None]);
        assert_eq!(torch.ingredients().get(&BlockType::WOOD_PLANK), Some(&2));
    }

    #[test]
    fn recipe_patterns_are_unique() {
        for (i, a) in RECIPES.iter().enumerate() {
            for b in &RECIPES[i + 1..] {
                assert_ne!(a.grid(), b.grid(), "{} and {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn matching_is_positional() {
        assert_eq!(find_recipe(&[L, None, None, None]).map(|r| r.id), Some("planks"));
        assert_eq!(find_recipe(&[None, L, None, None]), None);
        assert_eq!(find_recipe(&[None; 4]), None);
    }

    #[test]
    fn craft_consumes_ingredients_and_adds_the_result() {
        let mut inventory = Inventory::starter();
        let recipe = craft(&mut inventory, &[P, P, P, P]).unwrap();
        assert_eq!(recipe.id, "door");
        assert_eq!(inventory.count_of(BlockType::WOOD_PLANK), 60);
        assert_eq!(inventory.count_of(BlockType::DOOR_BOTTOM), 1);
    }

    #[test]
    fn failed_craft_leaves_the_inventory_alone() {
        let mut inventory = Inventory::starter();
        let before = inventory.clone();

        assert_eq!(
            craft(&mut inventory, &[L, None, None, None]),
            Err(CraftError::MissingIngredient {
                block_type: BlockType::WOOD_LOG,
                needed: 1,
                available: 0
            })
        );
        assert_eq!(craft(&mut inventory, &[None, L, None, None]), Err(CraftError::NoRecipe));
        assert_eq!(inventory, before);
    }
}
