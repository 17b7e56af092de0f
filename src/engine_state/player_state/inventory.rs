//! The player's 36-slot inventory: a 9-slot hotbar followed by 27 storage slots.
//!
//! Stacks have no size limit. A slot whose count drops to zero becomes empty.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::block_type::BlockType;

pub const INVENTORY_SIZE: usize = 36;
pub const HOTBAR_SIZE: usize = 9;
/// Size of each stack a new world starts with.
pub const STARTER_STACK: u32 = 64;

/// One inventory slot. `block_type` is `None` exactly when `count` is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub block_type: Option<BlockType>,
    pub count: u32,
}

impl InventorySlot {
    pub fn is_empty(&self) -> bool {
        self.block_type.is_none()
    }

    fn normalize(&mut self) {
        if self.count == 0 || self.block_type.is_none() {
            *self = InventorySlot::default();
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    slots: [InventorySlot; INVENTORY_SIZE],
    selected: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Inventory::empty()
    }
}

impl Inventory {
    pub fn empty() -> Self {
        Inventory {
            slots: [InventorySlot::default(); INVENTORY_SIZE],
            selected: 0,
        }
    }

    /// The inventory of a new world: planks, dirt and cobblestone in the first three slots.
    pub fn starter() -> Self {
        let mut inventory = Inventory::empty();
        for (slot, block_type) in [BlockType::WOOD_PLANK, BlockType::DIRT, BlockType::COBBLESTONE]
            .into_iter()
            .enumerate()
        {
            inventory.slots[slot] = InventorySlot {
                block_type: Some(block_type),
                count: STARTER_STACK,
            };
        }
        inventory
    }

    /// Rebuilds an inventory from saved slots.
    ///
    /// # Returns
    /// `None` if there are not exactly `INVENTORY_SIZE` slots or `selected` is outside
    /// the hotbar.
    pub fn from_slots(slots: &[InventorySlot], selected: usize) -> Option<Self> {
        if selected >= HOTBAR_SIZE {
            return None;
        }
        let mut slots: [InventorySlot; INVENTORY_SIZE] = slots.try_into().ok()?;
        slots.iter_mut().for_each(InventorySlot::normalize);
        Some(Inventory { slots, selected })
    }

    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&InventorySlot> {
        self.slots.get(index)
    }

    /// Adds `count` blocks, stacking onto the first slot already holding `block_type`,
    /// otherwise filling the first empty slot.
    ///
    /// # Returns
    /// The number of blocks that did not fit: all of them when the inventory is full, or
    /// the excess over `u32::MAX` when the stack is full.
    pub fn add(&mut self, block_type: BlockType, count: u32) -> u32 {
        if count == 0 || block_type.is_air() {
            return 0;
        }

        let target = self
            .slots
            .iter()
            .position(|slot| slot.block_type == Some(block_type))
            .or_else(|| self.slots.iter().position(InventorySlot::is_empty));

        match target {
            Some(index) => {
                let slot = &mut self.slots[index];
                let stored = count.min(u32::MAX - slot.count);
                slot.block_type = Some(block_type);
                slot.count += stored;
                if stored < count {
                    warn!("Stack of {:?} is full, dropping {}", block_type, count - stored);
                }
                count - stored
            }
            None => {
                warn!("Inventory full, dropping {} x {:?}", count, block_type);
                count
            }
        }
    }

    /// Removes up to `count` blocks from one slot.
    ///
    /// # Returns
    /// How many were actually removed.
    pub fn remove(&mut self, index: usize, count: u32) -> u32 {
        let Some(slot) = self.slots.get_mut(index) else {
            return 0;
        };
        let removed = count.min(slot.count);
        slot.count -= removed;
        slot.normalize();
        removed
    }

    /// Total number of `block_type` across all slots.
    pub fn count_of(&self, block_type: BlockType) -> u32 {
        self.slots
            .iter()
            .filter(|slot| slot.block_type == Some(block_type))
            .fold(0u32, |total, slot| total.saturating_add(slot.count))
    }

    /// Removes `count` blocks of one type, drawing from slots in order.
    ///
    /// # Returns
    /// `false`, with nothing removed, if fewer than `count` are held.
    pub fn take(&mut self, block_type: BlockType, count: u32) -> bool {
        if self.count_of(block_type) < count {
            return false;
        }
        let mut remaining = count;
        for index in 0..INVENTORY_SIZE {
            if remaining == 0 {
                break;
            }
            if self.slots[index].block_type == Some(block_type) {
                remaining -= self.remove(index, remaining);
            }
        }
        true
    }

    /// Selects a hotbar slot, clamping to the hotbar range.
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(HOTBAR_SIZE - 1);
    }

    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// Block type in the selected hotbar slot, if it holds any.
    pub fn selected_block(&self) -> Option<BlockType> {
        self.slots[self.selected].block_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_inventory() {
        let inventory = Inventory::starter();
        assert_eq!(inventory.selected_block(), Some(BlockType::WOOD_PLANK));
        assert_eq!(inventory.count_of(BlockType::DIRT), 64);
        assert_eq!(inventory.count_of(BlockType::COBBLESTONE), 64);
        assert!(inventory.slots()[3..].iter().all(InventorySlot::is_empty));
    }

    #[test]
    fn add_stacks_before_using_a_new_slot() {
        let mut inventory = Inventory::starter();
        assert_eq!(inventory.add(BlockType::DIRT, 3), 0);
        assert_eq!(inventory.slot(1).unwrap().count, 67);

        assert_eq!(inventory.add(BlockType::SAND, 2), 0);
        assert_eq!(
            inventory.slot(3),
            Some(&InventorySlot { block_type: Some(BlockType::SAND), count: 2 })
        );
    }

    #[test]
    fn full_inventory_reports_the_overflow() {
        let mut inventory = Inventory::empty();
        inventory.slots = [InventorySlot { block_type: Some(BlockType::DIRT), count: 1 }; INVENTORY_SIZE];

        assert_eq!(inventory.add(BlockType::SAND, 5), 5);
        assert_eq!(inventory.count_of(BlockType::SAND), 0);
        // Stacking still works when every slot is taken.
        assert_eq!(inventory.add(BlockType::DIRT, 1), 0);
        assert_eq!(inventory.slot(0).unwrap().count, 2);
    }

    #[test]
    fn a_full_stack_reports_what_did_not_fit() {
        let mut inventory = Inventory::empty();
        inventory.slots[0] = InventorySlot { block_type: Some(BlockType::DIRT), count: u32::MAX - 2 };

        assert_eq!(inventory.add(BlockType::DIRT, 5), 3);
        assert_eq!(inventory.slot(0).unwrap().count, u32::MAX);
        assert_eq!(inventory.add(BlockType::DIRT, 1), 1);
        assert_eq!(inventory.count_of(BlockType::DIRT), u32::MAX);
    }

    #[test]
    fn removing_everything_empties_the_slot() {
        let mut inventory = Inventory::starter();
        assert_eq!(inventory.remove(0, 10), 10);
        assert_eq!(inventory.slot(0).unwrap().count, 54);
        assert_eq!(inventory.remove(0, 100), 54);
        assert!(inventory.slot(0).unwrap().is_empty());
        assert_eq!(inventory.selected_block(), None);
        assert_eq!(inventory.remove(99, 1), 0);
    }

    #[test]
    fn take_spans_slots_or_does_nothing() {
        let mut inventory = Inventory::empty();
        inventory.slots[0] = InventorySlot { block_type: Some(BlockType::SAND), count: 2 };
        inventory.slots[5] = InventorySlot { block_type: Some(BlockType::SAND), count: 3 };

        assert!(!inventory.take(BlockType::SAND, 6));
        assert_eq!(inventory.count_of(BlockType::SAND), 5);

        assert!(inventory.take(BlockType::SAND, 4));
        assert!(inventory.slot(0).unwrap().is_empty());
        assert_eq!(inventory.slot(5).unwrap().count, 1);
    }

    #[test]
    fn selection_is_clamped_to_the_hotbar() {
        let mut inventory = Inventory::starter();
        inventory.select(20);
        assert_eq!(inventory.selected_slot(), 8);
        inventory.select(2);
        assert_eq!(inventory.selected_block(), Some(BlockType::COBBLESTONE));
    }

    #[test]
    fn saved_slots_are_validated_and_normalized() {
        let mut slots = vec![InventorySlot::default(); INVENTORY_SIZE];
        slots[0] = InventorySlot { block_type: Some(BlockType::DIRT), count: 0 };
        let inventory = Inventory::from_slots(&slots, 4).unwrap();
        assert!(inventory.slot(0).unwrap().is_empty());

        assert!(Inventory::from_slots(&slots[..35], 0).is_none());
        assert!(Inventory::from_slots(&slots, 9).is_none());
    }
}
