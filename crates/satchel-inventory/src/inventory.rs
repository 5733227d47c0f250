//! The slot grid and its mutation algorithms.

use satchel_catalog::{Item, ItemCatalog};
use satchel_protocol::SlotData;

use crate::{GRID_COLUMNS, INVENTORY_SIZE, InventoryError, InventorySlot};

/// How much of the source stack a move should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveQuantity {
    /// The whole source stack.
    #[default]
    All,
    /// Up to this many units, clamped to what the source holds.
    Exact(u32),
}

impl MoveQuantity {
    /// The wire form: `None` for the whole stack.
    pub fn to_wire(self) -> Option<u32> {
        match self {
            Self::All => None,
            Self::Exact(n) => Some(n),
        }
    }
}

impl From<Option<u32>> for MoveQuantity {
    fn from(quantity: Option<u32>) -> Self {
        quantity.map_or(Self::All, Self::Exact)
    }
}

/// A fixed-size grid of [`INVENTORY_SIZE`] slots.
///
/// Mutations are best effort: an add that does not fit places what it can
/// and reports the rest, a move that cannot land in full carries what it
/// can. Invalid indices and zero quantities are no-ops that report failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    slots: [InventorySlot; INVENTORY_SIZE],
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| InventorySlot::empty()),
        }
    }
}

impl Inventory {
    /// Creates an inventory with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    /// Checked access to one slot.
    pub fn slot(&self, index: usize) -> Result<&InventorySlot, InventoryError> {
        self.slots.get(index).ok_or(InventoryError::InvalidSlot(index))
    }

    /// Overwrites one slot directly, bypassing stacking rules.
    ///
    /// For admin tooling and test setup; gameplay goes through
    /// [`add_item`](Self::add_item).
    pub fn set_slot(
        &mut self,
        index: usize,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(InventoryError::InvalidSlot(index))?;
        slot.set(item_id, quantity);
        Ok(())
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(InventorySlot::clear);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(InventorySlot::is_empty)
    }

    /// `(row, column)` of a slot in the 4×5 grid.
    pub fn grid_position(index: usize) -> Option<(usize, usize)> {
        (index < INVENTORY_SIZE)
            .then_some((index / GRID_COLUMNS, index % GRID_COLUMNS))
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Adds `quantity` units of `item`. Returns the units that did not fit.
    ///
    /// Stackable items first top off slots already holding the item, then
    /// fill empty slots. Both passes go low index first, each slot taking
    /// at most [`Item::stack_limit`] units.
    pub fn add_item(&mut self, item: &Item, quantity: u32) -> u32 {
        if quantity == 0 {
            return 0;
        }
        let remaining = self.place(item, quantity, &[]);
        if remaining > 0 {
            tracing::debug!(
                item_id = %item.id,
                requested = quantity,
                remaining,
                "inventory full, add partially applied"
            );
        }
        remaining
    }

    /// Removes up to `quantity` units of `item_id`, low index first.
    /// Returns how many were actually removed.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> u32 {
        if item_id.is_empty() || quantity == 0 {
            return 0;
        }
        let mut removed = 0;
        for slot in &mut self.slots {
            if removed == quantity {
                break;
            }
            if slot.holds(item_id) {
                removed += slot.take(quantity - removed);
            }
        }
        removed
    }

    /// Moves units from slot `from` to slot `to`.
    ///
    /// 1. If `to` is empty, or holds the same stackable item with enough
    ///    headroom, the whole amount lands there.
    /// 2. Otherwise the move is best effort: the amount spreads over every
    ///    slot but the source by the [`add_item`](Self::add_item) rules, low
    ///    index first, so a same-item destination only fills up when its
    ///    turn comes. Units that find no room stay in the source.
    ///
    /// Returns `true` if at least one unit moved. Invalid indices, an empty
    /// source, `from == to`, and an item missing from `catalog` all return
    /// `false` without touching anything.
    pub fn move_item(
        &mut self,
        catalog: &ItemCatalog,
        from: usize,
        to: usize,
        quantity: MoveQuantity,
    ) -> bool {
        if from >= INVENTORY_SIZE || to >= INVENTORY_SIZE {
            tracing::warn!(from, to, "move rejected: slot index out of range");
            return false;
        }
        if from == to {
            return false;
        }

        let source = &self.slots[from];
        if source.is_empty() {
            return false;
        }
        let amount = match quantity {
            MoveQuantity::All => source.quantity(),
            MoveQuantity::Exact(n) => n.min(source.quantity()),
        };
        if amount == 0 {
            return false;
        }
        let Some(item) = catalog.get(source.item_id()) else {
            tracing::warn!(
                item_id = %source.item_id(),
                slot = from,
                "move rejected: unknown item"
            );
            return false;
        };

        let limit = item.stack_limit();
        let dest = &self.slots[to];
        let fits_whole = dest.is_empty()
            || (item.stackable
                && dest.holds(&item.id)
                && dest.quantity().saturating_add(amount) <= limit);

        if fits_whole {
            self.slots[from].take(amount);
            let dest = &mut self.slots[to];
            if dest.is_empty() {
                dest.set(&item.id, amount);
            } else {
                dest.grow(amount);
            }
            return true;
        }

        // A same-item destination is just another stack to the add rules;
        // a foreign one is skipped by them.
        let remaining = self.place(item, amount, &[from]);

        let moved = amount - remaining;
        if moved == 0 {
            tracing::debug!(from, to, item_id = %item.id, "move found no room");
            return false;
        }
        self.slots[from].take(moved);
        tracing::debug!(from, to, moved, left_in_source = remaining, "move redistributed");
        true
    }

    /// Swaps two slots, or merges them when both hold the same stackable
    /// item (destination filled up to its stack limit, overflow left in
    /// the source).
    ///
    /// Returns `false` only for an out-of-range index. Swapping two empty
    /// slots, or a slot with itself, succeeds without changes.
    pub fn swap_items(
        &mut self,
        catalog: &ItemCatalog,
        from: usize,
        to: usize,
    ) -> bool {
        if from >= INVENTORY_SIZE || to >= INVENTORY_SIZE {
            tracing::warn!(from, to, "swap rejected: slot index out of range");
            return false;
        }
        if from == to {
            return true;
        }

        let (source, dest) = (&self.slots[from], &self.slots[to]);
        let merge_limit = if !source.is_empty() && source.item_id() == dest.item_id() {
            catalog
                .get(source.item_id())
                .filter(|item| item.stackable)
                .map(Item::stack_limit)
        } else {
            None
        };

        match merge_limit {
            Some(limit) => {
                let headroom = limit.saturating_sub(self.slots[to].quantity());
                let absorbed = self.slots[from].take(headroom);
                self.slots[to].grow(absorbed);
            }
            None => self.slots.swap(from, to),
        }
        true
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Total units of `item_id` across all slots.
    pub fn item_count(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .filter(|slot| slot.holds(item_id))
            .fold(0u32, |sum, slot| sum.saturating_add(slot.quantity()))
    }

    /// Returns `true` if at least `quantity` units of `item_id` are held.
    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.item_count(item_id) >= quantity
    }

    /// Shorthand for `has_item(item_id, 1)`.
    pub fn contains(&self, item_id: &str) -> bool {
        self.has_item(item_id, 1)
    }

    /// Index of the lowest empty slot.
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(InventorySlot::is_empty)
    }

    /// Advisory upper bound on how many units of `item` could still be
    /// added: headroom in matching stacks plus a full stack per empty slot.
    pub fn free_space_for(&self, item: &Item) -> u32 {
        let limit = item.stack_limit();
        self.slots
            .iter()
            .map(|slot| {
                if slot.is_empty() {
                    limit
                } else if item.stackable && slot.holds(&item.id) {
                    limit.saturating_sub(slot.quantity())
                } else {
                    0
                }
            })
            .fold(0u32, u32::saturating_add)
    }

    // -----------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------

    /// Every slot as `(item_id, quantity)`, index order preserved.
    pub fn serialize(&self) -> Vec<SlotData> {
        self.slots.iter().map(InventorySlot::to_data).collect()
    }

    /// Overwrites the first `min(data.len(), INVENTORY_SIZE)` slots from a
    /// snapshot. Slots past the end of a short snapshot keep their current
    /// contents, and extra entries beyond the grid are ignored.
    pub fn deserialize(&mut self, data: &[SlotData]) {
        for (slot, entry) in self.slots.iter_mut().zip(data) {
            *slot = InventorySlot::from(entry);
        }
        if data.len() > INVENTORY_SIZE {
            tracing::debug!(
                received = data.len(),
                "snapshot longer than inventory, tail ignored"
            );
        }
    }

    /// Places up to `quantity` units by the stacking rules, skipping the
    /// given slot indices. Returns what did not fit.
    fn place(&mut self, item: &Item, quantity: u32, skip: &[usize]) -> u32 {
        let limit = item.stack_limit();
        let mut remaining = quantity;

        if item.stackable {
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if remaining == 0 {
                    break;
                }
                if skip.contains(&index)
                    || !slot.holds(&item.id)
                    || slot.quantity() >= limit
                {
                    continue;
                }
                let added = (limit - slot.quantity()).min(remaining);
                slot.grow(added);
                remaining -= added;
            }
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if skip.contains(&index) || !slot.is_empty() {
                continue;
            }
            let added = limit.min(remaining);
            slot.set(&item.id, added);
            remaining -= added;
        }

        remaining
    }
}

// =========================================================================
// Tests
// =========================================================================
