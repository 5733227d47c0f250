//! The inventory engine.
//!
//! An [`Inventory`] is a fixed grid of [`INVENTORY_SIZE`] slots
//! ([`GRID_ROWS`] × [`GRID_COLUMNS`]). Every mutation (add, remove, move,
//! swap) is a self-contained, synchronous step that leaves each slot
//! consistent: a slot with zero quantity never keeps an item id.
//!
//! Slots hold item ids, not items. Operations that need stacking rules take
//! the [`Item`](satchel_catalog::Item) or an
//! [`ItemCatalog`](satchel_catalog::ItemCatalog) as an argument.
//!
//! Scanning is always low-index-first, so the placement of every unit is
//! deterministic.

mod error;
mod inventory;
mod slot;

pub use error::InventoryError;
pub use inventory::{Inventory, MoveQuantity};
pub use slot::InventorySlot;

/// Number of slots in every inventory.
pub const INVENTORY_SIZE: usize = GRID_ROWS * GRID_COLUMNS;

/// Rows in the inventory grid.
pub const GRID_ROWS: usize = 4;

/// Columns in the inventory grid.
pub const GRID_COLUMNS: usize = 5;
