//! Item catalog for Satchel.
//!
//! An [`ItemCatalog`] maps item ids to immutable [`Item`] definitions. The
//! inventory engine never stores items, only ids; every stacking decision
//! (is it stackable, how high does it stack) goes through a catalog lookup.
//!
//! A catalog is populated once per session, from the built-in seed set
//! ([`ItemCatalog::with_seed_items`]) or a JSON file
//! ([`ItemCatalog::load`]), and is then owned by the inventory authority.
//! There is no global instance.

mod catalog;
mod error;
mod item;
mod seed;

pub use catalog::ItemCatalog;
pub use error::CatalogError;
pub use item::{Item, ItemType, Rarity};
pub use seed::seed_items;
