//! The item catalog: id → [`Item`] registry.

use std::collections::HashMap;
use std::path::Path;

use crate::{CatalogError, Item, ItemType, Rarity, seed_items};

/// Registry of item definitions, keyed by item id.
///
/// Not thread-safe on its own. The authority owns its catalog and only
/// touches it from the authority task, so a plain `HashMap` is enough.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<String, Item>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the built-in starter items.
    pub fn with_seed_items() -> Self {
        let mut catalog = Self::new();
        for item in seed_items() {
            catalog.insert(item);
        }
        catalog
    }

    /// Builds a catalog from a JSON array of item definitions.
    ///
    /// Entries go through [`insert`](Self::insert): an empty id is skipped
    /// and a repeated id overwrites the earlier entry, both with a warning.
    ///
    /// # Errors
    /// [`CatalogError::Parse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        tracing::info!(items = catalog.len(), "item catalog loaded");
        Ok(catalog)
    }

    /// Reads a JSON catalog file. See [`from_json`](Self::from_json).
    ///
    /// # Errors
    /// [`CatalogError::Io`] if the file cannot be read, or
    /// [`CatalogError::Parse`] if its content is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&json)
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Returns `true` if the catalog knows `id`.
    pub fn has(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Inserts an item definition.
    ///
    /// Returns `false` (and logs a warning) when `item.id` is empty.
    /// An existing entry with the same id is replaced, also with a warning.
    pub fn insert(&mut self, item: Item) -> bool {
        if item.id.is_empty() {
            tracing::warn!(name = %item.name, "rejected catalog item with empty id");
            return false;
        }
        let id = item.id.clone();
        if self.items.insert(id.clone(), item).is_some() {
            tracing::warn!(item_id = %id, "catalog item overwritten");
        } else {
            tracing::debug!(item_id = %id, "catalog item registered");
        }
        true
    }

    /// Removes an item definition. Returns whether one was present.
    ///
    /// Slots still holding the id become "unknown item" slots: they keep
    /// their contents but can no longer be stacked or moved.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.items.remove(id).is_some();
        if removed {
            tracing::info!(item_id = %id, "catalog item removed");
        }
        removed
    }

    /// Read-only view of every definition.
    pub fn all(&self) -> &HashMap<String, Item> {
        &self.items
    }

    /// Items of the given type, sorted by id.
    pub fn items_of_type(&self, item_type: ItemType) -> Vec<&Item> {
        self.filtered(|item| item.item_type == item_type)
    }

    /// Items of the given rarity, sorted by id.
    pub fn items_of_rarity(&self, rarity: Rarity) -> Vec<&Item> {
        self.filtered(|item| item.rarity == rarity)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn filtered(&self, keep: impl Fn(&Item) -> bool) -> Vec<&Item> {
        let mut found: Vec<&Item> =
            self.items.values().filter(|item| keep(item)).collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }
}

// =========================================================================
// Tests
// =========================================================================
