//! Item definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ItemType
// ---------------------------------------------------------------------------

/// Broad category of an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Tool,
    #[default]
    Misc,
}

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Rarity tier, ordered from least to most valuable.
///
/// The derive order is the ordering: `Common < Uncommon < ... < Legendary`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// An immutable item definition.
///
/// Only the catalog holds `Item`s. Inventory slots refer to them by `id`.
///
/// Every field except `id` and `name` has a serde default, so a catalog
/// file only has to spell out what differs from a plain, non-stackable,
/// common misc item worth nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique key. Must be non-empty to enter a catalog.
    pub id: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Whether several units can share one slot.
    #[serde(default)]
    pub stackable: bool,

    /// Units per slot when `stackable`. Ignored otherwise.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,

    #[serde(default)]
    pub item_type: ItemType,

    #[serde(default)]
    pub rarity: Rarity,

    /// Currency worth of one unit.
    #[serde(default)]
    pub value: u32,
}

fn default_max_stack() -> u32 {
    1
}

impl Item {
    /// Creates a non-stackable common misc item with no value.
    ///
    /// Chain the `with_*`/`stackable` builders to fill in the rest.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            stackable: false,
            max_stack: 1,
            item_type: ItemType::Misc,
            rarity: Rarity::Common,
            value: 0,
        }
    }

    /// Makes the item stackable up to `max_stack` units per slot.
    pub fn stackable(mut self, max_stack: u32) -> Self {
        self.stackable = true;
        self.max_stack = max_stack;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// How many units fit in one slot.
    ///
    /// `max_stack` for stackable items, 1 for everything else. A stackable
    /// item with `max_stack == 0` is treated as 1 so that placement always
    /// makes progress.
    pub fn stack_limit(&self) -> u32 {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }
}
