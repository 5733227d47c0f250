//! Inventory messages exchanged between owners and the authority.
//!
//! Each variant corresponds to one remote-callable method of the player
//! entity (`requestInventorySync`, `syncInventoryToOwner`,
//! `requestAddItem`, `requestRemoveItem`, `requestMoveItem`). Requests name
//! the `owner` of the inventory they target; the authority decides whether
//! the sender is allowed to touch it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::PeerId;

/// One slot of a serialized inventory: `(item_id, quantity)`.
///
/// An empty slot is `("", 0)`. Both fields default when missing so a
/// sparse snapshot still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotData {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub quantity: u32,
}

impl SlotData {
    /// Creates slot data for `quantity` units of `item_id`.
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }

    /// An empty slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if this describes an empty slot.
    pub fn is_empty(&self) -> bool {
        self.item_id.is_empty() || self.quantity == 0
    }
}

/// Inventory traffic.
///
/// Internally tagged: `{"type": "RequestMove", "owner": 3, "from": 0, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InventoryMessage {
    /// Owner → Authority: "send me my current inventory".
    RequestSync { owner: PeerId },

    /// Authority → Owner: full snapshot, one entry per slot in index order.
    SyncState { owner: PeerId, slots: Vec<SlotData> },

    /// Owner (or the authority itself) → Authority: add items.
    RequestAdd {
        owner: PeerId,
        item_id: String,
        quantity: u32,
    },

    /// Owner → Authority: remove items by id.
    RequestRemove {
        owner: PeerId,
        item_id: String,
        quantity: u32,
    },

    /// Owner → Authority: move items between two slots.
    ///
    /// `quantity: None` moves the whole source stack. Older clients send
    /// `-1` for the same thing, so any negative number also decodes as
    /// `None`.
    RequestMove {
        owner: PeerId,
        from: u32,
        to: u32,
        #[serde(default, deserialize_with = "move_quantity")]
        quantity: Option<u32>,
    },
}

impl InventoryMessage {
    /// The inventory this message is about.
    pub fn owner(&self) -> PeerId {
        match self {
            Self::RequestSync { owner }
            | Self::SyncState { owner, .. }
            | Self::RequestAdd { owner, .. }
            | Self::RequestRemove { owner, .. }
            | Self::RequestMove { owner, .. } => *owner,
        }
    }

    /// The remote method name this message stands for. Used in logs.
    pub fn rpc_name(&self) -> &'static str {
        match self {
            Self::RequestSync { .. } => "requestInventorySync",
            Self::SyncState { .. } => "syncInventoryToOwner",
            Self::RequestAdd { .. } => "requestAddItem",
            Self::RequestRemove { .. } => "requestRemoveItem",
            Self::RequestMove { .. } => "requestMoveItem",
        }
    }
}

/// `null`, missing, or negative → `None`; otherwise the value, saturated
/// to `u32::MAX`.
fn move_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(n) if n >= 0 => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        _ => None,
    })
}
