//! The owner side: a read-only cache of one inventory.

use satchel_inventory::{Inventory, InventorySlot, MoveQuantity};
use satchel_protocol::{InventoryMessage, PeerId};

use crate::{DenyReason, Validation};

/// Something that shows an inventory to a player.
///
/// Called with the full slot list after every accepted sync.
pub trait PresentationSink: Send + 'static {
    fn render(&mut self, slots: &[InventorySlot]);
}

impl<F> PresentationSink for F
where
    F: FnMut(&[InventorySlot]) + Send + 'static,
{
    fn render(&mut self, slots: &[InventorySlot]) {
        self(slots)
    }
}

/// An owner's view of their inventory.
///
/// The cache is never mutated locally. It changes only when the authority
/// pushes a `SyncState`, which overwrites it wholesale. The `request_*`
/// methods build the messages to send; what comes back decides the state.
pub struct OwnerInventory {
    owner: PeerId,
    authority: PeerId,
    cache: Inventory,
    sink: Option<Box<dyn PresentationSink>>,
}

impl std::fmt::Debug for OwnerInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerInventory")
            .field("owner", &self.owner)
            .field("authority", &self.authority)
            .field("cache", &self.cache)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl OwnerInventory {
    /// Creates an empty cache for `owner`, trusting [`PeerId::AUTHORITY`].
    pub fn new(owner: PeerId) -> Self {
        Self {
            owner,
            authority: PeerId::AUTHORITY,
            cache: Inventory::new(),
            sink: None,
        }
    }

    /// Installs a presentation sink.
    pub fn with_sink(mut self, sink: impl PresentationSink) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn owner(&self) -> PeerId {
        self.owner
    }

    /// The last state received from the authority.
    pub fn inventory(&self) -> &Inventory {
        &self.cache
    }

    pub fn slots(&self) -> &[InventorySlot] {
        self.cache.slots()
    }

    /// Applies a message received from `sender`.
    ///
    /// Only a `SyncState` for this owner, sent by the authority, is
    /// accepted. Requests are never processed on the owner side.
    pub fn apply(&mut self, sender: PeerId, message: InventoryMessage) -> Validation {
        let rpc = message.rpc_name();
        let InventoryMessage::SyncState { owner, slots } = message else {
            tracing::warn!(%sender, rpc, "request sent to owner, refused");
            return Validation::NotAuthority;
        };
        if sender != self.authority {
            tracing::warn!(%sender, %owner, "state push from non-authority peer, dropped");
            return Validation::Denied(DenyReason::NotAuthoritySender);
        }
        if owner != self.owner {
            tracing::warn!(%owner, local = %self.owner, "state push for another inventory, dropped");
            return Validation::Denied(DenyReason::NotOwner);
        }

        self.cache.deserialize(&slots);
        tracing::debug!(owner = %self.owner, "inventory cache refreshed");
        if let Some(sink) = &mut self.sink {
            sink.render(self.cache.slots());
        }
        Validation::Allowed
    }

    pub fn request_sync(&self) -> InventoryMessage {
        InventoryMessage::RequestSync { owner: self.owner }
    }

    pub fn request_add(&self, item_id: impl Into<String>, quantity: u32) -> InventoryMessage {
        InventoryMessage::RequestAdd {
            owner: self.owner,
            item_id: item_id.into(),
            quantity,
        }
    }

    pub fn request_remove(
        &self,
        item_id: impl Into<String>,
        quantity: u32,
    ) -> InventoryMessage {
        InventoryMessage::RequestRemove {
            owner: self.owner,
            item_id: item_id.into(),
            quantity,
        }
    }

    pub fn request_move(&self, from: u32, to: u32, quantity: MoveQuantity) -> InventoryMessage {
        InventoryMessage::RequestMove {
            owner: self.owner,
            from,
            to,
            quantity: quantity.to_wire(),
        }
    }
}
