//! The authoritative side: every inventory's source of truth.

use std::collections::HashMap;

use satchel_catalog::ItemCatalog;
use satchel_inventory::{Inventory, MoveQuantity};
use satchel_protocol::{InventoryMessage, PeerId, SlotData};

use crate::{
    AuthorityConfig, AuthorityError, RpcContext, Validation, validate_message,
};

/// A state push produced by the authority after handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Send `message` to a remote peer.
    Remote {
        peer: PeerId,
        message: InventoryMessage,
    },
    /// The owner is the authority itself (listen server / offline play):
    /// apply locally, no network round trip.
    Local { owner: PeerId, slots: Vec<SlotData> },
}

impl Delivery {
    fn sync(owner: PeerId, slots: Vec<SlotData>) -> Self {
        if owner.is_authority() {
            Self::Local { owner, slots }
        } else {
            Self::Remote {
                peer: owner,
                message: InventoryMessage::SyncState { owner, slots },
            }
        }
    }
}

/// Owns the catalog and one [`Inventory`] per registered owner.
///
/// All mutation happens through [`handle`](Self::handle), which runs the
/// guard first. Denied requests are logged and dropped; the sender gets no
/// reply either way.
#[derive(Debug)]
pub struct InventoryAuthority {
    catalog: ItemCatalog,
    config: AuthorityConfig,
    inventories: HashMap<PeerId, Inventory>,
}

impl InventoryAuthority {
    pub fn new(catalog: ItemCatalog, config: AuthorityConfig) -> Self {
        Self {
            catalog,
            config,
            inventories: HashMap::new(),
        }
    }

    /// The peer this authority acts as.
    pub fn local_peer(&self) -> PeerId {
        PeerId::AUTHORITY
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Admin access to the catalog (insert/remove definitions at runtime).
    pub fn catalog_mut(&mut self) -> &mut ItemCatalog {
        &mut self.catalog
    }

    /// Creates an empty inventory for a newly spawned owner.
    pub fn register_owner(&mut self, owner: PeerId) -> Result<(), AuthorityError> {
        if self.inventories.contains_key(&owner) {
            return Err(AuthorityError::AlreadyRegistered(owner));
        }
        self.inventories.insert(owner, Inventory::new());
        tracing::info!(%owner, owners = self.inventories.len(), "inventory registered");
        Ok(())
    }

    /// Drops an owner's inventory and returns it.
    pub fn unregister_owner(
        &mut self,
        owner: PeerId,
    ) -> Result<Inventory, AuthorityError> {
        let inventory = self
            .inventories
            .remove(&owner)
            .ok_or(AuthorityError::UnknownOwner(owner))?;
        tracing::info!(%owner, owners = self.inventories.len(), "inventory released");
        Ok(inventory)
    }

    pub fn inventory(&self, owner: PeerId) -> Option<&Inventory> {
        self.inventories.get(&owner)
    }

    pub fn owner_count(&self) -> usize {
        self.inventories.len()
    }

    /// A full-state push for `owner`, if registered.
    pub fn sync_for(&self, owner: PeerId) -> Option<Delivery> {
        self.inventories
            .get(&owner)
            .map(|inventory| Delivery::sync(owner, inventory.serialize()))
    }

    /// Grants items to `owner` as the authority. Goes through the same
    /// path as a client `RequestAdd`, so clamping and the catalog check
    /// still apply.
    pub fn give_item(
        &mut self,
        owner: PeerId,
        item_id: impl Into<String>,
        quantity: u32,
    ) -> Vec<Delivery> {
        let request = InventoryMessage::RequestAdd {
            owner,
            item_id: item_id.into(),
            quantity,
        };
        self.handle(self.local_peer(), request)
    }

    /// Validates and applies one message from `sender`.
    ///
    /// Returns the syncs to push: one for the target owner when its
    /// inventory changed (or was explicitly requested), none otherwise.
    pub fn handle(
        &mut self,
        sender: PeerId,
        message: InventoryMessage,
    ) -> Vec<Delivery> {
        let owner = message.owner();
        let rpc = message.rpc_name();

        let ctx = RpcContext::new(self.local_peer(), PeerId::AUTHORITY, sender);
        match validate_message(&ctx, &message) {
            Validation::Allowed => {}
            Validation::Denied(reason) => {
                tracing::warn!(%sender, %owner, rpc, %reason, "request denied");
                return Vec::new();
            }
            Validation::NotAuthority => {
                tracing::warn!(%sender, %owner, rpc, "not the authority, request refused");
                return Vec::new();
            }
        }

        let Some(inventory) = self.inventories.get_mut(&owner) else {
            tracing::warn!(%sender, %owner, rpc, "no inventory for owner");
            return Vec::new();
        };

        let changed = match message {
            InventoryMessage::RequestSync { .. } => true,
            InventoryMessage::RequestAdd {
                item_id, quantity, ..
            } => {
                let Some(quantity) = self.config.clamp(quantity) else {
                    return Vec::new();
                };
                let Some(item) = self.catalog.get(&item_id) else {
                    tracing::warn!(%sender, %owner, %item_id, "add rejected: unknown item");
                    return Vec::new();
                };
                let remaining = inventory.add_item(item, quantity);
                tracing::debug!(%owner, %item_id, quantity, remaining, "add applied");
                remaining < quantity
            }
            InventoryMessage::RequestRemove {
                item_id, quantity, ..
            } => {
                let Some(quantity) = self.config.clamp(quantity) else {
                    return Vec::new();
                };
                let removed = inventory.remove_item(&item_id, quantity);
                tracing::debug!(%owner, %item_id, quantity, removed, "remove applied");
                removed > 0
            }
            InventoryMessage::RequestMove {
                from, to, quantity, ..
            } => {
                let quantity = match quantity {
                    None => MoveQuantity::All,
                    Some(n) => match self.config.clamp(n) {
                        Some(n) => MoveQuantity::Exact(n),
                        None => return Vec::new(),
                    },
                };
                let moved = inventory.move_item(
                    &self.catalog,
                    from as usize,
                    to as usize,
                    quantity,
                );
                tracing::debug!(%owner, slot = from, to, moved, "move applied");
                moved
            }
            InventoryMessage::SyncState { .. } => false,
        };

        if !changed {
            return Vec::new();
        }
        self.sync_for(owner).into_iter().collect()
    }
}
