//! Authority actor: a Tokio task that owns the [`InventoryAuthority`].
//!
//! Connection handlers never touch inventories directly. They send commands
//! over an mpsc channel and the actor applies them one at a time, so an
//! owner's requests are processed in the order its handler forwarded them.

use std::collections::HashMap;

use satchel_inventory::InventorySlot;
use satchel_protocol::{InventoryMessage, PeerId, SlotData};
use tokio::sync::{mpsc, oneshot};

use crate::{AuthorityError, Delivery, InventoryAuthority, PresentationSink};

/// Channel for pushing state to one connected peer.
pub type PeerSender = mpsc::UnboundedSender<InventoryMessage>;

pub(crate) enum AuthorityCommand {
    /// A peer finished its handshake: create its inventory.
    Connect {
        peer: PeerId,
        sender: PeerSender,
        reply: oneshot::Sender<Result<(), AuthorityError>>,
    },

    /// A peer went away: drop its inventory.
    Disconnect {
        peer: PeerId,
        reply: oneshot::Sender<Result<(), AuthorityError>>,
    },

    /// An inventory message from a peer.
    Message {
        sender: PeerId,
        message: InventoryMessage,
    },

    /// Server-side grant.
    Give {
        owner: PeerId,
        item_id: String,
        quantity: u32,
    },

    /// Read an owner's current slots.
    Snapshot {
        owner: PeerId,
        reply: oneshot::Sender<Option<Vec<SlotData>>>,
    },

    Shutdown,
}

/// Handle to the running authority actor.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Clone)]
pub struct AuthorityHandle {
    sender: mpsc::Sender<AuthorityCommand>,
}

impl AuthorityHandle {
    /// Registers `peer` and the channel its syncs go to.
    pub async fn connect(
        &self,
        peer: PeerId,
        sender: PeerSender,
    ) -> Result<(), AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::Connect {
            peer,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| AuthorityError::Unavailable)?
    }

    /// Unregisters `peer` and drops its inventory.
    pub async fn disconnect(&self, peer: PeerId) -> Result<(), AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::Disconnect {
            peer,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| AuthorityError::Unavailable)?
    }

    /// Forwards a message from `sender` (fire-and-forget).
    ///
    /// Whether it was accepted is never reported back; an accepted request
    /// shows up as a sync on the owner's channel.
    pub async fn send_message(
        &self,
        sender: PeerId,
        message: InventoryMessage,
    ) -> Result<(), AuthorityError> {
        self.send(AuthorityCommand::Message { sender, message }).await
    }

    /// Grants items to `owner` with authority privileges.
    pub async fn give_item(
        &self,
        owner: PeerId,
        item_id: impl Into<String>,
        quantity: u32,
    ) -> Result<(), AuthorityError> {
        self.send(AuthorityCommand::Give {
            owner,
            item_id: item_id.into(),
            quantity,
        })
        .await
    }

    /// The owner's current slots, or `None` if the owner is not registered.
    pub async fn snapshot(
        &self,
        owner: PeerId,
    ) -> Result<Option<Vec<SlotData>>, AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::Snapshot {
            owner,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| AuthorityError::Unavailable)
    }

    /// Stops the actor. Pending commands queued after this are dropped.
    pub async fn shutdown(&self) -> Result<(), AuthorityError> {
        self.send(AuthorityCommand::Shutdown).await
    }

    async fn send(&self, command: AuthorityCommand) -> Result<(), AuthorityError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| AuthorityError::Unavailable)
    }
}

struct AuthorityActor {
    authority: InventoryAuthority,
    /// Outbound channels of connected peers.
    peers: HashMap<PeerId, PeerSender>,
    /// Where syncs for the authority's own inventory go.
    local_sink: Option<Box<dyn PresentationSink>>,
    receiver: mpsc::Receiver<AuthorityCommand>,
}

impl AuthorityActor {
    async fn run(mut self) {
        tracing::info!(
            items = self.authority.catalog().len(),
            "inventory authority started"
        );

        while let Some(command) = self.receiver.recv().await {
            match command {
                AuthorityCommand::Connect {
                    peer,
                    sender,
                    reply,
                } => {
                    let result = self.authority.register_owner(peer);
                    if result.is_ok() {
                        self.peers.insert(peer, sender);
                    }
                    let _ = reply.send(result);
                }
                AuthorityCommand::Disconnect { peer, reply } => {
                    self.peers.remove(&peer);
                    let result = self.authority.unregister_owner(peer).map(drop);
                    let _ = reply.send(result);
                }
                AuthorityCommand::Message { sender, message } => {
                    let deliveries = self.authority.handle(sender, message);
                    self.dispatch(deliveries);
                }
                AuthorityCommand::Give {
                    owner,
                    item_id,
                    quantity,
                } => {
                    let deliveries =
                        self.authority.give_item(owner, item_id, quantity);
                    self.dispatch(deliveries);
                }
                AuthorityCommand::Snapshot { owner, reply } => {
                    let slots = self
                        .authority
                        .inventory(owner)
                        .map(|inventory| inventory.serialize());
                    let _ = reply.send(slots);
                }
                AuthorityCommand::Shutdown => {
                    tracing::info!("inventory authority shutting down");
                    break;
                }
            }
        }

        tracing::info!("inventory authority stopped");
    }

    fn dispatch(&mut self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match delivery {
                Delivery::Remote { peer, message } => {
                    // A closed channel means the handler is already on its
                    // way out; the Disconnect command will follow.
                    match self.peers.get(&peer) {
                        Some(sender) => {
                            let _ = sender.send(message);
                        }
                        None => {
                            tracing::debug!(%peer, "sync for peer without a channel, dropped");
                        }
                    }
                }
                Delivery::Local { owner, slots } => {
                    if let Some(sink) = &mut self.local_sink {
                        let slots: Vec<InventorySlot> =
                            slots.iter().map(InventorySlot::from).collect();
                        sink.render(&slots);
                    } else {
                        tracing::debug!(%owner, "local sync without a sink");
                    }
                }
            }
        }
    }
}

/// Spawns the authority actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub fn spawn_authority(
    authority: InventoryAuthority,
    channel_size: usize,
) -> AuthorityHandle {
    spawn(authority, None, channel_size)
}

/// Like [`spawn_authority`], for a listen server: the authority also owns
/// an inventory (registered here if it is not already), and its syncs go to
/// `sink` instead of over the network.
pub fn spawn_authority_with_sink(
    mut authority: InventoryAuthority,
    sink: impl PresentationSink,
    channel_size: usize,
) -> AuthorityHandle {
    let local = authority.local_peer();
    if authority.inventory(local).is_none() {
        let _ = authority.register_owner(local);
    }
    spawn(authority, Some(Box::new(sink)), channel_size)
}

fn spawn(
    authority: InventoryAuthority,
    local_sink: Option<Box<dyn PresentationSink>>,
    channel_size: usize,
) -> AuthorityHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let actor = AuthorityActor {
        authority,
        peers: HashMap::new(),
        local_sink,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    AuthorityHandle { sender: tx }
}
