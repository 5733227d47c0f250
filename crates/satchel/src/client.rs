//! Owner-side network client.
//!
//! [`SatchelClient`] connects to a server, performs the handshake, and keeps
//! an [`OwnerInventory`] cache up to date from the syncs the server pushes.
//! It never edits the cache itself: every `send_request_*` call only sends
//! a request, and the cache changes when (and if) the authority answers
//! with a new state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use satchel_authority::{OwnerInventory, PresentationSink, Validation};
use satchel_inventory::{InventorySlot, MoveQuantity};
use satchel_protocol::{
    Codec, Envelope, InventoryMessage, JsonCodec, Payload, PeerId, SystemMessage,
};
use satchel_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{PROTOCOL_VERSION, SatchelError};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// A connected owner.
pub struct SatchelClient {
    conn: Arc<WebSocketConnection>,
    codec: JsonCodec,
    peer_id: PeerId,
    authority: PeerId,
    cache: Arc<Mutex<OwnerInventory>>,
    /// Count of accepted syncs, bumped by the reader task.
    revisions: watch::Receiver<u64>,
    reader: JoinHandle<()>,
    seq: u64,
    started: Instant,
}

impl SatchelClient {
    /// Connects to `addr` (`host:port`) and completes the handshake.
    pub async fn connect(addr: &str) -> Result<Self, SatchelError> {
        Self::connect_inner(addr, OwnerInventory::new).await
    }

    /// Like [`connect`](Self::connect), rendering every accepted sync
    /// through `sink`.
    pub async fn connect_with_sink(
        addr: &str,
        sink: impl PresentationSink,
    ) -> Result<Self, SatchelError> {
        Self::connect_inner(addr, move |peer| OwnerInventory::new(peer).with_sink(sink)).await
    }

    async fn connect_inner(
        addr: &str,
        make_cache: impl FnOnce(PeerId) -> OwnerInventory,
    ) -> Result<Self, SatchelError> {
        let conn = WebSocketConnection::connect(addr).await?;
        let codec = JsonCodec;

        let hello = Envelope::system(0, SystemMessage::Handshake {
            version: PROTOCOL_VERSION,
        });
        conn.send(&codec.encode(&hello)?).await?;

        let (peer_id, authority) = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await {
            Ok(Ok(Some(data))) => {
                let reply: Envelope = codec.decode(&data)?;
                match reply.payload {
                    Payload::System(SystemMessage::HandshakeAck {
                        peer_id, authority, ..
                    }) => (peer_id, authority),
                    Payload::System(SystemMessage::Error { code, message }) => {
                        return Err(SatchelError::Handshake(format!("{code}: {message}")));
                    }
                    _ => {
                        return Err(SatchelError::Handshake("expected HandshakeAck".into()));
                    }
                }
            }
            Ok(Ok(None)) => {
                return Err(SatchelError::Handshake("server closed the connection".into()));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(SatchelError::Handshake("handshake timed out".into())),
        };
        tracing::info!(%peer_id, addr, "connected to inventory server");

        let cache = Arc::new(Mutex::new(make_cache(peer_id)));
        let conn = Arc::new(conn);
        let (revision_tx, revisions) = watch::channel(0);

        let reader = tokio::spawn(read_loop(
            Arc::clone(&conn),
            codec,
            authority,
            Arc::clone(&cache),
            revision_tx,
        ));

        Ok(Self {
            conn,
            codec,
            peer_id,
            authority,
            cache,
            revisions,
            reader,
            seq: 1,
            started: Instant::now(),
        })
    }

    /// The peer id the server assigned to this connection.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn authority(&self) -> PeerId {
        self.authority
    }

    /// The cached slots, as of the last accepted sync.
    pub fn slots(&self) -> Vec<InventorySlot> {
        self.with_cache(|owner| owner.slots().to_vec())
    }

    /// One cached slot.
    pub fn slot(&self, index: usize) -> Result<InventorySlot, SatchelError> {
        self.with_cache(|owner| owner.inventory().slot(index).cloned())
            .map_err(SatchelError::from)
    }

    /// Cached count of `item_id` across all slots.
    pub fn item_count(&self, item_id: &str) -> u32 {
        self.with_cache(|owner| owner.inventory().item_count(item_id))
    }

    /// Asks the authority for a fresh snapshot.
    pub async fn request_sync(&mut self) -> Result<(), SatchelError> {
        let request = self.with_cache(OwnerInventory::request_sync);
        self.send_inventory(request).await
    }

    pub async fn send_request_add(
        &mut self,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), SatchelError> {
        let request = self.with_cache(|owner| owner.request_add(item_id, quantity));
        self.send_inventory(request).await
    }

    pub async fn send_request_remove(
        &mut self,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), SatchelError> {
        let request = self.with_cache(|owner| owner.request_remove(item_id, quantity));
        self.send_inventory(request).await
    }

    pub async fn send_request_move(
        &mut self,
        from: u32,
        to: u32,
        quantity: MoveQuantity,
    ) -> Result<(), SatchelError> {
        let request = self.with_cache(|owner| owner.request_move(from, to, quantity));
        self.send_inventory(request).await
    }

    /// Sends an arbitrary inventory message. The server attributes it to
    /// this connection's peer id whatever `owner` it names.
    pub async fn send_inventory(
        &mut self,
        message: InventoryMessage,
    ) -> Result<(), SatchelError> {
        let envelope = Envelope::inventory(self.next_seq(), message);
        self.send_envelope(envelope).await
    }

    /// Sends a keep-alive so the server's idle timeout does not fire.
    pub async fn heartbeat(&mut self) -> Result<(), SatchelError> {
        let client_time = self.started.elapsed().as_millis() as u64;
        let envelope =
            Envelope::system(self.next_seq(), SystemMessage::Heartbeat { client_time });
        self.send_envelope(envelope).await
    }

    /// Waits until at least one accepted sync has arrived since the last
    /// wait.
    ///
    /// Syncs are merged: a sync that arrived before this call counts, so
    /// calling it right after sending a request cannot miss the answer, but
    /// several syncs that landed in the meantime satisfy a single wait. To
    /// wait for a specific number of syncs use
    /// [`wait_for_revision`](Self::wait_for_revision).
    pub async fn wait_for_sync(&mut self) -> Result<(), SatchelError> {
        self.revisions.changed().await.map_err(|_| closed())
    }

    /// How many syncs have been accepted since connecting.
    pub fn revision(&self) -> u64 {
        *self.revisions.borrow()
    }

    /// Waits until [`revision`](Self::revision) reaches `revision`.
    pub async fn wait_for_revision(&mut self, revision: u64) -> Result<(), SatchelError> {
        self.revisions
            .wait_for(|current| *current >= revision)
            .await
            .map(drop)
            .map_err(|_| closed())
    }

    /// Tells the server we are leaving and closes the connection.
    pub async fn disconnect(mut self) -> Result<(), SatchelError> {
        let envelope = Envelope::system(self.next_seq(), SystemMessage::Disconnect {
            reason: "client disconnect".into(),
        });
        self.send_envelope(envelope).await?;
        self.conn.close().await?;
        Ok(())
    }

    async fn send_envelope(&self, envelope: Envelope) -> Result<(), SatchelError> {
        let timestamp = self.started.elapsed().as_millis() as u64;
        let bytes = self.codec.encode(&envelope.at(timestamp))?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    fn with_cache<T>(&self, f: impl FnOnce(&OwnerInventory) -> T) -> T {
        let owner = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        f(&owner)
    }

    fn next_seq(&mut self) -> u64 {
        let current = self.seq;
        self.seq += 1;
        current
    }
}

impl Drop for SatchelClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn closed() -> SatchelError {
    SatchelError::Transport(TransportError::ConnectionClosed(
        "server closed the connection".into(),
    ))
}

/// Applies server pushes to the cache until the connection ends.
async fn read_loop(
    conn: Arc<WebSocketConnection>,
    codec: JsonCodec,
    authority: PeerId,
    cache: Arc<Mutex<OwnerInventory>>,
    revisions: watch::Sender<u64>,
) {
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!("server closed the connection");
                break;
            }
            Err(e) => {
                tracing::debug!(error = %e, "recv error");
                break;
            }
        };

        let envelope: Envelope = match codec.decode(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode envelope");
                continue;
            }
        };

        match envelope.payload {
            Payload::Inventory(message) => {
                // Everything on this connection comes from the server,
                // which speaks for the authority.
                let outcome = cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .apply(authority, message);
                if outcome == Validation::Allowed {
                    revisions.send_modify(|revision| *revision += 1);
                }
            }
            Payload::System(SystemMessage::HeartbeatAck {
                client_time,
                server_time,
            }) => {
                tracing::debug!(client_time, server_time, "heartbeat acknowledged");
            }
            Payload::System(SystemMessage::Error { code, message }) => {
                tracing::warn!(code, %message, "server reported an error");
            }
            Payload::System(SystemMessage::Disconnect { reason }) => {
                tracing::info!(%reason, "server disconnected us");
                break;
            }
            Payload::System(_) => {
                tracing::debug!("ignoring unexpected system message");
            }
        }
    }
}
