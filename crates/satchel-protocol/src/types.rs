//! Connection-level protocol types: identity and the envelope every frame
//! travels in. The transport is reliable and ordered, so frames carry no
//! delivery label.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::InventoryMessage;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A network peer: the authority or one of the owners.
///
/// Newtype over `u32` so a peer can never be confused with a slot index or
/// a quantity. The authority is always [`PeerId::AUTHORITY`]; owners get a
/// random id from the server during the handshake.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(pub u32);

impl PeerId {
    /// The conventional authority (server) peer.
    pub const AUTHORITY: PeerId = PeerId(1);

    /// Returns `true` if this is the conventional authority id.
    pub fn is_authority(self) -> bool {
        self == Self::AUTHORITY
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SystemMessage
// ---------------------------------------------------------------------------

/// Connection plumbing, handled by the server itself rather than the
/// inventory authority.
///
/// Internally tagged (`{"type": "Handshake", "version": 1}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemMessage {
    /// Client → Server: first frame on every connection.
    Handshake { version: u32 },

    /// Server → Client: the peer id assigned to this connection and the
    /// id of the authority that will accept its requests.
    HandshakeAck {
        peer_id: PeerId,
        authority: PeerId,
        server_time: u64,
    },

    /// Either direction: orderly shutdown.
    Disconnect { reason: String },

    /// Client → Server: keep-alive.
    Heartbeat { client_time: u64 },

    /// Server → Client: keep-alive reply, echoing the client's timestamp.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Server → Client: connection-level failure (bad version, wrong first
    /// frame). Never sent in response to an inventory request.
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// What an envelope carries.
///
/// Adjacently tagged: `{"type": "Inventory", "data": {...}}`, so the
/// connection handler can route on the outer tag before looking inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    /// Connection plumbing.
    System(SystemMessage),

    /// An inventory request or snapshot.
    Inventory(InventoryMessage),
}

/// The top-level frame. Every message on the wire is an `Envelope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-sender sequence number, starting at 0 for the handshake.
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    #[serde(default)]
    pub timestamp: u64,

    /// The content.
    pub payload: Payload,
}

impl Envelope {
    /// Wraps a system message.
    pub fn system(seq: u64, msg: SystemMessage) -> Self {
        Self {
            seq,
            timestamp: 0,
            payload: Payload::System(msg),
        }
    }

    /// Wraps an inventory message.
    pub fn inventory(seq: u64, msg: InventoryMessage) -> Self {
        Self {
            seq,
            timestamp: 0,
            payload: Payload::Inventory(msg),
        }
    }

    /// Sets the timestamp, builder style.
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

// =========================================================================
// Tests
// =========================================================================
