//! Frame transport for Satchel.
//!
//! Inventory traffic needs reliable, ordered delivery between one authority
//! and many owners, and nothing more. A [`Transport`] hands out incoming
//! [`Connection`]s; a connection moves opaque frames both ways. Which peer
//! sits behind a connection is decided later, by the server's handshake.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] and
//!   [`WebSocketConnection`] on top of `tokio-tungstenite`.

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier. Shows up in logs as `conn-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates an id no other connection in this process has had.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// The listening side: produces one [`Connection`] per remote owner.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next owner to connect.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The bound address. Useful after binding port 0.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// One bidirectional, ordered frame stream.
///
/// `send` and `recv` may be awaited at the same time from different
/// places: the server pushes `SyncState` frames while the same connection
/// is parked in `recv` waiting for the owner's next request.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send(&self, frame: &[u8]) -> Result<(), Self::Error>;

    /// The next frame, or `Ok(None)` once the other side has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
