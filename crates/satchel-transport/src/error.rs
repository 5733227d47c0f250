use std::io;

/// Failures below the protocol layer.
///
/// Every variant except `ConnectionClosed` wraps the underlying I/O or
/// WebSocket error so the cause survives into logs.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A TCP accept or the server side of the WebSocket upgrade failed.
    #[error("incoming connection failed: {0}")]
    Accept(#[source] io::Error),

    /// Dialing a server failed, either at TCP or at the upgrade.
    #[error("could not reach {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// The other side is gone.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
