//! Unified error type for Satchel.

use satchel_authority::AuthorityError;
use satchel_catalog::CatalogError;
use satchel_inventory::InventoryError;
use satchel_protocol::ProtocolError;
use satchel_transport::TransportError;

/// Top-level error wrapping every layer's error.
///
/// `#[from]` on each variant lets `?` lift sub-crate errors automatically.
/// Inventory request denials never show up here: they are dropped at the
/// authority and only logged.
#[derive(Debug, thiserror::Error)]
pub enum SatchelError {
    /// Connection, send, or receive failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The item catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A checked slot access was out of range.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// The authority rejected a lifecycle call or has stopped.
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// The peer broke the handshake (wrong first frame, bad version,
    /// timeout, or an error reply).
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// A configuration file is malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
