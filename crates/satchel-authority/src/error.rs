//! Error types for the authority layer.
//!
//! Request denials are not errors: they are logged and dropped. These cover
//! lifecycle misuse and a dead actor.

use satchel_protocol::PeerId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// An inventory is already registered for this peer.
    #[error("inventory for {0} is already registered")]
    AlreadyRegistered(PeerId),

    /// No inventory is registered for this peer.
    #[error("no inventory registered for {0}")]
    UnknownOwner(PeerId),

    /// The authority actor has stopped or its channel is closed.
    #[error("inventory authority is unavailable")]
    Unavailable,
}
