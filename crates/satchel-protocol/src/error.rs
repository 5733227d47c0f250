//! Error types for the protocol layer.
//!
//! Every Satchel crate owns its error enum. A `ProtocolError` always means
//! bytes could not become a message (or the other way around); it never
//! describes a rejected inventory request, because those are dropped
//! silently at the authority.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, a negative
    /// number where an unsigned one is expected, an unknown `type` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but breaks a protocol rule, e.g. the first frame
    /// of a connection is not a handshake.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
