//! Codec trait and the JSON implementation.
//!
//! The server and client never call `serde_json` directly; they go through
//! a [`Codec`] so the frame format can change (say, to a compact binary
//! encoding) without touching the connection handler.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns typed values into frames and frames back into typed values.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError`] when the value cannot be represented.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a frame into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError`] when the frame is malformed or has the
    /// wrong shape for `T`.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Inventory snapshots are small (20 slots), so JSON's size overhead is
/// irrelevant and readable frames make desync bugs easy to diagnose.
///
/// ## Example
///
/// ```rust
/// use satchel_protocol::{Codec, Envelope, InventoryMessage, JsonCodec, PeerId};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::inventory(
///     3,
///     InventoryMessage::RequestSync { owner: PeerId(42) },
/// );
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
