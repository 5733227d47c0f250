//! Wire protocol for Satchel.
//!
//! This crate is the vocabulary shared by the authority and its owners:
//!
//! - **Identity** ([`PeerId`]): who sent a message, who owns an inventory.
//! - **Inventory messages** ([`InventoryMessage`], [`SlotData`]): the
//!   sync/add/remove/move requests and the full-state snapshot pushed back.
//! - **Plumbing** ([`Envelope`], [`SystemMessage`]): the
//!   connection-level wrapper every frame travels in.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, typed values out.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sockets or inventories. It only
//! defines shapes and how to turn them into bytes:
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Authority (validated mutation)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{InventoryMessage, SlotData};
pub use types::{Envelope, Payload, PeerId, SystemMessage};
