//! # Satchel
//!
//! Server-authoritative slot-grid inventories over WebSocket.
//!
//! The server owns every inventory. Clients send add/remove/move requests;
//! the server checks that the sender owns the inventory, applies the change
//! with the stacking rules of [`satchel_inventory`], and pushes the full
//! resulting state back. Clients only ever display what the server sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use satchel::prelude::*;
//!
//! # async fn demo() -> Result<(), SatchelError> {
//! let server = SatchelServer::builder().bind("127.0.0.1:0").build().await?;
//! let addr = server.local_addr()?.to_string();
//! tokio::spawn(server.run());
//!
//! let mut client = SatchelClient::connect(&addr).await?;
//! client.send_request_add("health_potion", 25).await?;
//! client.wait_for_sync().await?;
//! assert_eq!(client.item_count("health_potion"), 25);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod peers;
mod server;

pub use client::SatchelClient;
pub use config::ServerConfig;
pub use error::SatchelError;
pub use server::{PROTOCOL_VERSION, SatchelServer, SatchelServerBuilder};

/// Re-exports for the common case.
pub mod prelude {
    pub use crate::{
        PROTOCOL_VERSION, SatchelClient, SatchelError, SatchelServer, SatchelServerBuilder,
        ServerConfig,
    };
    pub use satchel_authority::{
        AuthorityConfig, AuthorityHandle, InventoryAuthority, OwnerInventory, PresentationSink,
        Validation,
    };
    pub use satchel_catalog::{Item, ItemCatalog, ItemType, Rarity};
    pub use satchel_inventory::{
        INVENTORY_SIZE, Inventory, InventoryError, InventorySlot, MoveQuantity,
    };
    pub use satchel_protocol::{
        Codec, Envelope, InventoryMessage, JsonCodec, Payload, PeerId, SlotData,
        SystemMessage,
    };
}
