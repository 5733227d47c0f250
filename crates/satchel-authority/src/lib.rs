//! Request validation and synchronization for Satchel inventories.
//!
//! The authority is the only process allowed to mutate an inventory. Owners
//! send requests; the authority checks who sent them, runs the mutation on
//! its own copy, and pushes the full resulting state back.
//!
//! # Key types
//!
//! - [`validate`]: the guard every request passes through
//! - [`InventoryAuthority`]: authoritative inventories plus the catalog
//! - [`OwnerInventory`]: an owner's read-only cache and request builders
//! - [`AuthorityHandle`]: talk to the authority actor from async code
//! - [`AuthorityConfig`]: request limits

mod actor;
mod authority;
mod config;
mod error;
mod guard;
mod owner;

pub use actor::{AuthorityHandle, PeerSender, spawn_authority, spawn_authority_with_sink};
pub use authority::{Delivery, InventoryAuthority};
pub use config::AuthorityConfig;
pub use error::AuthorityError;
pub use guard::{
    DenyReason, InventoryAction, RpcContext, Validation, validate, validate_message,
};
pub use owner::{OwnerInventory, PresentationSink};
