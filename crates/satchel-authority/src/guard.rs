//! The trust boundary: who may ask for what.
//!
//! Every inventory request is checked here before anything is mutated. The
//! guard is a pure function of "who am I", "who sent this" and "whose
//! inventory is it", so it can be tested without any networking.

use std::fmt;

use satchel_protocol::{InventoryMessage, PeerId};

/// What the transport knows about the message being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcContext {
    /// The peer this process runs as.
    pub local_peer: PeerId,
    /// The peer holding authority over inventories.
    pub authority: PeerId,
    /// The peer that sent the message.
    pub sender: PeerId,
}

impl RpcContext {
    pub fn new(local_peer: PeerId, authority: PeerId, sender: PeerId) -> Self {
        Self {
            local_peer,
            authority,
            sender,
        }
    }

    /// Returns `true` if this process is the authority.
    pub fn is_authority(&self) -> bool {
        self.local_peer == self.authority
    }

    /// Returns `true` if the message came from the authority.
    pub fn from_authority(&self) -> bool {
        self.sender == self.authority
    }
}

/// The kind of request being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryAction {
    Sync,
    Add,
    Remove,
    Move,
}

impl InventoryAction {
    /// The action a request asks for. `None` for `SyncState`, which is a
    /// push from the authority and not a request.
    pub fn of(message: &InventoryMessage) -> Option<Self> {
        match message {
            InventoryMessage::RequestSync { .. } => Some(Self::Sync),
            InventoryMessage::RequestAdd { .. } => Some(Self::Add),
            InventoryMessage::RequestRemove { .. } => Some(Self::Remove),
            InventoryMessage::RequestMove { .. } => Some(Self::Move),
            InventoryMessage::SyncState { .. } => None,
        }
    }

    /// Actions the authority may perform on an inventory it does not own.
    fn privileged(self) -> bool {
        matches!(self, Self::Sync | Self::Add)
    }
}

/// Why a message was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The sender does not own the target inventory.
    NotOwner,
    /// A state push came from someone other than the authority.
    NotAuthoritySender,
    /// The message kind is never accepted on this side.
    UnexpectedMessage,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotOwner => "sender does not own the inventory",
            Self::NotAuthoritySender => "sender is not the authority",
            Self::UnexpectedMessage => "message not accepted here",
        };
        f.write_str(reason)
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Proceed.
    Allowed,
    /// Drop the message and log why. Nothing is sent back.
    Denied(DenyReason),
    /// This process is not the authority and must not mutate anything.
    NotAuthority,
}

impl Validation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides whether `ctx.sender` may perform `action` on `owner`'s inventory.
///
/// - Only the authority processes requests at all.
/// - The owner may do anything to their own inventory.
/// - The authority itself may sync or add to any inventory (server-side
///   grants), but never remove or move on someone else's behalf.
pub fn validate(
    ctx: &RpcContext,
    owner: PeerId,
    action: InventoryAction,
) -> Validation {
    if !ctx.is_authority() {
        return Validation::NotAuthority;
    }
    if ctx.sender == owner {
        return Validation::Allowed;
    }
    if ctx.from_authority() && action.privileged() {
        return Validation::Allowed;
    }
    Validation::Denied(DenyReason::NotOwner)
}

/// [`validate`] for a whole message. A `SyncState` is a push from the
/// authority, never a request, so it is refused before any ownership check.
pub fn validate_message(ctx: &RpcContext, message: &InventoryMessage) -> Validation {
    match InventoryAction::of(message) {
        Some(action) => validate(ctx, message.owner(), action),
        None => Validation::Denied(DenyReason::UnexpectedMessage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH: PeerId = PeerId::AUTHORITY;

    fn at_authority(sender: u32) -> RpcContext {
        RpcContext::new(AUTH, AUTH, PeerId(sender))
    }

    #[test]
    fn test_validate_owner_is_allowed_every_action() {
        let ctx = at_authority(3);
        for action in [
            InventoryAction::Sync,
            InventoryAction::Add,
            InventoryAction::Remove,
            InventoryAction::Move,
        ] {
            assert_eq!(validate(&ctx, PeerId(3), action), Validation::Allowed);
        }
    }

    #[test]
    fn test_validate_other_peer_is_denied() {
        let ctx = at_authority(7);
        assert_eq!(
            validate(&ctx, PeerId(3), InventoryAction::Remove),
            Validation::Denied(DenyReason::NotOwner)
        );
        assert_eq!(
            validate(&ctx, PeerId(3), InventoryAction::Sync),
            Validation::Denied(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_validate_authority_may_sync_and_add() {
        let ctx = at_authority(1);
        assert!(validate(&ctx, PeerId(3), InventoryAction::Sync).is_allowed());
        assert!(validate(&ctx, PeerId(3), InventoryAction::Add).is_allowed());
    }

    #[test]
    fn test_validate_authority_may_not_remove_or_move_for_others() {
        let ctx = at_authority(1);
        assert_eq!(
            validate(&ctx, PeerId(3), InventoryAction::Remove),
            Validation::Denied(DenyReason::NotOwner)
        );
        assert_eq!(
            validate(&ctx, PeerId(3), InventoryAction::Move),
            Validation::Denied(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_validate_on_non_authority_is_not_authority() {
        // An owner process receiving a request, even from itself.
        let ctx = RpcContext::new(PeerId(3), AUTH, PeerId(3));
        assert_eq!(
            validate(&ctx, PeerId(3), InventoryAction::Add),
            Validation::NotAuthority
        );
    }

    #[test]
    fn test_validate_authority_owning_its_inventory_is_allowed() {
        let ctx = at_authority(1);
        assert!(validate(&ctx, AUTH, InventoryAction::Remove).is_allowed());
    }

    #[test]
    fn test_inventory_action_of_sync_state_is_none() {
        let push = InventoryMessage::SyncState {
            owner: PeerId(3),
            slots: Vec::new(),
        };
        assert_eq!(InventoryAction::of(&push), None);
        assert_eq!(
            InventoryAction::of(&InventoryMessage::RequestSync { owner: PeerId(3) }),
            Some(InventoryAction::Sync)
        );
    }

    #[test]
    fn test_validate_message_sync_state_is_unexpected() {
        let push = InventoryMessage::SyncState {
            owner: PeerId(3),
            slots: Vec::new(),
        };
        // Even the owner cannot push state to the authority.
        assert_eq!(
            validate_message(&at_authority(3), &push),
            Validation::Denied(DenyReason::UnexpectedMessage)
        );
    }

    #[test]
    fn test_validate_message_request_uses_ownership_rules() {
        let remove = InventoryMessage::RequestRemove {
            owner: PeerId(3),
            item_id: "magic_gem".into(),
            quantity: 1,
        };
        assert!(validate_message(&at_authority(3), &remove).is_allowed());
        assert_eq!(
            validate_message(&at_authority(7), &remove),
            Validation::Denied(DenyReason::NotOwner)
        );
    }
}
