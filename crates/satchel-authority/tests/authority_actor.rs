//! Integration tests for the authority actor.
//!
//! Commands are processed strictly in order, so a `snapshot` round trip is
//! a barrier: once it returns, every earlier command has been applied and
//! its syncs are already sitting in the peers' channels.

use std::sync::{Arc, Mutex};

use satchel_authority::{
    AuthorityConfig, AuthorityError, AuthorityHandle, InventoryAuthority, PeerSender,
    spawn_authority, spawn_authority_with_sink,
};
use satchel_catalog::ItemCatalog;
use satchel_inventory::InventorySlot;
use satchel_protocol::{InventoryMessage, PeerId, SlotData};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn spawn() -> AuthorityHandle {
    let authority =
        InventoryAuthority::new(ItemCatalog::with_seed_items(), AuthorityConfig::default());
    spawn_authority(authority, 16)
}

fn channel() -> (PeerSender, mpsc::UnboundedReceiver<InventoryMessage>) {
    mpsc::unbounded_channel()
}

fn add(owner: PeerId, item_id: &str, quantity: u32) -> InventoryMessage {
    InventoryMessage::RequestAdd {
        owner,
        item_id: item_id.into(),
        quantity,
    }
}

fn synced_slots(message: InventoryMessage) -> Vec<SlotData> {
    match message {
        InventoryMessage::SyncState { slots, .. } => slots,
        other => panic!("expected SyncState, got {other:?}"),
    }
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test]
async fn test_connect_creates_empty_inventory() {
    let handle = spawn();
    handle.connect(PeerId(3), channel().0).await.unwrap();

    let slots = handle.snapshot(PeerId(3)).await.unwrap().unwrap();

    assert_eq!(slots.len(), 20);
    assert!(slots.iter().all(SlotData::is_empty));
}

#[tokio::test]
async fn test_connect_same_peer_twice_fails() {
    let handle = spawn();
    handle.connect(PeerId(3), channel().0).await.unwrap();

    let result = handle.connect(PeerId(3), channel().0).await;

    assert_eq!(result, Err(AuthorityError::AlreadyRegistered(PeerId(3))));
}

#[tokio::test]
async fn test_disconnect_drops_inventory() {
    let handle = spawn();
    handle.connect(PeerId(3), channel().0).await.unwrap();

    handle.disconnect(PeerId(3)).await.unwrap();

    assert_eq!(handle.snapshot(PeerId(3)).await.unwrap(), None);
    assert_eq!(
        handle.disconnect(PeerId(3)).await,
        Err(AuthorityError::UnknownOwner(PeerId(3)))
    );
}

#[tokio::test]
async fn test_shutdown_makes_handle_unavailable() {
    let handle = spawn();
    handle.shutdown().await.unwrap();

    // Give the actor a moment to drop its receiver.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    assert_eq!(
        handle.snapshot(PeerId(3)).await,
        Err(AuthorityError::Unavailable)
    );
}

// =========================================================================
// Request flow
// =========================================================================

#[tokio::test]
async fn test_owner_request_is_applied_and_synced_back() {
    let handle = spawn();
    let (tx, mut rx) = channel();
    handle.connect(PeerId(3), tx).await.unwrap();

    handle
        .send_message(PeerId(3), add(PeerId(3), "health_potion", 25))
        .await
        .unwrap();
    handle.snapshot(PeerId(3)).await.unwrap();

    let slots = synced_slots(rx.try_recv().unwrap());
    assert_eq!(slots[0], SlotData::new("health_potion", 10));
    assert_eq!(slots[1], SlotData::new("health_potion", 10));
    assert_eq!(slots[2], SlotData::new("health_potion", 5));
    assert!(rx.try_recv().is_err(), "exactly one sync expected");
}

#[tokio::test]
async fn test_requests_are_applied_in_order() {
    let handle = spawn();
    let (tx, mut rx) = channel();
    handle.connect(PeerId(3), tx).await.unwrap();

    handle
        .send_message(PeerId(3), add(PeerId(3), "magic_gem", 5))
        .await
        .unwrap();
    handle
        .send_message(
            PeerId(3),
            InventoryMessage::RequestMove {
                owner: PeerId(3),
                from: 0,
                to: 19,
                quantity: Some(2),
            },
        )
        .await
        .unwrap();
    handle
        .send_message(
            PeerId(3),
            InventoryMessage::RequestRemove {
                owner: PeerId(3),
                item_id: "magic_gem".into(),
                quantity: 3,
            },
        )
        .await
        .unwrap();
    let final_slots = handle.snapshot(PeerId(3)).await.unwrap().unwrap();

    let syncs: Vec<Vec<SlotData>> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(synced_slots)
        .collect();
    assert_eq!(syncs.len(), 3);
    assert_eq!(syncs[1][19], SlotData::new("magic_gem", 2));
    assert!(final_slots[0].is_empty());
    assert_eq!(final_slots[19], SlotData::new("magic_gem", 2));
    assert_eq!(syncs[2], final_slots);
}

#[tokio::test]
async fn test_unauthorized_remove_is_dropped_without_reply() {
    let handle = spawn();
    let (owner_tx, mut owner_rx) = channel();
    let (intruder_tx, mut intruder_rx) = channel();
    handle.connect(PeerId(3), owner_tx).await.unwrap();
    handle.connect(PeerId(7), intruder_tx).await.unwrap();
    handle.give_item(PeerId(3), "magic_gem", 3).await.unwrap();
    let before = handle.snapshot(PeerId(3)).await.unwrap();
    owner_rx.try_recv().unwrap(); // the grant's sync

    handle
        .send_message(
            PeerId(7),
            InventoryMessage::RequestRemove {
                owner: PeerId(3),
                item_id: "magic_gem".into(),
                quantity: 3,
            },
        )
        .await
        .unwrap();
    let after = handle.snapshot(PeerId(3)).await.unwrap();

    assert_eq!(before, after);
    assert!(intruder_rx.try_recv().is_err());
    assert!(owner_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_give_item_pushes_sync_to_owner() {
    let handle = spawn();
    let (tx, mut rx) = channel();
    handle.connect(PeerId(5), tx).await.unwrap();

    handle.give_item(PeerId(5), "iron_sword", 1).await.unwrap();
    handle.snapshot(PeerId(5)).await.unwrap();

    let message = rx.try_recv().unwrap();
    assert_eq!(message.owner(), PeerId(5));
    assert_eq!(synced_slots(message)[0], SlotData::new("iron_sword", 1));
}

#[tokio::test]
async fn test_sync_to_departed_peer_is_ignored() {
    let handle = spawn();
    let (tx, rx) = channel();
    handle.connect(PeerId(3), tx).await.unwrap();
    drop(rx);

    handle
        .send_message(PeerId(3), add(PeerId(3), "iron_sword", 1))
        .await
        .unwrap();

    // The actor keeps running.
    let slots = handle.snapshot(PeerId(3)).await.unwrap().unwrap();
    assert_eq!(slots[0], SlotData::new("iron_sword", 1));
}

// =========================================================================
// Listen server
// =========================================================================

#[tokio::test]
async fn test_local_inventory_renders_through_sink() {
    let rendered: Arc<Mutex<Vec<Vec<InventorySlot>>>> = Arc::default();
    let seen = Arc::clone(&rendered);
    let authority =
        InventoryAuthority::new(ItemCatalog::with_seed_items(), AuthorityConfig::default());
    let handle = spawn_authority_with_sink(
        authority,
        move |slots: &[InventorySlot]| seen.lock().unwrap().push(slots.to_vec()),
        16,
    );

    handle
        .send_message(PeerId::AUTHORITY, add(PeerId::AUTHORITY, "health_potion", 3))
        .await
        .unwrap();
    handle.snapshot(PeerId::AUTHORITY).await.unwrap();

    let rendered = rendered.lock().unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0][0], InventorySlot::new("health_potion", 3));
}
