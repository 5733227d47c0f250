//! Runs a Satchel inventory server.
//!
//! ```text
//! inventory-server [CATALOG_JSON] [CONFIG_JSON]
//! ```
//!
//! Without a catalog file the five seed items are served. Logging follows
//! `RUST_LOG` (default `info`).

use satchel::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let catalog = match args.next() {
        Some(path) => ItemCatalog::load(&path)?,
        None => ItemCatalog::with_seed_items(),
    };
    let config = match args.next() {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };

    tracing::info!(
        bind = %config.bind_addr,
        items = catalog.len(),
        "starting inventory server"
    );

    let server = SatchelServer::builder()
        .config(config)
        .catalog(catalog)
        .build()
        .await?;

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    type Ws = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn start() -> String {
        let server = SatchelServer::builder()
            .bind("127.0.0.1:0")
            .build()
            .await
            .unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        addr
    }

    async fn ws(addr: &str) -> Ws {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();
        ws
    }

    fn enc(env: &Envelope) -> Message {
        Message::Binary(serde_json::to_vec(env).unwrap().into())
    }

    async fn recv(ws: &mut Ws) -> Envelope {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await.expect("timeout").unwrap().unwrap();
        serde_json::from_slice(&msg.into_data()).unwrap()
    }

    /// Handshakes and returns the assigned peer id.
    async fn handshake(ws: &mut Ws) -> PeerId {
        let hello = Envelope::system(0, SystemMessage::Handshake { version: PROTOCOL_VERSION });
        ws.send(enc(&hello)).await.unwrap();
        match recv(ws).await.payload {
            Payload::System(SystemMessage::HandshakeAck { peer_id, .. }) => peer_id,
            other => panic!("expected HandshakeAck, got {other:?}"),
        }
    }

    async fn request(ws: &mut Ws, seq: u64, msg: InventoryMessage) {
        ws.send(enc(&Envelope::inventory(seq, msg))).await.unwrap();
    }

    fn synced_slots(env: Envelope) -> Vec<SlotData> {
        match env.payload {
            Payload::Inventory(InventoryMessage::SyncState { slots, .. }) => slots,
            other => panic!("expected SyncState, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_then_sync_over_raw_socket() {
        let addr = start().await;
        let mut ws = ws(&addr).await;
        let me = handshake(&mut ws).await;

        request(&mut ws, 1, InventoryMessage::RequestAdd {
            owner: me,
            item_id: "leather_armor".into(),
            quantity: 2,
        })
        .await;
        let slots = synced_slots(recv(&mut ws).await);

        assert_eq!(slots.len(), INVENTORY_SIZE);
        assert_eq!(slots[0], SlotData::new("leather_armor", 1));
        assert_eq!(slots[1], SlotData::new("leather_armor", 1));
        assert!(slots[2..].iter().all(SlotData::is_empty));
    }

    // A request naming someone else's inventory is dropped without a reply.
    // The follow-up sync proves the server kept going.
    #[tokio::test]
    async fn test_foreign_request_ignored() {
        let addr = start().await;
        let mut alice = ws(&addr).await;
        let mut bob = ws(&addr).await;
        let alice_id = handshake(&mut alice).await;
        let bob_id = handshake(&mut bob).await;

        request(&mut bob, 1, InventoryMessage::RequestAdd {
            owner: alice_id,
            item_id: "magic_gem".into(),
            quantity: 5,
        })
        .await;
        request(&mut bob, 2, InventoryMessage::RequestSync { owner: bob_id }).await;

        let slots = synced_slots(recv(&mut bob).await);
        assert!(slots.iter().all(SlotData::is_empty));

        request(&mut alice, 1, InventoryMessage::RequestSync { owner: alice_id }).await;
        let slots = synced_slots(recv(&mut alice).await);
        assert!(slots.iter().all(SlotData::is_empty));
    }

    #[tokio::test]
    async fn test_move_whole_stack_to_empty_slot() {
        let addr = start().await;
        let mut ws = ws(&addr).await;
        let me = handshake(&mut ws).await;

        request(&mut ws, 1, InventoryMessage::RequestAdd {
            owner: me,
            item_id: "health_potion".into(),
            quantity: 7,
        })
        .await;
        let _ = recv(&mut ws).await;

        request(&mut ws, 2, InventoryMessage::RequestMove {
            owner: me,
            from: 0,
            to: 19,
            quantity: None,
        })
        .await;
        let slots = synced_slots(recv(&mut ws).await);

        assert!(slots[0].is_empty());
        assert_eq!(slots[19], SlotData::new("health_potion", 7));
    }
}
