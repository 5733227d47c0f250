//! Per-connection handler: handshake, peer registration, message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive Handshake → validate version
//!   2. Assign a peer id, create the peer's inventory at the authority
//!   3. Send HandshakeAck
//!   4. Loop: forward inventory requests to the authority, push syncs
//!      back, answer heartbeats

use std::sync::Arc;

use satchel_protocol::{
    Codec, Envelope, InventoryMessage, Payload, PeerId, ProtocolError, SystemMessage,
};
use satchel_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::server::{PROTOCOL_VERSION, ServerState};
use crate::SatchelError;

/// Releases the peer id and its inventory when the handler exits.
///
/// `Drop` is synchronous, so the async cleanup runs in a spawned task.
struct PeerGuard<C: Codec> {
    peer: PeerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for PeerGuard<C> {
    fn drop(&mut self) {
        let peer = self.peer;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = state.authority.disconnect(peer).await {
                tracing::debug!(%peer, error = %e, "inventory release failed");
            }
            state.peers.lock().await.release(peer);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), SatchelError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Handshake ---
    await_handshake(&conn, &state).await?;

    // --- Step 2: Registration ---
    let peer = state.peers.lock().await.assign(conn_id);
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    if let Err(e) = state.authority.connect(peer, outbound_tx).await {
        state.peers.lock().await.release(peer);
        return Err(e.into());
    }
    let _guard = PeerGuard {
        peer,
        state: Arc::clone(&state),
    };

    let ack = SystemMessage::HandshakeAck {
        peer_id: peer,
        authority: PeerId::AUTHORITY,
        server_time: state.server_time(),
    };
    send_envelope(&conn, &state, Envelope::system(0, ack)).await?;
    tracing::info!(%conn_id, %peer, "peer connected");

    // --- Step 3: Message loop ---
    // Only frames from the peer count as activity; our own pushes do not
    // keep a silent peer alive.
    let idle_timeout = state.config.idle_timeout;
    let mut idle_deadline = Instant::now() + idle_timeout;
    let mut seq: u64 = 1;
    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%peer, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%peer, error = %e, "recv error");
                        break;
                    }
                };
                idle_deadline = Instant::now() + idle_timeout;

                let envelope: Envelope = match state.codec.decode(&data) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        tracing::debug!(%peer, error = %e, "failed to decode envelope");
                        continue;
                    }
                };

                match envelope.payload {
                    Payload::System(msg) => {
                        let should_close =
                            handle_system_message(&conn, &state, peer, msg, &mut seq).await?;
                        if should_close {
                            break;
                        }
                    }
                    Payload::Inventory(msg) => {
                        tracing::debug!(%peer, rpc = msg.rpc_name(), "inventory message");
                        state.authority.send_message(peer, msg).await?;
                    }
                }
            }
            Some(sync) = outbound_rx.recv() => {
                push_sync(&conn, &state, sync, &mut seq).await?;
            }
            () = tokio::time::sleep_until(idle_deadline) => {
                tracing::info!(%peer, ?idle_timeout, "connection timed out");
                break;
            }
        }
    }

    let _ = conn.close().await;
    // _guard drops here → inventory and peer id are released.
    Ok(())
}

/// Waits for the first frame and checks that it is a handshake with the
/// right version. Anything else gets an `Error` reply and ends the
/// connection.
async fn await_handshake<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
) -> Result<(), SatchelError> {
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(SatchelError::Handshake(
                "connection closed before handshake".into(),
            ));
        }
        Ok(Err(e)) => return Err(SatchelError::Transport(e)),
        Err(_) => return Err(SatchelError::Handshake("handshake timed out".into())),
    };

    let envelope: Envelope = match state.codec.decode(&data) {
        Ok(envelope) => envelope,
        Err(e) => {
            send_error(conn, state, 400, "malformed handshake").await?;
            return Err(e.into());
        }
    };

    let version = match envelope.payload {
        Payload::System(SystemMessage::Handshake { version }) => version,
        _ => {
            send_error(conn, state, 400, "expected Handshake").await?;
            return Err(ProtocolError::InvalidMessage(
                "first message must be Handshake".into(),
            )
            .into());
        }
    };

    if version != PROTOCOL_VERSION {
        send_error(
            conn,
            state,
            400,
            &format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        )
        .await?;
        return Err(SatchelError::Handshake(format!(
            "protocol version mismatch: {version}"
        )));
    }

    Ok(())
}

/// Handles a system message. Returns `true` if the connection should close.
async fn handle_system_message<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    peer: PeerId,
    msg: SystemMessage,
    seq: &mut u64,
) -> Result<bool, SatchelError> {
    match msg {
        SystemMessage::Heartbeat { client_time } => {
            let ack = SystemMessage::HeartbeatAck {
                client_time,
                server_time: state.server_time(),
            };
            send_envelope(conn, state, Envelope::system(next_seq(seq), ack)).await?;
        }
        SystemMessage::Disconnect { reason } => {
            tracing::info!(%peer, %reason, "peer disconnected");
            return Ok(true);
        }
        _ => {
            tracing::debug!(%peer, "ignoring unexpected system message");
        }
    }
    Ok(false)
}

async fn push_sync<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    sync: InventoryMessage,
    seq: &mut u64,
) -> Result<(), SatchelError> {
    send_envelope(conn, state, Envelope::inventory(next_seq(seq), sync)).await
}

/// Sends a SystemMessage::Error envelope. Only used for connection-level
/// failures; inventory requests are never answered with errors.
async fn send_error<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    code: u16,
    message: &str,
) -> Result<(), SatchelError> {
    let error = SystemMessage::Error {
        code,
        message: message.to_string(),
    };
    send_envelope(conn, state, Envelope::system(0, error)).await
}

async fn send_envelope<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    envelope: Envelope,
) -> Result<(), SatchelError> {
    let bytes = state.codec.encode(&envelope.at(state.server_time()))?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
