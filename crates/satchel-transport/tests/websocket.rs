//! Integration tests for the WebSocket transport.
//!
//! A real listener on an OS-assigned port and a real client built with
//! `WebSocketConnection::connect`, so both halves of the transport are
//! exercised together.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use satchel_transport::{
        Connection, Transport, TransportError, WebSocketConnection,
        WebSocketTransport,
    };

    /// Binds on port 0 and returns the transport plus its concrete address.
    async fn bind_ephemeral() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    /// Accepts one connection in the background and dials it.
    async fn connected_pair() -> (WebSocketConnection, WebSocketConnection) {
        let (mut transport, addr) = bind_ephemeral().await;
        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = WebSocketConnection::connect(&addr)
            .await
            .expect("client should connect");
        let server_conn = server.await.expect("accept task should finish");
        (server_conn, client)
    }

    #[tokio::test]
    async fn test_websocket_frames_flow_both_ways() {
        let (server, client) = connected_pair().await;

        client.send(b"request").await.expect("client send");
        let got = server.recv().await.expect("server recv");
        assert_eq!(got.as_deref(), Some(&b"request"[..]));

        server.send(b"snapshot").await.expect("server send");
        let got = client.recv().await.expect("client recv");
        assert_eq!(got.as_deref(), Some(&b"snapshot"[..]));
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (server, client) = connected_pair().await;
        assert_ne!(server.id(), client.id());
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        // The server must be able to push a frame while another task is
        // parked in recv on the same connection.
        let (server, client) = connected_pair().await;
        let server = std::sync::Arc::new(server);

        let reader = {
            let server = std::sync::Arc::clone(&server);
            tokio::spawn(async move { server.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), server.send(b"push"))
            .await
            .expect("send must not wait for recv")
            .expect("send should succeed");
        let pushed = client.recv().await.expect("client recv");
        assert_eq!(pushed.as_deref(), Some(&b"push"[..]));

        client.send(b"late").await.expect("client send");
        let got = reader.await.expect("reader task").expect("recv");
        assert_eq!(got.as_deref(), Some(&b"late"[..]));
    }

    #[tokio::test]
    async fn test_websocket_close_yields_none() {
        let (server, client) = connected_pair().await;

        client.close().await.expect("close");
        let got = server.recv().await.expect("recv after close");
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let (transport, addr) = bind_ephemeral().await;
        drop(transport);

        let result = WebSocketConnection::connect(&addr).await;
        assert!(matches!(result, Err(TransportError::Dial { .. })));
    }
}
