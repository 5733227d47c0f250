//! `SatchelServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → authority. The
//! authority runs as its own actor task; every connection gets a handler
//! task that forwards requests to it and pushes syncs back.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use satchel_authority::{AuthorityHandle, InventoryAuthority, spawn_authority};
use satchel_catalog::ItemCatalog;
use satchel_protocol::{Codec, JsonCodec};
use satchel_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::peers::PeerRegistry;
use crate::{SatchelError, ServerConfig};

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) authority: AuthorityHandle,
    pub(crate) peers: Mutex<PeerRegistry>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
    pub(crate) started: Instant,
}

impl<C: Codec> ServerState<C> {
    /// Milliseconds since the server started.
    pub(crate) fn server_time(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Builder for configuring and starting a Satchel server.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), satchel::SatchelError> {
/// use satchel::prelude::*;
///
/// let server = SatchelServer::builder()
///     .bind("0.0.0.0:9080")
///     .catalog(ItemCatalog::with_seed_items())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SatchelServerBuilder {
    config: ServerConfig,
    catalog: Option<ItemCatalog>,
}

impl SatchelServerBuilder {
    /// Creates a builder with default settings and the seed catalog.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            catalog: None,
        }
    }

    /// Sets the address to bind to, overriding the config's `bind_addr`.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the item catalog. Defaults to the seed items.
    pub fn catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Binds the listener and starts the authority actor.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<SatchelServer<JsonCodec>, SatchelError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let catalog = self.catalog.unwrap_or_else(ItemCatalog::with_seed_items);
        let authority = InventoryAuthority::new(catalog, self.config.authority.clone());
        let handle = spawn_authority(authority, self.config.channel_size);

        let state = Arc::new(ServerState {
            authority: handle,
            peers: Mutex::new(PeerRegistry::new()),
            codec: JsonCodec,
            config: self.config,
            started: Instant::now(),
        });

        Ok(SatchelServer { transport, state })
    }
}

impl Default for SatchelServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Satchel server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SatchelServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl SatchelServer<JsonCodec> {
    pub fn builder() -> SatchelServerBuilder {
        SatchelServerBuilder::new()
    }
}

impl<C: Codec> SatchelServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, SatchelError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the authority, for server-side grants and inspection.
    pub fn authority(&self) -> AuthorityHandle {
        self.state.authority.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each accepted connection gets its own handler task. A failed accept
    /// is logged and the loop keeps going.
    pub async fn run(mut self) -> Result<(), SatchelError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Satchel server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
