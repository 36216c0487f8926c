//! `BubbleBrawlServer` builder and accept loop.
//!
//! This is the entry point for running a Bubble Brawl server. It ties
//! together the layers: transport → protocol → room registry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bubblebrawl_protocol::JsonCodec;
use bubblebrawl_room::RoomRegistry;
use bubblebrawl_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{BubbleBrawlError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
    /// Capacity of each connection's room-event queue.
    pub(crate) outbound_buffer: usize,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), bubblebrawl::BubbleBrawlError> {
/// use bubblebrawl::{BubbleBrawlServer, ServerConfig};
///
/// let server = BubbleBrawlServer::builder()
///     .config(ServerConfig::load()?)
///     .bind("127.0.0.1:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Default)]
pub struct BubbleBrawlServerBuilder {
    config: ServerConfig,
}

impl BubbleBrawlServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Binds the listener and creates the room pool.
    pub async fn build(self) -> Result<BubbleBrawlServer, BubbleBrawlError> {
        let outbound_buffer = self.config.outbound_buffer();
        let ServerConfig {
            bind,
            room_count,
            idle_timeout_secs,
            room,
            game,
            ..
        } = self.config;

        let transport = WebSocketTransport::bind(&bind).await?;
        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(room_count, room, game),
            codec: JsonCodec,
            idle_timeout: Duration::from_secs(idle_timeout_secs),
            outbound_buffer,
        });

        Ok(BubbleBrawlServer { transport, state })
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct BubbleBrawlServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl BubbleBrawlServer {
    pub fn builder() -> BubbleBrawlServerBuilder {
        BubbleBrawlServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, BubbleBrawlError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning a handler task per connection.
    ///
    /// A failed accept or handshake only affects that connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), BubbleBrawlError> {
        tracing::info!(
            rooms = self.state.registry.room_count(),
            "Bubble Brawl server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
