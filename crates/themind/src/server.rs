//! `ThemindServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → rooms. Each accepted
//! connection gets its own task running
//! [`handle_connection`](crate::handler::handle_connection).

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use themind_protocol::{JsonCodec, PlayerId};
use themind_room::{RoomConfig, RoomManager};
use themind_transport::{Connection, Transport, WebSocketTransport};

use crate::ThemindError;
use crate::handler::handle_connection;

/// Greeting carried by every `WELCOME` frame.
pub const WELCOME_MESSAGE: &str = "Welcome to The Mind!";

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) rooms: Arc<RoomManager>,
    pub(crate) codec: JsonCodec,
    next_player_id: AtomicU64,
}

impl ServerState {
    /// Allocates a player id no other connection on this server has had.
    pub(crate) fn next_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// use themind::ThemindServer;
///
/// # async fn start() -> Result<(), themind::ThemindError> {
/// let server = ThemindServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ThemindServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl ThemindServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Sets the rules new rooms start with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<ThemindServer, ThemindError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Arc::new(RoomManager::with_config(self.room_config)),
            codec: JsonCodec,
            next_player_id: AtomicU64::new(1),
        });

        Ok(ThemindServer { transport, state })
    }
}

impl Default for ThemindServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ThemindServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl ThemindServer {
    /// Creates a new builder.
    pub fn builder() -> ThemindServerBuilder {
        ThemindServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ThemindError> {
        Ok(self.transport.local_addr()?)
    }

    /// The room manager shared by every connection.
    pub fn rooms(&self) -> Arc<RoomManager> {
        Arc::clone(&self.state.rooms)
    }

    /// Runs the accept loop until the task is dropped.
    ///
    /// A failed accept (including a failed WebSocket handshake) is logged
    /// and the loop keeps going.
    pub async fn run(mut self) -> Result<(), ThemindError> {
        tracing::info!("The Mind server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn_id = conn.id();
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(%conn_id, error = %e, "connection ended with error");
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
