//! # The Mind
//!
//! Real-time room server for the cooperative card game *The Mind*.
//!
//! Clients connect over WebSocket and are seated in a room of up to four
//! players. Everyone in a room shares lives and shurikens, and must play
//! their cards in strictly ascending order without talking.
//!
//! This crate wires the layers together:
//!
//! - `themind-transport`: WebSocket listener and connections
//! - `themind-protocol`: the JSON wire vocabulary
//! - `themind-room`: matchmaking, deck and turn engine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use themind::prelude::*;
//!
//! # async fn start() -> Result<(), ThemindError> {
//! let server = ThemindServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, DEFAULT_ADDR, ServerConfig};
pub use error::ThemindError;
pub use server::{ThemindServer, ThemindServerBuilder, WELCOME_MESSAGE};

/// Everything needed to run a server or drive one from a test client.
pub mod prelude {
    pub use crate::{ServerConfig, ThemindError, ThemindServer, ThemindServerBuilder, WELCOME_MESSAGE};
    pub use themind_protocol::{Card, CardAction, ClientAction, PlayerId, RoomId, ServerEvent};
    pub use themind_room::{RoomConfig, RoomInfo, RoomManager, RoomPhase};
}
