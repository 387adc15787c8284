//! Rooms, deck and turn engine for The Mind.
//!
//! Players are matched into rooms of up to four. Each room owns a
//! shuffled deck and the shared counters (round, lives, shurikens), and
//! applies the game rules to every play and discard.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/destroys rooms, seats players, routes actions
//! - [`Room`]: one game table behind its own lock
//! - [`Player`] / [`Hand`]: a seated player and its cards
//! - [`ConnectionSink`]: where a player's outbound frames go
//! - [`Deck`]: the shuffled draw pile
//! - [`RoomPhase`]: round-cycle state machine
//! - [`RoomConfig`]: starting lives, shurikens and capacity

mod config;
mod deck;
mod engine;
mod error;
mod manager;
mod player;
mod room;
mod sink;

pub use config::{RoomConfig, RoomPhase};
pub use deck::Deck;
pub use engine::{TurnOutcome, Violation, validate_sequence};
pub use error::{RoomError, SinkError};
pub use manager::RoomManager;
pub use player::{Hand, Player};
pub use room::{Room, RoomInfo};
pub use sink::{ConnectionSink, Frame, PlayerSender};
