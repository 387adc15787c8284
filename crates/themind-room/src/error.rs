//! Error types for the room layer.

use themind_protocol::{Card, PlayerId, RoomId};

/// Errors that can occur during room operations.
///
/// Every variant is recoverable at the granularity of one action: the
/// action is dropped, the room keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// A deal was attempted on an exhausted deck.
    #[error("deck is empty")]
    DeckEmpty,

    /// The acting player is not seated in this room.
    #[error("player {0} not found in room {1}")]
    PlayerNotFound(PlayerId, RoomId),

    /// The player tried to use a card it does not hold.
    #[error("player {0} does not hold card {1}")]
    CardNotInHand(PlayerId, Card),

    /// A discard was attempted with no shurikens left.
    #[error("no shurikens left in room {0}")]
    NoShurikensLeft(RoomId),

    /// The room has lost all its lives and accepts no more actions.
    #[error("game is over in room {0}")]
    GameOver(RoomId),

    /// The player is already seated in a room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The room has no free seat.
    #[error("room {0} is full")]
    RoomFull(RoomId),
}

/// A frame could not be handed to a player's connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The connection's writer has gone away.
    #[error("connection sink closed")]
    Closed,
}
