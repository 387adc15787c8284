//! Room configuration and phase state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Rules that every room created by a [`RoomManager`](crate::RoomManager)
/// starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum players seated in one room.
    pub max_players: usize,

    /// Lives the table starts with. The game is over once lives drop
    /// below zero, so the table survives `starting_lives` mistakes.
    pub starting_lives: i32,

    /// Shurikens the table starts with. Each discard spends one.
    pub starting_shurikens: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 4,
            starting_lives: 3,
            starting_shurikens: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its round cycle.
///
/// ```text
/// Dealing(1) → AwaitingPlays → RoundComplete → Dealing(n+1) → AwaitingPlays → …
///                    │
///                    └──(lives < 0)──→ GameOver
/// ```
///
/// - **Dealing**: cards for the current round are being handed out.
///   A fresh room sits here until its first player is dealt in.
/// - **AwaitingPlays**: players play or discard.
/// - **RoundComplete**: every hand is empty; the next deal is imminent.
/// - **GameOver**: terminal. No more rounds, no more actions.
///
/// `Dealing` and `RoundComplete` only last for the span of one locked
/// critical section, so outside observers normally see the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Dealing,
    AwaitingPlays,
    RoundComplete,
    GameOver,
}

impl RoomPhase {
    /// Returns `true` if matchmaking may seat new players here.
    pub fn is_joinable(&self) -> bool {
        !matches!(self, Self::GameOver)
    }

    /// Returns `true` once the room can never progress again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }

    /// Returns `true` if moving to `target` follows the round cycle.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Dealing, Self::AwaitingPlays)
                | (Self::AwaitingPlays, Self::RoundComplete)
                | (Self::AwaitingPlays, Self::GameOver)
                | (Self::RoundComplete, Self::Dealing)
        )
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dealing => write!(f, "Dealing"),
            Self::AwaitingPlays => write!(f, "AwaitingPlays"),
            Self::RoundComplete => write!(f, "RoundComplete"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}
