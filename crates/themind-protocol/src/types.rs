//! Core protocol types for The Mind's wire format.
//!
//! Every frame on the wire is a JSON object with a `type` tag and a
//! `payload` object:
//!
//! ```text
//! {"type": "CARD_PLAYED", "payload": {"player_id": 3, "card_number": 42}}
//! ```
//!
//! Serde's "adjacently tagged" enum representation produces exactly this
//! shape, so the inbound and outbound vocabularies are plain Rust enums.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Newtype over `u64` so a `RoomId` can never be passed where a
/// `PlayerId` is expected. `#[serde(transparent)]` keeps it a bare
/// number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (one game instance).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A card value.
///
/// A full deck holds every value in `Card::MIN..=Card::MAX` exactly once.
/// The value is a signed integer so that anything a client sends (zero,
/// negative, above 100) still decodes and is rejected by the rules as a
/// card nobody holds, rather than as a malformed frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Card(pub i32);

impl Card {
    /// Lowest card in a deck.
    pub const MIN: Card = Card(1);
    /// Highest card in a deck.
    pub const MAX: Card = Card(100);

    /// Returns the numeric value of the card.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive an outbound event.
///
/// The turn engine returns `(Recipient, ServerEvent)` pairs; the room
/// resolves them to connection sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player currently seated in the room.
    All,

    /// One specific player.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Inbound actions
// ---------------------------------------------------------------------------

/// Payload shared by `PLAY_CARD` and `DISCARD_CARD`.
///
/// `player_id` is accepted for compatibility with clients that echo their
/// own id, but the server always attributes the action to the connection
/// it arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    pub card_number: Card,
}

/// Actions a client can send.
///
/// A closed set: adding an action kind means adding a variant here, and
/// every `match` on it must handle the new case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientAction {
    /// Play a card onto the table.
    PlayCard(CardAction),

    /// Spend a shuriken to discard a card without playing it.
    DiscardCard(CardAction),
}

impl ClientAction {
    /// Wire tags this enum can decode.
    pub const KNOWN_TYPES: &'static [&'static str] = &["PLAY_CARD", "DISCARD_CARD"];

    /// Returns `true` if `tag` names one of the known action kinds.
    pub fn is_known_type(tag: &str) -> bool {
        Self::KNOWN_TYPES.contains(&tag)
    }

    /// The card the action refers to.
    pub fn card(&self) -> Card {
        match self {
            Self::PlayCard(action) | Self::DiscardCard(action) => action.card_number,
        }
    }

    /// The player id echoed by the client, if any.
    pub fn claimed_player(&self) -> Option<PlayerId> {
        match self {
            Self::PlayCard(action) | Self::DiscardCard(action) => action.player_id,
        }
    }
}

/// Just the `type` tag of a frame.
///
/// Used to tell an unknown message kind (ignored with a warning) apart
/// from a malformed frame after a full decode has failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTag {
    #[serde(rename = "type")]
    pub kind: String,
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    /// First frame on every connection: who you are and where you sit.
    Welcome {
        player_id: PlayerId,
        room_id: RoomId,
        message: String,
    },

    /// A single card dealt on joining a room in round 1.
    NewCard { card_number: Card },

    /// A round's worth of cards dealt at the start of a round.
    NewCards { card_numbers: Vec<Card> },

    /// Someone played a card.
    CardPlayed { player_id: PlayerId, card_number: Card },

    /// Someone spent a shuriken to discard a card.
    CardDiscarded { player_id: PlayerId, card_number: Card },

    /// A played card broke the ascending order.
    WrongCard {
        player_id: PlayerId,
        card_number: Card,
        position: usize,
        lives_left: i32,
    },

    /// Lives dropped below zero. The room plays no further rounds.
    GameOver { round: u32 },
}

impl ServerEvent {
    /// The wire tag of this event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "WELCOME",
            Self::NewCard { .. } => "NEW_CARD",
            Self::NewCards { .. } => "NEW_CARDS",
            Self::CardPlayed { .. } => "CARD_PLAYED",
            Self::CardDiscarded { .. } => "CARD_DISCARDED",
            Self::WrongCard { .. } => "WRONG_CARD",
            Self::GameOver { .. } => "GAME_OVER",
        }
    }
}
