//! A seated player: identity, hand, and connection.

use std::fmt;

use themind_protocol::{Card, PlayerId, RoomId};

use crate::ConnectionSink;

/// The cards a player currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Creates an empty hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dealt card.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Returns `true` if `card` is held.
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Removes one copy of `card`. Returns `false` if it wasn't held.
    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(index) => {
                self.cards.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of cards held.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns `true` once every card has been played or discarded.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The held cards, in the order they were dealt.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// A connected player.
///
/// Created by the connection handler and handed to
/// [`RoomManager::add_player`](crate::RoomManager::add_player), which seats
/// it and fills in `room_id`.
pub struct Player {
    pub id: PlayerId,
    pub hand: Hand,
    pub room_id: Option<RoomId>,
    pub(crate) sink: Box<dyn ConnectionSink>,
}

impl Player {
    /// Creates an unseated player with an empty hand.
    pub fn new(id: PlayerId, sink: impl ConnectionSink) -> Self {
        Self {
            id,
            hand: Hand::new(),
            room_id: None,
            sink: Box::new(sink),
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("hand", &self.hand)
            .field("room_id", &self.room_id)
            .finish_non_exhaustive()
    }
}
