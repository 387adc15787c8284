//! The per-room deck.

use rand::Rng;
use rand::seq::SliceRandom;
use themind_protocol::Card;

use crate::RoomError;

/// An ordered pile of cards. Draws come off the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a full deck (`Card::MIN..=Card::MAX`) in a uniformly random
    /// order, using the thread-local RNG.
    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::rng())
    }

    /// Builds a full deck shuffled with a caller-supplied RNG.
    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards: Vec<Card> = (Card::MIN.value()..=Card::MAX.value()).map(Card).collect();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Builds a deck that deals `cards` front to back.
    pub fn from_order(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    /// Removes and returns the next card.
    ///
    /// # Errors
    /// Returns `RoomError::DeckEmpty` once every card has been drawn.
    pub fn draw(&mut self) -> Result<Card, RoomError> {
        self.cards.pop().ok_or(RoomError::DeckEmpty)
    }

    /// Cards left to draw.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns `true` once every card has been drawn.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
