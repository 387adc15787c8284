//! Turn engine: the rules of The Mind.
//!
//! Every function here runs with the room lock held. State changes are
//! made in place and the resulting events are appended to an outbox; the
//! caller dispatches the outbox before releasing the lock, even when the
//! operation failed part way (a partial deal still reaches its players).

use themind_protocol::{Card, PlayerId, Recipient, ServerEvent};

use crate::room::{GameState, Outbox};
use crate::{Player, RoomError, RoomPhase};

// ---------------------------------------------------------------------------
// Sequence validation
// ---------------------------------------------------------------------------

/// A card that was played out of ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// Zero-based index into the round's played cards.
    pub position: usize,
    /// The offending card.
    pub card: Card,
}

/// Returns the first card that is not strictly greater than every card
/// before it, or `None` if the sequence is strictly increasing.
///
/// ```rust
/// use themind_protocol::Card;
/// use themind_room::{validate_sequence, Violation};
///
/// let played = [Card(3), Card(5), Card(4), Card(9)];
/// assert_eq!(
///     validate_sequence(&played),
///     Some(Violation { position: 2, card: Card(4) })
/// );
/// ```
pub fn validate_sequence(cards: &[Card]) -> Option<Violation> {
    let mut highest = 0;
    for (position, &card) in cards.iter().enumerate() {
        if card.value() <= highest {
            return Some(Violation { position, card });
        }
        highest = card.value();
    }
    None
}

// ---------------------------------------------------------------------------
// TurnOutcome
// ---------------------------------------------------------------------------

/// What an accepted play or discard led to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The first out-of-order card of the round, when the play cost a life.
    ///
    /// The whole round is checked after every play, so once a round holds
    /// a violation each further play in that round costs another life.
    pub violation: Option<Violation>,
    /// Set when the action completed the round; holds the new round number.
    pub next_round: Option<u32>,
    /// Set when the action cost the table its last life.
    pub game_over: bool,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl GameState {
    /// Seats a player, dealing it one card if the room is still in round 1.
    pub(crate) fn seat(&mut self, mut player: Player, outbox: &mut Outbox) -> Result<(), RoomError> {
        if let Some(existing) = self.players.get(&player.id) {
            return Err(RoomError::AlreadyInRoom(existing.id, self.room_id));
        }
        if self.phase.is_terminal() {
            return Err(RoomError::GameOver(self.room_id));
        }
        if !self.has_space() {
            return Err(RoomError::RoomFull(self.room_id));
        }

        let player_id = player.id;
        player.room_id = Some(self.room_id);

        if self.current_round == 1 {
            match self.deck.draw() {
                Ok(card) => {
                    player.hand.push(card);
                    outbox.push((Recipient::Player(player_id), ServerEvent::NewCard { card_number: card }));
                }
                Err(e) => {
                    tracing::error!(
                        room_id = %self.room_id,
                        %player_id,
                        error = %e,
                        "could not deal joining card"
                    );
                }
            }
        }

        self.players.insert(player_id, player);
        if self.phase == RoomPhase::Dealing {
            self.set_phase(RoomPhase::AwaitingPlays);
        }
        Ok(())
    }

    /// Unseats a player. Its cards leave the game with it.
    ///
    /// If everyone left behind already has an empty hand, the round is
    /// over and the next one is dealt.
    pub(crate) fn unseat(&mut self, player_id: PlayerId, outbox: &mut Outbox) -> Option<Player> {
        let player = self.players.remove(&player_id)?;

        if self.phase == RoomPhase::AwaitingPlays {
            if let Err(e) = self.advance_if_round_complete(outbox) {
                tracing::error!(room_id = %self.room_id, error = %e, "could not deal next round");
            }
        }
        Some(player)
    }

    pub(crate) fn play_card(
        &mut self,
        player_id: PlayerId,
        card: Card,
        outbox: &mut Outbox,
    ) -> Result<TurnOutcome, RoomError> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(RoomError::PlayerNotFound(player_id, self.room_id))?;
        if self.phase.is_terminal() {
            return Err(RoomError::GameOver(self.room_id));
        }
        if !player.hand.remove(card) {
            return Err(RoomError::CardNotInHand(player_id, card));
        }

        self.round_cards.push(card);
        outbox.push((Recipient::All, ServerEvent::CardPlayed { player_id, card_number: card }));

        let mut outcome = TurnOutcome::default();
        if let Some(violation) = validate_sequence(&self.round_cards) {
            self.lives -= 1;
            tracing::info!(
                room_id = %self.room_id,
                %player_id,
                %card,
                wrong_card = %violation.card,
                position = violation.position,
                lives = self.lives,
                "round holds an out-of-order card"
            );
            outbox.push((
                Recipient::All,
                ServerEvent::WrongCard {
                    player_id,
                    card_number: violation.card,
                    position: violation.position,
                    lives_left: self.lives,
                },
            ));
            outcome.violation = Some(violation);

            if self.lives < 0 {
                self.set_phase(RoomPhase::GameOver);
                outcome.game_over = true;
                tracing::info!(room_id = %self.room_id, round = self.current_round, "game over");
                outbox.push((Recipient::All, ServerEvent::GameOver { round: self.current_round }));
                return Ok(outcome);
            }
        }

        outcome.next_round = self.advance_if_round_complete(outbox)?;
        Ok(outcome)
    }

    pub(crate) fn discard_card(
        &mut self,
        player_id: PlayerId,
        card: Card,
        outbox: &mut Outbox,
    ) -> Result<TurnOutcome, RoomError> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(RoomError::PlayerNotFound(player_id, self.room_id))?;
        if self.phase.is_terminal() {
            return Err(RoomError::GameOver(self.room_id));
        }
        if !player.hand.contains(card) {
            return Err(RoomError::CardNotInHand(player_id, card));
        }
        if self.shurikens == 0 {
            return Err(RoomError::NoShurikensLeft(self.room_id));
        }

        player.hand.remove(card);
        self.shurikens -= 1;
        outbox.push((Recipient::All, ServerEvent::CardDiscarded { player_id, card_number: card }));

        Ok(TurnOutcome {
            next_round: self.advance_if_round_complete(outbox)?,
            ..TurnOutcome::default()
        })
    }

    /// A round is complete once every seated player's hand is empty.
    pub(crate) fn is_round_complete(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.hand.is_empty())
    }

    fn advance_if_round_complete(&mut self, outbox: &mut Outbox) -> Result<Option<u32>, RoomError> {
        if self.is_round_complete() {
            self.set_phase(RoomPhase::RoundComplete);
            self.start_next_round(outbox).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Every phase change goes through here so the round cycle is checked.
    fn set_phase(&mut self, next: RoomPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase change {} -> {next}",
            self.phase
        );
        self.phase = next;
    }

    /// Moves to the next round and deals `current_round` cards to every
    /// player in id order.
    ///
    /// # Errors
    /// Returns `RoomError::DeckEmpty` if the deck runs out mid-deal. Cards
    /// dealt before that point stay dealt and are announced.
    pub(crate) fn start_next_round(&mut self, outbox: &mut Outbox) -> Result<u32, RoomError> {
        self.set_phase(RoomPhase::Dealing);
        self.current_round += 1;
        self.round_cards.clear();

        let per_player = self.current_round as usize;
        for player in self.players.values_mut() {
            let mut dealt = Vec::with_capacity(per_player);
            let mut shortfall = None;
            for _ in 0..per_player {
                match self.deck.draw() {
                    Ok(card) => {
                        player.hand.push(card);
                        dealt.push(card);
                    }
                    Err(e) => {
                        shortfall = Some(e);
                        break;
                    }
                }
            }

            if !dealt.is_empty() {
                outbox.push((Recipient::Player(player.id), ServerEvent::NewCards { card_numbers: dealt }));
            }
            if let Some(e) = shortfall {
                let player_id = player.id;
                self.set_phase(RoomPhase::AwaitingPlays);
                tracing::error!(
                    room_id = %self.room_id,
                    round = self.current_round,
                    player_id = %player_id,
                    "deck ran out while dealing"
                );
                return Err(e);
            }
        }

        self.set_phase(RoomPhase::AwaitingPlays);
        tracing::info!(room_id = %self.room_id, round = self.current_round, "round started");
        Ok(self.current_round)
    }
}
