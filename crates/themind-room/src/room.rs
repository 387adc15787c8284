//! A room: one game table behind its own lock.
//!
//! The [`RoomManager`](crate::RoomManager) owns rooms as `Arc<Room>` and is
//! the only thing that mutates them. Every mutation runs with the room's
//! lock held and produces a list of `(Recipient, ServerEvent)` pairs, which
//! [`GameState::dispatch`] then encodes and pushes to connection sinks
//! before the lock is released. Sinks never block, so no socket I/O ever
//! happens under the lock.

use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use themind_protocol::{Card, Codec, PlayerId, Recipient, RoomId, ServerEvent};

use crate::sink::Frame;
use crate::{Deck, Player, RoomConfig, RoomPhase};

/// Events produced by one locked operation, in send order.
pub(crate) type Outbox = Vec<(Recipient, ServerEvent)>;

/// A snapshot of a room's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    /// The room's unique ID.
    pub room_id: RoomId,
    /// Where the room is in its round cycle.
    pub phase: RoomPhase,
    /// Number of players currently seated.
    pub player_count: usize,
    /// Maximum players allowed.
    pub max_players: usize,
    pub current_round: u32,
    pub lives: i32,
    pub shurikens: u32,
    /// Cards played this round, in play order.
    pub round_cards: Vec<Card>,
    /// What every seated player holds.
    pub hands: BTreeMap<PlayerId, Vec<Card>>,
    /// Cards left to draw.
    pub deck_remaining: usize,
}

/// One game table.
pub struct Room {
    id: RoomId,
    state: Mutex<GameState>,
}

impl Room {
    pub(crate) fn new(id: RoomId, config: RoomConfig, deck: Deck) -> Self {
        Self {
            id,
            state: Mutex::new(GameState::new(id, config, deck)),
        }
    }

    /// Returns the room's unique ID.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Takes a consistent snapshot of the room.
    pub fn info(&self) -> RoomInfo {
        self.lock().info()
    }

    pub fn player_count(&self) -> usize {
        self.lock().players.len()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock()
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Everything a room's lock guards.
///
/// The turn engine (`engine.rs`) operates on this type.
pub(crate) struct GameState {
    pub(crate) room_id: RoomId,
    pub(crate) config: RoomConfig,
    pub(crate) phase: RoomPhase,
    /// Seated players, iterated in id order when dealing.
    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) deck: Deck,
    pub(crate) current_round: u32,
    pub(crate) lives: i32,
    pub(crate) shurikens: u32,
    pub(crate) round_cards: Vec<Card>,
}

impl GameState {
    pub(crate) fn new(room_id: RoomId, config: RoomConfig, deck: Deck) -> Self {
        Self {
            room_id,
            phase: RoomPhase::Dealing,
            players: BTreeMap::new(),
            deck,
            current_round: 1,
            lives: config.starting_lives,
            shurikens: config.starting_shurikens,
            round_cards: Vec::new(),
            config,
        }
    }

    pub(crate) fn has_space(&self) -> bool {
        self.players.len() < self.config.max_players
    }

    pub(crate) fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            phase: self.phase,
            player_count: self.players.len(),
            max_players: self.config.max_players,
            current_round: self.current_round,
            lives: self.lives,
            shurikens: self.shurikens,
            round_cards: self.round_cards.clone(),
            hands: self
                .players
                .iter()
                .map(|(id, player)| (*id, player.hand.cards().to_vec()))
                .collect(),
            deck_remaining: self.deck.len(),
        }
    }

    /// Encodes each event once and pushes it to its recipients.
    ///
    /// A failed encode skips that event only. A closed sink skips that
    /// player only.
    pub(crate) fn dispatch<C: Codec>(&self, codec: &C, outbox: Outbox) {
        for (recipient, event) in outbox {
            let frame: Frame = match codec.encode(&event) {
                Ok(bytes) => Frame::from(bytes),
                Err(e) => {
                    tracing::error!(
                        room_id = %self.room_id,
                        event = event.kind(),
                        error = %e,
                        "failed to encode event"
                    );
                    continue;
                }
            };

            match recipient {
                Recipient::All => {
                    for player in self.players.values() {
                        self.send_to(player, &frame, &event);
                    }
                }
                Recipient::Player(player_id) => {
                    if let Some(player) = self.players.get(&player_id) {
                        self.send_to(player, &frame, &event);
                    }
                }
            }
        }
    }

    fn send_to(&self, player: &Player, frame: &Frame, event: &ServerEvent) {
        if let Err(e) = player.sink.send(frame.clone()) {
            tracing::debug!(
                room_id = %self.room_id,
                player_id = %player.id,
                event = event.kind(),
                error = %e,
                "dropping event for closed connection"
            );
        }
    }
}
