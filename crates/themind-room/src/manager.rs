//! Room manager: creates, tracks, and routes players to rooms.
//!
//! Lock order is always registry first, then at most one room. Neither
//! lock is held across an `.await`; every method here is synchronous.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use themind_protocol::{Card, ClientAction, Codec, JsonCodec, PlayerId, RoomId};

use crate::room::Outbox;
use crate::{Deck, Player, Room, RoomConfig, RoomError, RoomInfo, TurnOutcome};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

struct Registry {
    /// Live rooms in creation order (ids are allocated increasingly).
    rooms: BTreeMap<RoomId, Arc<Room>>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,
}

/// Manages all live rooms and tracks which player is in which room.
///
/// One instance is built by the server and shared (behind an `Arc`) with
/// every connection task.
pub struct RoomManager<C: Codec = JsonCodec> {
    registry: Mutex<Registry>,
    config: RoomConfig,
    codec: C,
}

impl RoomManager<JsonCodec> {
    /// Creates an empty manager with the default game rules.
    pub fn new() -> Self {
        Self::with_config(RoomConfig::default())
    }

    pub fn with_config(config: RoomConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl Default for RoomManager<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> RoomManager<C> {
    /// Creates an empty manager that encodes outbound events with `codec`.
    pub fn with_codec(config: RoomConfig, codec: C) -> Self {
        Self {
            registry: Mutex::new(Registry {
                rooms: BTreeMap::new(),
                player_rooms: HashMap::new(),
            }),
            config,
            codec,
        }
    }

    /// Creates a new, empty room with a freshly shuffled deck.
    pub fn create_room(&self) -> Arc<Room> {
        let mut registry = self.registry.lock();
        self.create_room_locked(&mut registry)
    }

    fn create_room_locked(&self, registry: &mut Registry) -> Arc<Room> {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let room = Arc::new(Room::new(room_id, self.config.clone(), Deck::shuffled()));
        registry.rooms.insert(room_id, Arc::clone(&room));
        tracing::info!(%room_id, "room created");
        room
    }

    /// Seats a player in the oldest room with a free seat, creating a
    /// room if none has one. Rooms whose game is over are skipped.
    ///
    /// A player joining during round 1 is dealt one card (`NEW_CARD`).
    ///
    /// # Errors
    /// Returns `RoomError::AlreadyInRoom` if the player is already seated.
    pub fn add_player(&self, player: Player) -> Result<Arc<Room>, RoomError> {
        let mut registry = self.registry.lock();
        let player_id = player.id;

        if let Some(&room_id) = registry.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, room_id));
        }

        let open = registry
            .rooms
            .values()
            .find(|room| {
                let state = room.lock();
                state.phase.is_joinable() && state.has_space()
            })
            .cloned();
        let room = match open {
            Some(room) => room,
            None => self.create_room_locked(&mut registry),
        };

        let seated = {
            let mut state = room.lock();
            let mut outbox = Outbox::new();
            let result = state.seat(player, &mut outbox);
            state.dispatch(&self.codec, outbox);
            result.map(|()| state.players.len())
        };

        match seated {
            Ok(players) => {
                registry.player_rooms.insert(player_id, room.id());
                tracing::info!(room_id = %room.id(), %player_id, players, "player joined");
                Ok(room)
            }
            Err(e) => {
                if room.player_count() == 0 {
                    registry.rooms.remove(&room.id());
                }
                Err(e)
            }
        }
    }

    /// Removes a player from whatever room it is in and returns that
    /// room's ID. The room is deleted once its last player leaves.
    ///
    /// Does nothing (and returns `None`) for a player that isn't seated.
    pub fn remove_player(&self, player_id: PlayerId) -> Option<RoomId> {
        let mut registry = self.registry.lock();
        let room_id = registry.player_rooms.remove(&player_id)?;
        let room = registry.rooms.get(&room_id).cloned()?;

        let remaining = {
            let mut state = room.lock();
            let mut outbox = Outbox::new();
            state.unseat(player_id, &mut outbox);
            state.dispatch(&self.codec, outbox);
            state.players.len()
        };
        tracing::info!(%room_id, %player_id, players = remaining, "player left");

        if remaining == 0 {
            registry.rooms.remove(&room_id);
            tracing::info!(%room_id, "room removed");
        }
        Some(room_id)
    }

    /// Plays `card` from `player_id`'s hand onto the table.
    ///
    /// # Errors
    /// Returns the rule the action broke; nothing is changed in that case.
    /// `RoomError::DeckEmpty` is the exception: the card was played and
    /// the next round was only partly dealt.
    pub fn on_play_card(&self, room: &Room, player_id: PlayerId, card: Card) -> Result<TurnOutcome, RoomError> {
        let mut state = room.lock();
        let mut outbox = Outbox::new();
        let result = state.play_card(player_id, card, &mut outbox);
        state.dispatch(&self.codec, outbox);
        result
    }

    /// Spends a shuriken to discard `card` from `player_id`'s hand.
    ///
    /// # Errors
    /// Same as [`on_play_card`](Self::on_play_card), plus
    /// `RoomError::NoShurikensLeft`.
    pub fn on_discard_card(&self, room: &Room, player_id: PlayerId, card: Card) -> Result<TurnOutcome, RoomError> {
        let mut state = room.lock();
        let mut outbox = Outbox::new();
        let result = state.discard_card(player_id, card, &mut outbox);
        state.dispatch(&self.codec, outbox);
        result
    }

    /// Routes a decoded client action to the matching operation.
    pub fn handle_action(
        &self,
        room: &Room,
        player_id: PlayerId,
        action: ClientAction,
    ) -> Result<TurnOutcome, RoomError> {
        match action {
            ClientAction::PlayCard(play) => self.on_play_card(room, player_id, play.card_number),
            ClientAction::DiscardCard(discard) => self.on_discard_card(room, player_id, discard.card_number),
        }
    }

    /// Looks up a live room.
    pub fn room(&self, room_id: RoomId) -> Option<Arc<Room>> {
        self.registry.lock().rooms.get(&room_id).cloned()
    }

    /// Returns a snapshot of a live room.
    pub fn room_info(&self, room_id: RoomId) -> Option<RoomInfo> {
        let registry = self.registry.lock();
        registry.rooms.get(&room_id).map(|room| room.info())
    }

    /// Returns the room a player is seated in.
    pub fn player_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.registry.lock().player_rooms.get(&player_id).copied()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry.lock().rooms.len()
    }

    /// IDs of live rooms, oldest first.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.registry.lock().rooms.keys().copied().collect()
    }
}
