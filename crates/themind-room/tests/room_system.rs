//! Integration tests for matchmaking, dealing and the turn engine, driven
//! through the public `RoomManager` API.

use std::sync::Arc;
use std::thread;

use themind_protocol::{Card, CardAction, ClientAction, PlayerId, ServerEvent};
use themind_room::{Frame, Player, RoomError, RoomManager, RoomPhase, validate_sequence};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn player(id: u64) -> (Player, mpsc::UnboundedReceiver<Frame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Player::new(PlayerId(id), tx), rx)
}

/// Decodes every frame queued for one player.
fn drain(rx: &mut mpsc::UnboundedReceiver<Frame>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_slice(&frame).expect("frame should decode"));
    }
    events
}

fn only_card(manager: &RoomManager, room: &themind_room::Room, id: u64) -> Card {
    let info = manager.room_info(room.id()).expect("room should exist");
    let hand = &info.hands[&PlayerId(id)];
    assert_eq!(hand.len(), 1, "expected exactly one card in hand");
    hand[0]
}

// =========================================================================
// Matchmaking
// =========================================================================

#[test]
fn test_fifth_player_gets_a_new_room() {
    let manager = RoomManager::new();
    let mut receivers = Vec::new();
    let mut rooms = Vec::new();

    for id in 1..=5 {
        let (p, rx) = player(id);
        receivers.push(rx);
        rooms.push(manager.add_player(p).unwrap().id());
    }

    assert!(rooms[..4].iter().all(|r| *r == rooms[0]));
    assert_ne!(rooms[4], rooms[0]);
    assert_eq!(manager.room_count(), 2);
    assert_eq!(manager.room_info(rooms[0]).unwrap().player_count, 4);
    assert_eq!(manager.player_room(PlayerId(5)), Some(rooms[4]));
}

#[test]
fn test_round_one_join_gets_exactly_one_card() {
    let manager = RoomManager::new();
    let (p, mut rx) = player(1);
    let room = manager.add_player(p).unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    let dealt = match &events[0] {
        ServerEvent::NewCard { card_number } => *card_number,
        other => panic!("expected NEW_CARD, got {other:?}"),
    };

    let info = room.info();
    assert_eq!(info.hands[&PlayerId(1)], vec![dealt]);
    assert_eq!(info.deck_remaining, 99);
    assert_eq!(info.phase, RoomPhase::AwaitingPlays);
}

#[test]
fn test_late_joiner_waits_for_next_round() {
    let manager = RoomManager::new();
    let (first, mut rx1) = player(1);
    let room = manager.add_player(first).unwrap();
    let card = only_card(&manager, &room, 1);

    // A lone player emptying its hand completes round 1.
    let outcome = manager.on_play_card(&room, PlayerId(1), card).unwrap();
    assert_eq!(outcome.next_round, Some(2));

    let (late, mut rx2) = player(2);
    let joined = manager.add_player(late).unwrap();
    assert_eq!(joined.id(), room.id());
    assert!(drain(&mut rx2).is_empty());

    let info = room.info();
    assert_eq!(info.current_round, 2);
    assert!(info.hands[&PlayerId(2)].is_empty());
    assert_eq!(info.hands[&PlayerId(1)].len(), 2);

    let events = drain(&mut rx1);
    assert!(matches!(
        events.last(),
        Some(ServerEvent::NewCards { card_numbers }) if card_numbers.len() == 2
    ));
}

// =========================================================================
// Turn engine through the manager
// =========================================================================

#[test]
fn test_played_card_is_broadcast() {
    let manager = RoomManager::new();
    let (p1, mut rx1) = player(1);
    let (p2, mut rx2) = player(2);
    let room = manager.add_player(p1).unwrap();
    manager.add_player(p2).unwrap();
    drain(&mut rx1);
    drain(&mut rx2);

    let card = only_card(&manager, &room, 1);
    let action = ClientAction::PlayCard(CardAction { player_id: None, card_number: card });
    manager.handle_action(&room, PlayerId(1), action).unwrap();

    let expected = ServerEvent::CardPlayed { player_id: PlayerId(1), card_number: card };
    assert_eq!(drain(&mut rx1).first(), Some(&expected));
    assert_eq!(drain(&mut rx2).first(), Some(&expected));
    assert_eq!(room.info().round_cards, vec![card]);
}

#[test]
fn test_wrong_card_costs_a_life() {
    let manager = RoomManager::new();
    let (p1, mut rx1) = player(1);
    let (p2, _rx2) = player(2);
    let room = manager.add_player(p1).unwrap();
    manager.add_player(p2).unwrap();

    let c1 = only_card(&manager, &room, 1);
    let c2 = only_card(&manager, &room, 2);
    let (high, low) = if c1 > c2 { ((1, c1), (2, c2)) } else { ((2, c2), (1, c1)) };

    manager.on_play_card(&room, PlayerId(high.0), high.1).unwrap();
    let outcome = manager.on_play_card(&room, PlayerId(low.0), low.1).unwrap();

    let violation = outcome.violation.expect("lower card should be a violation");
    assert_eq!(violation.position, 1);
    assert_eq!(violation.card, low.1);
    assert_eq!(outcome.next_round, Some(2));

    let info = room.info();
    assert_eq!(info.lives, 2);
    assert_eq!(info.current_round, 2);

    let wrong = drain(&mut rx1)
        .into_iter()
        .find(|e| matches!(e, ServerEvent::WrongCard { .. }))
        .expect("WRONG_CARD should be broadcast");
    assert_eq!(
        wrong,
        ServerEvent::WrongCard {
            player_id: PlayerId(low.0),
            card_number: low.1,
            position: 1,
            lives_left: 2,
        }
    );
}

#[test]
fn test_fourth_violation_ends_the_game() {
    let manager = RoomManager::new();
    let (p1, mut rx1) = player(1);
    let (p2, _rx2) = player(2);
    let room = manager.add_player(p1).unwrap();
    manager.add_player(p2).unwrap();

    // Round 1: one violation.
    let c1 = only_card(&manager, &room, 1);
    let c2 = only_card(&manager, &room, 2);
    let (high, low) = if c1 > c2 { ((1, c1), (2, c2)) } else { ((2, c2), (1, c1)) };
    manager.on_play_card(&room, PlayerId(high.0), high.1).unwrap();
    manager.on_play_card(&room, PlayerId(low.0), low.1).unwrap();

    // Round 2: play all four cards from highest to lowest. Every play after
    // the first finds the round out of order and costs a life.
    let info = room.info();
    assert_eq!(info.current_round, 2);
    let mut held: Vec<(Card, PlayerId)> = info
        .hands
        .iter()
        .flat_map(|(id, hand)| hand.iter().map(move |c| (*c, *id)))
        .collect();
    held.sort_by(|a, b| b.0.cmp(&a.0));

    let mut last = None;
    for (card, id) in held {
        last = Some(manager.on_play_card(&room, id, card).unwrap());
    }
    let last = last.unwrap();
    assert!(last.game_over);
    assert_eq!(last.next_round, None);

    let info = room.info();
    assert_eq!(info.lives, -1);
    assert_eq!(info.phase, RoomPhase::GameOver);
    assert_eq!(info.current_round, 2);

    let events = drain(&mut rx1);
    let lives: Vec<i32> = events
        .iter()
        .filter_map(|e| match e {
            ServerEvent::WrongCard { lives_left, .. } => Some(*lives_left),
            _ => None,
        })
        .collect();
    assert_eq!(lives, vec![2, 1, 0, -1]);
    assert_eq!(events.last(), Some(&ServerEvent::GameOver { round: 2 }));

    // No more actions, and matchmaking no longer seats players here.
    assert_eq!(
        manager.on_play_card(&room, PlayerId(1), Card(1)),
        Err(RoomError::GameOver(room.id()))
    );
    let (p3, _rx3) = player(3);
    assert_ne!(manager.add_player(p3).unwrap().id(), room.id());
}

#[test]
fn test_discard_blocked_without_shurikens() {
    let manager = RoomManager::new();
    let (p1, _rx1) = player(1);
    let (p2, _rx2) = player(2);
    let (p3, _rx3) = player(3);
    let room = manager.add_player(p1).unwrap();
    manager.add_player(p2).unwrap();
    manager.add_player(p3).unwrap();

    let c1 = only_card(&manager, &room, 1);
    manager.on_discard_card(&room, PlayerId(1), c1).unwrap();
    assert_eq!(room.info().shurikens, 0);

    let c2 = only_card(&manager, &room, 2);
    assert_eq!(
        manager.on_discard_card(&room, PlayerId(2), c2),
        Err(RoomError::NoShurikensLeft(room.id()))
    );
    assert_eq!(room.info().hands[&PlayerId(2)], vec![c2]);
}

#[test]
fn test_rejected_actions() {
    let manager = RoomManager::new();
    let (p1, _rx1) = player(1);
    let room = manager.add_player(p1).unwrap();
    let held = only_card(&manager, &room, 1);
    let missing = if held == Card(100) { Card(99) } else { Card(100) };

    assert_eq!(
        manager.on_play_card(&room, PlayerId(1), missing),
        Err(RoomError::CardNotInHand(PlayerId(1), missing))
    );
    assert_eq!(
        manager.on_play_card(&room, PlayerId(77), held),
        Err(RoomError::PlayerNotFound(PlayerId(77), room.id()))
    );
    for bogus in [Card(0), Card(-5), Card(256)] {
        assert_eq!(
            manager.on_play_card(&room, PlayerId(1), bogus),
            Err(RoomError::CardNotInHand(PlayerId(1), bogus))
        );
    }
    assert!(room.info().round_cards.is_empty());
}

// =========================================================================
// Leaving
// =========================================================================

#[test]
fn test_last_player_out_removes_room() {
    let manager = RoomManager::new();
    let (p1, _rx1) = player(1);
    let (p2, _rx2) = player(2);
    let room_id = manager.add_player(p1).unwrap().id();
    manager.add_player(p2).unwrap();

    assert_eq!(manager.remove_player(PlayerId(1)), Some(room_id));
    assert!(manager.room(room_id).is_some());

    assert_eq!(manager.remove_player(PlayerId(2)), Some(room_id));
    assert!(manager.room(room_id).is_none());
    assert!(!manager.room_ids().contains(&room_id));
    assert_eq!(manager.player_room(PlayerId(2)), None);

    assert_eq!(manager.remove_player(PlayerId(2)), None);
}

// =========================================================================
// Concurrency
// =========================================================================

#[test]
fn test_concurrent_plays_match_a_serial_order() {
    let manager = Arc::new(RoomManager::new());
    let mut receivers = Vec::new();
    for id in 1..=4 {
        let (p, rx) = player(id);
        manager.add_player(p).unwrap();
        receivers.push(rx);
    }
    let room = manager.room(manager.player_room(PlayerId(1)).unwrap()).unwrap();
    let cards: Vec<(u64, Card)> = (1..=4).map(|id| (id, only_card(&manager, &room, id))).collect();

    let handles: Vec<_> = cards
        .iter()
        .copied()
        .map(|(id, card)| {
            let manager = Arc::clone(&manager);
            let room = Arc::clone(&room);
            thread::spawn(move || manager.on_play_card(&room, PlayerId(id), card))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // Every player saw the same play order.
    let observed: Vec<Vec<ServerEvent>> = receivers.iter_mut().map(drain).collect();
    let order: Vec<Card> = observed[0]
        .iter()
        .filter_map(|e| match e {
            ServerEvent::CardPlayed { card_number, .. } => Some(*card_number),
            _ => None,
        })
        .collect();
    assert_eq!(order.len(), 4);
    for events in &observed[1..] {
        let seen: Vec<Card> = events
            .iter()
            .filter_map(|e| match e {
                ServerEvent::CardPlayed { card_number, .. } => Some(*card_number),
                _ => None,
            })
            .collect();
        assert_eq!(seen, order);
    }

    // State equals what that serial order would produce.
    let info = room.info();
    assert_eq!(info.current_round, 2);
    let charged = (1..=order.len()).filter(|&n| validate_sequence(&order[..n]).is_some()).count();
    assert_eq!(info.lives, 3 - charged as i32);
    assert!(info.hands.values().all(|hand| hand.len() == 2));
    assert_eq!(info.deck_remaining, 100 - 4 - 8);
}

#[test]
fn test_racing_discards_spend_the_single_shuriken_once() {
    let manager = Arc::new(RoomManager::new());
    let mut receivers = Vec::new();
    for id in 1..=3 {
        let (p, rx) = player(id);
        manager.add_player(p).unwrap();
        receivers.push(rx);
    }
    let room = manager.room(manager.player_room(PlayerId(1)).unwrap()).unwrap();
    let cards: Vec<Card> = (1..=3).map(|id| only_card(&manager, &room, id)).collect();

    // Players 1 and 2 both try to discard while player 3 plays.
    let handles: Vec<_> = (1..=3u64)
        .map(|id| {
            let manager = Arc::clone(&manager);
            let room = Arc::clone(&room);
            let card = cards[id as usize - 1];
            thread::spawn(move || {
                let result = if id == 3 {
                    manager.on_play_card(&room, PlayerId(id), card)
                } else {
                    manager.on_discard_card(&room, PlayerId(id), card)
                };
                (id, result)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let discards: Vec<_> = results.iter().filter(|(id, _)| *id != 3).collect();
    let winners: Vec<u64> = discards.iter().filter(|(_, r)| r.is_ok()).map(|(id, _)| *id).collect();
    let losers: Vec<u64> = discards
        .iter()
        .filter(|(_, r)| *r == Err(RoomError::NoShurikensLeft(room.id())))
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);
    assert!(results.iter().any(|(id, r)| *id == 3 && r.is_ok()));

    let (winner, loser) = (winners[0], losers[0]);
    let info = room.info();
    assert_eq!(info.shurikens, 0);
    assert_eq!(info.current_round, 1);
    assert_eq!(info.round_cards, vec![cards[2]]);
    assert!(info.hands[&PlayerId(winner)].is_empty());
    assert_eq!(info.hands[&PlayerId(loser)], vec![cards[loser as usize - 1]]);
    assert!(info.hands[&PlayerId(3)].is_empty());

    // Everyone saw exactly one discard, by the winner.
    for rx in receivers.iter_mut() {
        let discarded: Vec<PlayerId> = drain(rx)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::CardDiscarded { player_id, .. } => Some(player_id),
                _ => None,
            })
            .collect();
        assert_eq!(discarded, vec![PlayerId(winner)]);
    }
}
