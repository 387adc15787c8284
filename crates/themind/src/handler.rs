//! Per-connection handler: seating, welcome, and action routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Allocate a PlayerId and seat the player (round-1 card is queued)
//!   2. Send WELCOME directly on the socket
//!   3. Spawn the writer task that drains the player's outbound channel
//!   4. Loop: receive frames → decode → route to the player's room

use std::sync::Arc;

use themind_protocol::{ClientAction, Codec, MessageTag, PlayerId, ProtocolError, ServerEvent};
use themind_room::{Frame, Player};
use themind_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ThemindError;
use crate::server::{ServerState, WELCOME_MESSAGE};

/// Drop guard that unseats a player when the handler exits.
///
/// Runs on every exit path, including early `?` returns and panics.
/// Unseating is synchronous, so it happens inline.
struct SeatGuard {
    player_id: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        if let Some(room_id) = self.state.rooms.remove_player(self.player_id) {
            tracing::info!(player_id = %self.player_id, %room_id, "player disconnected");
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ThemindError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = state.next_player_id();

    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
    let room = state.rooms.add_player(Player::new(player_id, tx))?;
    let _guard = SeatGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(
        %conn_id,
        %player_id,
        room_id = %room.id(),
        peer = %conn.peer_addr(),
        "player connected"
    );

    // WELCOME goes out before the writer starts, so it always precedes the
    // NEW_CARD already waiting in the channel.
    let welcome = ServerEvent::Welcome {
        player_id,
        room_id: room.id(),
        message: WELCOME_MESSAGE.to_string(),
    };
    let bytes = state.codec.encode(&welcome)?;
    conn.send(&bytes).await?;

    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = conn.send(&frame).await {
                    tracing::debug!(%player_id, error = %e, "write failed, stopping writer");
                    break;
                }
            }
        })
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let action: ClientAction = match state.codec.decode(&data) {
            Ok(action) => action,
            Err(e) => {
                log_undecodable(&state, player_id, &data, &e);
                continue;
            }
        };

        if let Some(claimed) = action.claimed_player() {
            if claimed != player_id {
                tracing::warn!(%player_id, %claimed, "client claimed another player id, ignoring claim");
            }
        }

        let card = action.card();
        if let Err(e) = state.rooms.handle_action(&room, player_id, action) {
            tracing::warn!(%player_id, room_id = %room.id(), %card, error = %e, "action rejected");
        }
    }

    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close after read loop failed");
    }
    Ok(())
}

/// Tells an unknown message type apart from a frame that isn't a message
/// at all, and logs it. Neither closes the connection.
fn log_undecodable(state: &ServerState, player_id: PlayerId, data: &[u8], error: &ProtocolError) {
    match state.codec.decode::<MessageTag>(data) {
        Ok(tag) if !ClientAction::is_known_type(&tag.kind) => {
            tracing::warn!(%player_id, kind = %tag.kind, "unrecognized message type, ignoring");
        }
        _ => {
            tracing::warn!(%player_id, error = %error, "malformed frame, ignoring");
        }
    }
}
