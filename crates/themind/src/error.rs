//! Unified error type for The Mind server.

use themind_protocol::ProtocolError;
use themind_room::RoomError;
use themind_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ThemindError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (seating, rule violations).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Invalid process configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use themind_protocol::{ClientAction, Codec, JsonCodec, PlayerId, RoomId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let themind_err: ThemindError = err.into();
        assert!(matches!(themind_err, ThemindError::Transport(_)));
        assert!(themind_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ProtocolError = JsonCodec.decode::<ClientAction>(b"not json").unwrap_err();
        let themind_err: ThemindError = err.into();
        assert!(matches!(themind_err, ThemindError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::AlreadyInRoom(PlayerId(1), RoomId(2));
        let themind_err: ThemindError = err.into();
        assert!(matches!(themind_err, ThemindError::Room(_)));
        assert_eq!(themind_err.to_string(), "player P-1 already in room R-2");
    }

    #[test]
    fn test_from_config_error() {
        let err = ConfigError::InvalidAddress("nowhere".into());
        let themind_err: ThemindError = err.into();
        assert!(matches!(themind_err, ThemindError::Config(_)));
    }
}
