//! Codec trait and implementations for serializing/deserializing frames.
//!
//! The room layer encodes every outbound event exactly once and hands the
//! same bytes to each recipient, so it only needs something that
//! implements [`Codec`]. [`JsonCodec`] is the only implementation today;
//! it matches what browser clients expect.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task and every room.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use themind_protocol::{Card, Codec, JsonCodec, ServerEvent};
///
/// let codec = JsonCodec;
/// let event = ServerEvent::NewCard { card_number: Card(12) };
///
/// let bytes = codec.encode(&event).unwrap();
/// assert_eq!(bytes, br#"{"type":"NEW_CARD","payload":{"card_number":12}}"#);
///
/// let decoded: ServerEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
