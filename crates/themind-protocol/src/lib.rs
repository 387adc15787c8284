//! Wire protocol for The Mind server.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientAction`], [`ServerEvent`], [`Card`], ids): the
//!   values that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about sockets or rooms.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Card, CardAction, ClientAction, MessageTag, PlayerId, Recipient, RoomId, ServerEvent,
};
