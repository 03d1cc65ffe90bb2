//! Wire protocol for Cardclash.
//!
//! This crate defines what travels between a game client and the battle
//! server:
//!
//! - **Types** ([`RequestFrame`], [`ReplyFrame`], [`PlayerId`], [`Card`],
//!   etc.): identifiers, card definitions, and the request/reply envelopes.
//! - **Requests** ([`Request`]): the typed form of every call, produced by
//!   validating the loosely-typed JSON payload at the boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames are converted
//!   to/from bytes.
//! - **Errors** ([`ProtocolError`], [`ErrorCode`]): what can go wrong
//!   while decoding or validating, and the codes clients see.
//!
//! ```text
//! Transport (bytes) → Protocol (RequestFrame → Request) → Room layer
//! ```

mod codec;
mod error;
mod request;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::{ErrorCode, ProtocolError};
pub use request::{Call, Request, MAX_DECK_SIZE, MAX_FETCH_IDS};
pub use types::{
    Card, CardId, ElementalType, PlayerId, Rank, ReplyBody, ReplyFrame,
    RequestFrame, Role, RoomId, WireError,
};
