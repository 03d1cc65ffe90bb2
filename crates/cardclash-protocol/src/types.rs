//! Core protocol types for Cardclash's wire format.
//!
//! Every type here is serialized to JSON and read by a browser client, so
//! the serde attributes are part of the contract: field names are
//! camelCase and identifiers serialize as bare strings/numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ErrorCode;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The authenticated identity of a caller.
///
/// Issued by the auth provider (an opaque uid), never by the client
/// payload. `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a room, stable for the room's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog key of a card definition. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role: which slot a caller occupies
// ---------------------------------------------------------------------------

/// The slot a participant holds in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player1,
    Player2,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player1 => f.write_str("player1"),
            Self::Player2 => f.write_str("player2"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Elemental type of a card. The three types form an advantage cycle.
///
/// The aliases accept the labels older catalog documents were written
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementalType {
    #[serde(alias = "IT")]
    It,
    #[serde(alias = "語学")]
    Language,
    #[serde(alias = "ビジネス")]
    Business,
}

impl ElementalType {
    pub const ALL: [ElementalType; 3] = [Self::It, Self::Language, Self::Business];
}

impl fmt::Display for ElementalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::It => f.write_str("it"),
            Self::Language => f.write_str("language"),
            Self::Business => f.write_str("business"),
        }
    }
}

/// Rarity tier. Only the reward system cares; battles ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
}

/// A card definition from the catalog.
///
/// The elemental type is stored under `type` (the catalog's field name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(rename = "type", alias = "elementalType")]
    pub elemental_type: ElementalType,
    pub power: u32,
    pub rank: Rank,
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// One inbound call, as it arrives on the socket.
///
/// ```text
/// { "id": 7, "token": "…", "call": "endTurn",
///   "data": { "roomId": "…", "clientActionId": "…", "expectVersion": 3 } }
/// ```
///
/// `data` stays an untyped [`serde_json::Value`] here on purpose: turning
/// it into a [`Request`](crate::Request) is the validation step, and its
/// failures must come back as `invalid-argument` replies rather than
/// decode errors that lose the frame id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    /// Client-chosen correlation id, echoed in the reply.
    pub id: u64,

    /// Auth token. Absent means the call is unauthenticated.
    #[serde(default)]
    pub token: Option<String>,

    /// Call name, e.g. `"findOrCreateRoom"`.
    pub call: String,

    /// Call arguments.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One outbound reply: `{"id": 7, "ok": {…}}` or
/// `{"id": 7, "error": {"code": "aborted", "message": "…"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyFrame {
    pub id: u64,
    #[serde(flatten)]
    pub body: ReplyBody,
}

impl ReplyFrame {
    pub fn ok(id: u64, value: serde_json::Value) -> Self {
        Self { id, body: ReplyBody::Ok(value) }
    }

    pub fn error(id: u64, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            body: ReplyBody::Error(WireError { code, message: message.into() }),
        }
    }

    /// The error code, if this reply is a failure.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match &self.body {
            ReplyBody::Ok(_) => None,
            ReplyBody::Error(e) => Some(e.code),
        }
    }
}

/// Success payload or error of a [`ReplyFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyBody {
    Ok(serde_json::Value),
    Error(WireError),
}

/// The error object clients receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub code: ErrorCode,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_values() {
        assert_eq!(serde_json::to_string(&PlayerId::new("u1")).unwrap(), "\"u1\"");
        assert_eq!(serde_json::to_string(&RoomId::new("r1")).unwrap(), "\"r1\"");
        assert_eq!(serde_json::to_string(&CardId(12)).unwrap(), "12");
    }

    #[test]
    fn test_role_wire_spelling() {
        assert_eq!(serde_json::to_string(&Role::Player1).unwrap(), "\"player1\"");
        assert_eq!(Role::Player2.to_string(), "player2");
    }

    #[test]
    fn test_card_reads_type_field_and_legacy_labels() {
        let card: Card = serde_json::from_str(
            r#"{"id":3,"name":"Parser","type":"IT","power":40,"rank":"B"}"#,
        )
        .unwrap();
        assert_eq!(card.elemental_type, ElementalType::It);
        assert_eq!(card.rank, Rank::B);

        let card: Card = serde_json::from_str(
            r#"{"id":4,"name":"Grammar","type":"語学","power":25,"rank":"C"}"#,
        )
        .unwrap();
        assert_eq!(card.elemental_type, ElementalType::Language);

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "language");
    }

    #[test]
    fn test_reply_frame_ok_shape() {
        let reply = ReplyFrame::ok(2, serde_json::json!({"ok": true}));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["ok"]["ok"], true);
        assert!(reply.error_code().is_none());
    }

    #[test]
    fn test_reply_frame_round_trips_error() {
        let reply = ReplyFrame::error(5, ErrorCode::NotFound, "room missing");
        let text = serde_json::to_string(&reply).unwrap();
        let back: ReplyFrame = serde_json::from_str(&text).unwrap();
        assert_eq!(back, reply);
        assert_eq!(back.error_code(), Some(ErrorCode::NotFound));
    }
}
