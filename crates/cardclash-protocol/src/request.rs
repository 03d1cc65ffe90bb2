//! Boundary validation: untyped call payloads → [`Request`].
//!
//! Nothing past this module sees a `serde_json::Value`. Every rule here
//! produces [`ProtocolError::InvalidArgument`], and runs before the room
//! layer opens a transaction.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::{Card, CardId, ProtocolError, RoomId};

/// Upper bound on ids looked up by one `fetchCardsByIds` call.
pub const MAX_FETCH_IDS: usize = 300;

/// Largest deck `saveDeck` accepts.
pub const MAX_DECK_SIZE: usize = 25;

/// The call names a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    FindOrCreateRoom,
    SelectCard,
    EndTurn,
    LeaveRoom,
    GetRoom,
    FetchCardsByIds,
    AdminUpsertCards,
    GetCardsCount,
    EnsureUserInitialized,
    SaveDeck,
}

impl Call {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindOrCreateRoom => "findOrCreateRoom",
            Self::SelectCard => "selectCard",
            Self::EndTurn => "endTurn",
            Self::LeaveRoom => "leaveRoom",
            Self::GetRoom => "getRoom",
            Self::FetchCardsByIds => "fetchCardsByIds",
            Self::AdminUpsertCards => "adminUpsertCards",
            Self::GetCardsCount => "getCardsCount",
            Self::EnsureUserInitialized => "ensureUserInitialized",
            Self::SaveDeck => "saveDeck",
        }
    }
}

impl FromStr for Call {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "findOrCreateRoom" => Self::FindOrCreateRoom,
            "selectCard" => Self::SelectCard,
            "endTurn" => Self::EndTurn,
            "leaveRoom" => Self::LeaveRoom,
            "getRoom" => Self::GetRoom,
            "fetchCardsByIds" => Self::FetchCardsByIds,
            "adminUpsertCards" => Self::AdminUpsertCards,
            "getCardsCount" => Self::GetCardsCount,
            "ensureUserInitialized" => Self::EnsureUserInitialized,
            "saveDeck" => Self::SaveDeck,
            other => {
                return Err(ProtocolError::invalid(format!("unknown call `{other}`")));
            }
        })
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated call.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Join a specific room, or find/create one when `room_id` is `None`.
    FindOrCreateRoom { room_id: Option<RoomId> },
    SelectCard { room_id: RoomId, card_id: CardId },
    EndTurn {
        room_id: RoomId,
        client_action_id: String,
        expect_version: Option<u64>,
    },
    LeaveRoom { room_id: RoomId },
    GetRoom { room_id: RoomId },
    /// Deduplicated, at most [`MAX_FETCH_IDS`] entries, never empty.
    FetchCardsByIds { ids: Vec<CardId> },
    /// Only the drafts that passed validation; never empty.
    AdminUpsertCards { cards: Vec<Card> },
    GetCardsCount,
    EnsureUserInitialized,
    /// Positive ids in the order sent, duplicates kept, 1 to
    /// [`MAX_DECK_SIZE`] of them.
    SaveDeck { deck: Vec<CardId> },
}

impl Request {
    /// Validates `data` against the contract of `call`.
    pub fn parse(call: &str, data: &Value) -> Result<Self, ProtocolError> {
        let call: Call = call.parse()?;
        let empty = Map::new();
        let args = match data {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(ProtocolError::invalid("data must be an object")),
        };

        match call {
            Call::FindOrCreateRoom => Ok(Self::FindOrCreateRoom {
                room_id: optional_room_id(args)?,
            }),
            Call::SelectCard => Ok(Self::SelectCard {
                room_id: room_id(args)?,
                card_id: card_id(args.get("cardId"))
                    .ok_or_else(|| ProtocolError::invalid("cardId must be a positive integer"))?,
            }),
            Call::EndTurn => Ok(Self::EndTurn {
                room_id: room_id(args)?,
                client_action_id: non_blank(args, "clientActionId")?,
                expect_version: expect_version(args)?,
            }),
            Call::LeaveRoom => Ok(Self::LeaveRoom { room_id: room_id(args)? }),
            Call::GetRoom => Ok(Self::GetRoom { room_id: room_id(args)? }),
            Call::FetchCardsByIds => fetch_ids(args),
            Call::AdminUpsertCards => upsert_cards(args),
            Call::GetCardsCount => Ok(Self::GetCardsCount),
            Call::EnsureUserInitialized => Ok(Self::EnsureUserInitialized),
            Call::SaveDeck => save_deck(args),
        }
    }

    /// The call this request came from.
    pub fn call(&self) -> Call {
        match self {
            Self::FindOrCreateRoom { .. } => Call::FindOrCreateRoom,
            Self::SelectCard { .. } => Call::SelectCard,
            Self::EndTurn { .. } => Call::EndTurn,
            Self::LeaveRoom { .. } => Call::LeaveRoom,
            Self::GetRoom { .. } => Call::GetRoom,
            Self::FetchCardsByIds { .. } => Call::FetchCardsByIds,
            Self::AdminUpsertCards { .. } => Call::AdminUpsertCards,
            Self::GetCardsCount => Call::GetCardsCount,
            Self::EnsureUserInitialized => Call::EnsureUserInitialized,
            Self::SaveDeck { .. } => Call::SaveDeck,
        }
    }
}

/// Blank means whitespace only; the value itself is passed on untouched.
fn non_blank(args: &Map<String, Value>, key: &str) -> Result<String, ProtocolError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(ProtocolError::invalid(format!("{key} is required"))),
    }
}

fn room_id(args: &Map<String, Value>) -> Result<RoomId, ProtocolError> {
    non_blank(args, "roomId").map(RoomId)
}

/// Missing, `null`, or blank all mean "match me with anyone".
fn optional_room_id(args: &Map<String, Value>) -> Result<Option<RoomId>, ProtocolError> {
    match args.get("roomId") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(RoomId(s.clone()))),
        Some(_) => Err(ProtocolError::invalid("roomId must be a string")),
    }
}

fn expect_version(args: &Map<String, Value>) -> Result<Option<u64>, ProtocolError> {
    match args.get("expectVersion") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| ProtocolError::invalid("expectVersion must be a non-negative integer")),
    }
}

fn card_id(value: Option<&Value>) -> Option<CardId> {
    let raw = value?.as_u64()?;
    let id = u32::try_from(raw).ok()?;
    (id > 0).then_some(CardId(id))
}

/// Accepts numbers and numeric strings; drops everything else.
fn lenient_card_id(value: &Value) -> Option<CardId> {
    match value {
        Value::String(s) => s.trim().parse::<u32>().ok().filter(|id| *id > 0).map(CardId),
        other => card_id(Some(other)),
    }
}

fn fetch_ids(args: &Map<String, Value>) -> Result<Request, ProtocolError> {
    let raw = match args.get("ids") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ProtocolError::invalid("ids must be a non-empty array")),
    };

    let mut seen = BTreeSet::new();
    let ids: Vec<CardId> = raw
        .iter()
        .filter_map(lenient_card_id)
        .filter(|id| seen.insert(*id))
        .take(MAX_FETCH_IDS)
        .collect();

    if ids.is_empty() {
        return Err(ProtocolError::invalid("ids contains no valid card id"));
    }
    Ok(Request::FetchCardsByIds { ids })
}

fn upsert_cards(args: &Map<String, Value>) -> Result<Request, ProtocolError> {
    let raw = match args.get("cards") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ProtocolError::invalid("cards must be a non-empty array")),
    };

    // Invalid drafts are skipped, not fatal: an admin batch import keeps
    // whatever it can.
    let cards: Vec<Card> = raw
        .iter()
        .filter_map(|draft| serde_json::from_value::<Card>(draft.clone()).ok())
        .filter(|card| card.id.0 > 0 && !card.name.trim().is_empty())
        .collect();

    if cards.is_empty() {
        return Err(ProtocolError::invalid("cards contains no valid card"));
    }
    Ok(Request::AdminUpsertCards { cards })
}

fn save_deck(args: &Map<String, Value>) -> Result<Request, ProtocolError> {
    let Some(Value::Array(raw)) = args.get("deck") else {
        return Err(ProtocolError::invalid("deck must be an array"));
    };

    let deck: Vec<CardId> = raw.iter().filter_map(lenient_card_id).collect();
    if deck.is_empty() || deck.len() > MAX_DECK_SIZE {
        return Err(ProtocolError::invalid(format!(
            "deck must hold 1 to {MAX_DECK_SIZE} cards (got {})",
            deck.len()
        )));
    }
    Ok(Request::SaveDeck { deck })
}
