//! The room document and the turn audit record.
//!
//! Field names serialize in camelCase, the shape the document store and
//! the clients both read. Every field of [`Room`] except `id` has a serde
//! default, so a document written before a field existed still loads with
//! an explicit value instead of failing.

use std::time::{SystemTime, UNIX_EPOCH};

use cardclash_protocol::{CardId, PlayerId, Role, RoomId};
use serde::{Deserialize, Serialize};

use crate::{ActionWindow, RoomStatus, RoundResult};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Running score of a match plus the cards picked for the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameState {
    pub p1_points: u32,
    pub p2_points: u32,
    pub p1_overmount: u32,
    pub p2_overmount: u32,
    /// 1-based; advanced once per resolved turn.
    pub turn_number: u32,
    pub p1_selected_card: Option<CardId>,
    pub p2_selected_card: Option<CardId>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            p1_points: 0,
            p2_points: 0,
            p1_overmount: 0,
            p2_overmount: 0,
            turn_number: 1,
            p1_selected_card: None,
            p2_selected_card: None,
        }
    }
}

impl GameState {
    pub fn selected(&self, role: Role) -> Option<CardId> {
        match role {
            Role::Player1 => self.p1_selected_card,
            Role::Player2 => self.p2_selected_card,
        }
    }

    pub fn select(&mut self, role: Role, card: CardId) {
        match role {
            Role::Player1 => self.p1_selected_card = Some(card),
            Role::Player2 => self.p2_selected_card = Some(card),
        }
    }

    pub fn clear_selections(&mut self) {
        self.p1_selected_card = None;
        self.p2_selected_card = None;
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One match between (at most) two participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub player1_id: Option<PlayerId>,
    #[serde(default)]
    pub player2_id: Option<PlayerId>,
    #[serde(default)]
    pub status: RoomStatus,
    /// Bumped exactly once per accepted turn resolution.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub processed_action_ids: ActionWindow,
    #[serde(default)]
    pub game_state: GameState,
    /// Set only when `status` is `Finished`.
    #[serde(default)]
    pub winner_id: Option<PlayerId>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default)]
    pub finished_at: Option<u64>,
}

impl Room {
    /// A fresh waiting room with `creator` in slot 1.
    pub fn new(id: RoomId, creator: PlayerId, now: u64) -> Self {
        Self {
            id,
            player1_id: Some(creator),
            player2_id: None,
            status: RoomStatus::Waiting,
            version: 0,
            processed_action_ids: ActionWindow::new(),
            game_state: GameState::default(),
            winner_id: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    /// The occupant of `role`'s slot.
    pub fn participant(&self, role: Role) -> Option<&PlayerId> {
        match role {
            Role::Player1 => self.player1_id.as_ref(),
            Role::Player2 => self.player2_id.as_ref(),
        }
    }

    /// Which slot `player` holds, if any.
    pub fn role_of(&self, player: &PlayerId) -> Option<Role> {
        if self.player1_id.as_ref() == Some(player) {
            Some(Role::Player1)
        } else if self.player2_id.as_ref() == Some(player) {
            Some(Role::Player2)
        } else {
            None
        }
    }

    pub fn is_participant(&self, player: &PlayerId) -> bool {
        self.role_of(player).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.player1_id.is_none() && self.player2_id.is_none()
    }

    /// Waiting with a creator in slot 1 and slot 2 open.
    pub fn is_open_for_matching(&self) -> bool {
        self.status.is_joinable() && self.player1_id.is_some() && self.player2_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Turn summary and audit record
// ---------------------------------------------------------------------------

/// What an end-turn call reports about the round it resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    pub result: RoundResult,
    pub p1_power: u32,
    pub p2_power: u32,
    pub p1_advantaged: bool,
    pub p2_advantaged: bool,
    pub p1_points: u32,
    pub p2_points: u32,
    pub p1_overmount: u32,
    pub p2_overmount: u32,
    pub next_turn: u32,
}

/// Immutable log entry written alongside every accepted end-turn.
///
/// Keyed by room and action id; the store never rewrites one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub room_id: RoomId,
    pub action_id: String,
    /// Who called end-turn.
    pub caller: PlayerId,
    pub p1_card_id: CardId,
    pub p2_card_id: CardId,
    pub p1_base: u32,
    pub p2_base: u32,
    pub turn_from: u32,
    pub turn_to: u32,
    /// The room version this turn produced.
    pub version: u64,
    pub summary: TurnSummary,
    pub created_at: u64,
}
