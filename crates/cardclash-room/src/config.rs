//! Battle rules and the room status machine.

use serde::{Deserialize, Serialize};

use crate::DEFAULT_ACTION_WINDOW;

// ---------------------------------------------------------------------------
// BattleRules
// ---------------------------------------------------------------------------

/// Thresholds and limits for a match.
///
/// Deserializable so an operator can load it from a JSON file; every
/// field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleRules {
    /// Round wins needed to take the match.
    pub points_to_win: u32,

    /// A player whose overmount goes strictly above this loses.
    pub overmount_limit: u32,

    /// Capacity of the per-room dedup window of action ids.
    pub action_window: usize,

    /// How many waiting rooms matchmaking inspects per call.
    pub matchmaking_scan_limit: usize,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            points_to_win: 3,
            overmount_limit: 100,
            action_window: DEFAULT_ACTION_WINDOW,
            matchmaking_scan_limit: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
///            join (slot 2)             win condition
///  Waiting ───────────────→ Matched ───────────────→ Finished
///     ↑                        │
///     └──── slot 2 leaves ─────┤
///                              └── slot 1 leaves ──→ Player1Left
/// ```
///
/// `Finished` is terminal: nothing about the match changes after it.
/// `Player1Left` has no way out yet; the room is parked.
///
/// The aliases read documents written with the older status labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomStatus {
    #[default]
    Waiting,
    #[serde(alias = "match")]
    Matched,
    Finished,
    #[serde(alias = "player1_left")]
    Player1Left,
}

impl RoomStatus {
    /// Returns `true` if matchmaking may put a second player here.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` once the match result is frozen.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Matched => write!(f, "matched"),
            Self::Finished => write!(f, "finished"),
            Self::Player1Left => write!(f, "player1Left"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battle_rules_default() {
        let rules = BattleRules::default();
        assert_eq!(rules.points_to_win, 3);
        assert_eq!(rules.overmount_limit, 100);
        assert_eq!(rules.action_window, 50);
        assert_eq!(rules.matchmaking_scan_limit, 10);
    }

    #[test]
    fn test_battle_rules_partial_json_keeps_defaults() {
        let rules: BattleRules = serde_json::from_str(r#"{"pointsToWin": 5}"#).unwrap();
        assert_eq!(rules.points_to_win, 5);
        assert_eq!(rules.overmount_limit, 100);
    }

    #[test]
    fn test_status_predicates() {
        assert!(RoomStatus::Waiting.is_joinable());
        assert!(!RoomStatus::Matched.is_joinable());
        assert!(!RoomStatus::Player1Left.is_joinable());
        assert!(RoomStatus::Finished.is_finished());
        assert!(!RoomStatus::Matched.is_finished());
    }

    #[test]
    fn test_status_wire_names_and_legacy_aliases() {
        assert_eq!(serde_json::to_string(&RoomStatus::Player1Left).unwrap(), "\"player1Left\"");
        let legacy: RoomStatus = serde_json::from_str("\"match\"").unwrap();
        assert_eq!(legacy, RoomStatus::Matched);
        let legacy: RoomStatus = serde_json::from_str("\"player1_left\"").unwrap();
        assert_eq!(legacy, RoomStatus::Player1Left);
        assert_eq!(RoomStatus::Player1Left.to_string(), "player1Left");
    }
}
