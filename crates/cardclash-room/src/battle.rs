//! Round resolution.
//!
//! Pure functions only: no store, no clock, no randomness. Given the two
//! selected cards, [`resolve`] says who won the round and by how much.
//!
//! Elemental types form a 3-cycle. A card whose type beats the opponent's
//! type fights at double power:
//!
//! ```text
//!   It ──beats──→ Language ──beats──→ Business ──beats──→ It
//! ```

use cardclash_protocol::{Card, ElementalType, Role};
use serde::{Deserialize, Serialize};

/// Returns `true` if `own` has the advantage over `opponent`.
pub fn beats(own: ElementalType, opponent: ElementalType) -> bool {
    use ElementalType::*;
    matches!(
        (own, opponent),
        (It, Language) | (Language, Business) | (Business, It)
    )
}

/// A card's power after elemental advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePower {
    pub power: u32,
    pub advantaged: bool,
}

/// Doubles `base` when `own` beats `opponent`.
pub fn effective_power(base: u32, own: ElementalType, opponent: ElementalType) -> EffectivePower {
    let advantaged = beats(own, opponent);
    let power = if advantaged { base.saturating_mul(2) } else { base };
    EffectivePower { power, advantaged }
}

/// Who took the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Player1,
    Player2,
    Draw,
}

impl RoundResult {
    /// The winning slot, or `None` on a draw.
    pub fn winner(self) -> Option<Role> {
        match self {
            Self::Player1 => Some(Role::Player1),
            Self::Player2 => Some(Role::Player2),
            Self::Draw => None,
        }
    }
}

/// The full result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub player1: EffectivePower,
    pub player2: EffectivePower,
    pub result: RoundResult,
}

impl RoundOutcome {
    /// Winner's effective power minus loser's; 0 on a draw.
    pub fn margin(&self) -> u32 {
        self.player1.power.abs_diff(self.player2.power)
    }
}

/// Resolves a round between player 1's and player 2's cards.
///
/// Higher effective power wins; equal powers draw.
pub fn resolve(player1: &Card, player2: &Card) -> RoundOutcome {
    let p1 = effective_power(player1.power, player1.elemental_type, player2.elemental_type);
    let p2 = effective_power(player2.power, player2.elemental_type, player1.elemental_type);

    let result = match p1.power.cmp(&p2.power) {
        std::cmp::Ordering::Greater => RoundResult::Player1,
        std::cmp::Ordering::Less => RoundResult::Player2,
        std::cmp::Ordering::Equal => RoundResult::Draw,
    };

    RoundOutcome { player1: p1, player2: p2, result }
}
