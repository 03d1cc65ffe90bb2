//! Room lifecycle management for Cardclash.
//!
//! A room is one two-player match. Every operation on it runs as a single
//! optimistic transaction against a [`RoomStore`]: read the snapshot,
//! compute the next one, commit only if nobody else committed in between.
//!
//! # Key types
//!
//! - [`RoomMachine`]: card selection, turn resolution, leaving, joining
//! - [`Matchmaker`]: the "find or create" entry path
//! - [`battle`]: pure round resolution (elemental advantage, powers)
//! - [`ActionWindow`]: the bounded dedup window of applied action ids
//! - [`RoomStore`] / [`CardCatalog`] / [`DeckStore`]: persistence ports,
//!   with in-memory implementations ([`MemoryStore`], [`MemoryCatalog`],
//!   [`MemoryDecks`])
//! - [`BattleRules`]: thresholds and limits

pub mod battle;
mod catalog;
mod config;
mod deck;
mod dedup;
mod error;
mod machine;
mod matchmaker;
mod model;
mod store;

pub use battle::{EffectivePower, RoundOutcome, RoundResult};
pub use catalog::{CardCatalog, MemoryCatalog};
pub use config::{BattleRules, RoomStatus};
pub use deck::{DEFAULT_DECK, DeckStore, MemoryDecks, UserProfile};
pub use dedup::{ActionWindow, DEFAULT_ACTION_WINDOW};
pub use error::{RoomError, StoreError};
pub use machine::{EndTurnOutcome, LeaveOutcome, RoomMachine};
pub use matchmaker::{Assignment, Matchmaker};
pub use model::{GameState, Room, TurnRecord, TurnSummary, now_ms};
pub use store::{Commit, MemoryStore, RoomStore, RoomWrite, Snapshot};
