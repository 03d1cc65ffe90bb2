//! # Cardclash
//!
//! Authoritative backend for a two-player elemental card battle.
//!
//! Clients connect over WebSocket and send one JSON request per frame.
//! The server authenticates the caller, validates the payload and runs the
//! operation as a single optimistic transaction on the room store. Retried
//! end-turn calls are deduplicated by their action id, and a client acting
//! on a stale room version gets `aborted` back instead of a silent
//! overwrite.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cardclash::prelude::*;
//!
//! # async fn run() -> Result<(), CardclashError> {
//! let config = ServerConfig::from_env()?;
//! let server = CardclashServerBuilder::from_config(config)
//!     .build(
//!         StaticTokens::parse("t1=alice,t2=bob"),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(MemoryCatalog::new()),
//!         Arc::new(MemoryDecks::new()),
//!     )
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod service;

pub use config::{ENV_BIND, ENV_IDLE_TIMEOUT, ENV_RULES, ServerConfig, parse_rules};
pub use error::CardclashError;
pub use server::{CardclashServer, CardclashServerBuilder};
pub use service::CardclashService;

/// Common imports for running or testing a server.
pub mod prelude {
    pub use crate::{CardclashError, CardclashServer, CardclashServerBuilder, CardclashService, ServerConfig};
    pub use cardclash_auth::{AuthError, Authenticator, StaticTokens};
    pub use cardclash_protocol::{
        Card, CardId, Codec, ElementalType, ErrorCode, JsonCodec, PlayerId, Rank, ReplyBody,
        ReplyFrame, Request, RequestFrame, Role, RoomId, WireError,
    };
    pub use cardclash_room::{
        Assignment, BattleRules, CardCatalog, DeckStore, EndTurnOutcome, LeaveOutcome,
        Matchmaker, MemoryCatalog, MemoryDecks, MemoryStore, Room, RoomError, RoomMachine,
        RoomStatus, RoomStore, StoreError, TurnRecord, TurnSummary, UserProfile,
    };
}
