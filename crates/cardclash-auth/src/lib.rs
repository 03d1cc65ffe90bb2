//! Caller identity for Cardclash.
//!
//! Every call must carry a token; this crate turns it into a
//! [`PlayerId`](cardclash_protocol::PlayerId) or rejects it.
//!
//! ```text
//! Room Layer (above)  ← trusts the PlayerId, never the payload
//!     ↕
//! Auth Layer (this crate)  ← token → PlayerId
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod tokens;

pub use auth::Authenticator;
pub use error::AuthError;
pub use tokens::StaticTokens;
