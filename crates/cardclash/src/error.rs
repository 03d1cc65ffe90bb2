//! Unified error type for the Cardclash server.

use cardclash_auth::AuthError;
use cardclash_protocol::{ErrorCode, ProtocolError};
use cardclash_room::{RoomError, StoreError};
use cardclash_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// `?` converts sub-crate errors through the `#[from]` impls, and
/// [`code`](Self::code) picks the wire code a client sees.
#[derive(Debug, thiserror::Error)]
pub enum CardclashError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Undecodable frame or rejected payload.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Room(#[from] RoomError),

    /// Startup configuration could not be loaded.
    #[error("config: {0}")]
    Config(String),
}

impl CardclashError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) | Self::Config(_) => ErrorCode::Internal,
            Self::Protocol(e) => e.code(),
            Self::Auth(_) => ErrorCode::Unauthenticated,
            Self::Room(e) => e.code(),
        }
    }
}

impl From<StoreError> for CardclashError {
    fn from(err: StoreError) -> Self {
        Self::Room(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardclash_protocol::RoomId;

    #[test]
    fn test_auth_errors_are_unauthenticated() {
        let err: CardclashError = AuthError::MissingToken.into();
        assert!(matches!(err, CardclashError::Auth(_)));
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_room_codes_pass_through() {
        let err: CardclashError = RoomError::NotFound(RoomId::new("r")).into();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.to_string().contains("r"));

        let err: CardclashError = StoreError::Conflict(RoomId::new("r")).into();
        assert_eq!(err.code(), ErrorCode::Aborted);
    }

    #[test]
    fn test_transport_is_internal() {
        let err: CardclashError = TransportError::Closed.into();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_decode_failure_keeps_its_source() {
        use std::error::Error;
        let json = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: CardclashError = ProtocolError::Decode(json).into();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(err.source().is_some());
    }
}
