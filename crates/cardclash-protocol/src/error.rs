//! Error types for the protocol layer.
//!
//! Each crate in Cardclash defines its own error enum. A `ProtocolError`
//! always means the bytes or the payload were wrong, never that the game
//! rejected a move.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a frame without `id` or `call`,
    /// or a truncated message.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame decoded fine but its payload breaks a call's contract:
    /// a blank `roomId`, a negative `cardId`, an unknown call name.
    ///
    /// Raised before any transaction is opened.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProtocolError {
    /// Shorthand used by the request validators.
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// The code reported to the client for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Encode(_) => ErrorCode::Internal,
            Self::Decode(_) | Self::InvalidArgument(_) => {
                ErrorCode::InvalidArgument
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// The error taxonomy every failed call is reduced to.
///
/// `#[serde(rename_all = "kebab-case")]` gives the JSON spelling clients
/// switch on: `"failed-precondition"`, `"permission-denied"`, ...
///
/// Only [`ErrorCode::Aborted`] asks the client to retry the whole call
/// (after refetching the room).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// No token, or the token was rejected.
    Unauthenticated,
    /// Malformed input, rejected before any transaction.
    InvalidArgument,
    /// The room or a card does not exist.
    NotFound,
    /// The caller is not a participant of the room.
    PermissionDenied,
    /// Cards not selected, room full, opponent missing.
    FailedPrecondition,
    /// Optimistic concurrency failure: stale `expectVersion` or a
    /// concurrent writer won the commit.
    Aborted,
    /// Anything unexpected inside the transaction.
    Internal,
}

impl ErrorCode {
    /// Returns `true` when the client should refetch and retry.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Aborted)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidArgument => "invalid-argument",
            Self::NotFound => "not-found",
            Self::PermissionDenied => "permission-denied",
            Self::FailedPrecondition => "failed-precondition",
            Self::Aborted => "aborted",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_as_kebab_case() {
        let json = serde_json::to_string(&ErrorCode::FailedPrecondition).unwrap();
        assert_eq!(json, "\"failed-precondition\"");
        let json = serde_json::to_string(&ErrorCode::PermissionDenied).unwrap();
        assert_eq!(json, "\"permission-denied\"");
    }

    #[test]
    fn test_error_code_display_matches_wire_spelling() {
        for code in [
            ErrorCode::Unauthenticated,
            ErrorCode::InvalidArgument,
            ErrorCode::NotFound,
            ErrorCode::PermissionDenied,
            ErrorCode::FailedPrecondition,
            ErrorCode::Aborted,
            ErrorCode::Internal,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{code}\""));
        }
    }

    #[test]
    fn test_only_aborted_is_retryable() {
        assert!(ErrorCode::Aborted.is_retryable());
        assert!(!ErrorCode::FailedPrecondition.is_retryable());
        assert!(!ErrorCode::Internal.is_retryable());
    }

    #[test]
    fn test_protocol_error_codes() {
        let err = ProtocolError::invalid("roomId is required");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(err.to_string().contains("roomId"));

        let bad: Result<u8, _> = serde_json::from_str("nope");
        let err = ProtocolError::Decode(bad.unwrap_err());
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }
}
