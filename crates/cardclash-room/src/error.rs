//! Error types for the room layer.

use cardclash_protocol::{CardId, ErrorCode, PlayerId, RoomId};

/// Failures of the storage backends behind [`RoomStore`](crate::RoomStore)
/// and [`CardCatalog`](crate::CardCatalog).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another transaction committed to this room after our read.
    #[error("room {0} was modified concurrently")]
    Conflict(RoomId),

    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during room operations.
///
/// Every variant maps to one wire [`ErrorCode`] through [`RoomError::code`].
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A selected card is missing from the catalog.
    #[error("card {0} not found")]
    CardNotFound(CardId),

    /// The caller holds neither slot of the room.
    #[error("player {0} is not a participant of room {1}")]
    NotParticipant(PlayerId, RoomId),

    /// Both slots are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The match is over; the room cannot be joined.
    #[error("room {0} is already finished")]
    Finished(RoomId),

    /// A slot is empty, so there is nobody to fight.
    #[error("room {0} has no opponent")]
    OpponentMissing(RoomId),

    /// At least one participant has not picked a card this turn.
    #[error("both players must select a card in room {0}")]
    CardsNotSelected(RoomId),

    /// The client acted on an outdated snapshot.
    #[error("version mismatch in room {room}: expected {expected}, current {current}")]
    VersionMismatch {
        room: RoomId,
        expected: u64,
        current: u64,
    },

    /// Input rejected by a collaborator before any write.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed. `Conflict` is reported as `Aborted`,
    /// anything else as `Internal`.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RoomError {
    /// The code reported to the client for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) | Self::CardNotFound(_) => ErrorCode::NotFound,
            Self::NotParticipant(..) => ErrorCode::PermissionDenied,
            Self::RoomFull(_)
            | Self::Finished(_)
            | Self::OpponentMissing(_)
            | Self::CardsNotSelected(_) => ErrorCode::FailedPrecondition,
            Self::VersionMismatch { .. } | Self::Store(StoreError::Conflict(_)) => {
                ErrorCode::Aborted
            }
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Store(StoreError::Unavailable(_)) => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomId {
        RoomId::new("r1")
    }

    #[test]
    fn test_codes_follow_taxonomy() {
        assert_eq!(RoomError::NotFound(room()).code(), ErrorCode::NotFound);
        assert_eq!(RoomError::CardNotFound(CardId(3)).code(), ErrorCode::NotFound);
        assert_eq!(
            RoomError::NotParticipant(PlayerId::new("x"), room()).code(),
            ErrorCode::PermissionDenied
        );
        assert_eq!(RoomError::RoomFull(room()).code(), ErrorCode::FailedPrecondition);
        assert_eq!(RoomError::CardsNotSelected(room()).code(), ErrorCode::FailedPrecondition);
        assert_eq!(
            RoomError::VersionMismatch { room: room(), expected: 1, current: 2 }.code(),
            ErrorCode::Aborted
        );
    }

    #[test]
    fn test_store_errors_split_between_aborted_and_internal() {
        let conflict: RoomError = StoreError::Conflict(room()).into();
        assert_eq!(conflict.code(), ErrorCode::Aborted);

        let down: RoomError = StoreError::Unavailable("disk on fire".into()).into();
        assert_eq!(down.code(), ErrorCode::Internal);
        assert!(down.to_string().contains("disk on fire"));
    }
}
