//! Error types for the auth layer.

/// Reasons a caller could not be identified.
///
/// Both variants surface to the client as `unauthenticated`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The frame carried no token at all.
    #[error("authentication required")]
    MissingToken,

    /// The token was present but rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    Rejected(String),
}
