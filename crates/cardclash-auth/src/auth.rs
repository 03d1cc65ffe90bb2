//! Authentication hook for validating caller identity.
//!
//! Cardclash does not verify tokens itself: that belongs to the identity
//! provider (Firebase Auth, Auth0, a JWT issuer, ...). The server only
//! needs the [`Authenticator`] trait: one async method from token to
//! [`PlayerId`].
//!
//! Production wires in a provider-backed implementation; tests and the
//! demo server use [`StaticTokens`](crate::StaticTokens).

use cardclash_protocol::PlayerId;

use crate::AuthError;

/// Validates a caller's token and returns their identity.
///
/// `Send + Sync + 'static` because a single authenticator lives inside the
/// shared server state for the whole process and is called from every
/// connection task.
///
/// # Example
///
/// ```rust
/// use cardclash_auth::{AuthError, Authenticator};
/// use cardclash_protocol::PlayerId;
///
/// /// Treats any `uid:<name>` token as that uid. Development only.
/// struct PrefixAuthenticator;
///
/// impl Authenticator for PrefixAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, AuthError> {
///         token
///             .strip_prefix("uid:")
///             .filter(|uid| !uid.is_empty())
///             .map(PlayerId::new)
///             .ok_or_else(|| AuthError::Rejected("expected uid:<name>".into()))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the given token and returns the caller's identity.
    ///
    /// # Errors
    /// [`AuthError::Rejected`] when the token is invalid or expired.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, AuthError>> + Send;

    /// Authenticates an optional token; a missing or blank token fails with
    /// [`AuthError::MissingToken`] without consulting the provider.
    fn identify(
        &self,
        token: Option<&str>,
    ) -> impl std::future::Future<Output = Result<PlayerId, AuthError>> + Send {
        async move {
            match token.map(str::trim) {
                Some(token) if !token.is_empty() => self.authenticate(token).await,
                _ => Err(AuthError::MissingToken),
            }
        }
    }
}
