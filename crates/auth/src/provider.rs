//! External authentication provider contract.

use std::sync::Arc;

use thiserror::Error;

use stockroom_store::Subscription;

use crate::user::AuthUser;

/// Auth collaborator failure (network, cancelled popup, revoked token).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("sign-in failed: {0}")]
    SignIn(String),

    #[error("sign-out failed: {0}")]
    SignOut(String),
}

/// Session-change listener: `Some` on sign-in/token refresh, `None` on
/// sign-out.
pub type SessionListener = Arc<dyn Fn(Option<&AuthUser>) + Send + Sync>;

/// External authentication provider.
///
/// The concrete integration (Google sign-in in the shipped product) lives
/// outside this workspace; the session manager depends only on this
/// contract.
pub trait AuthProvider: Send + Sync {
    /// Run the interactive sign-in flow.
    fn sign_in(&self) -> Result<AuthUser, AuthError>;

    /// Terminate the current session.
    fn sign_out(&self) -> Result<(), AuthError>;

    /// Register a session-change listener. The provider reports every
    /// sign-in, sign-out and token refresh until the handle is released.
    fn on_session_change(&self, listener: SessionListener) -> Subscription;
}

impl<P> AuthProvider for Arc<P>
where
    P: AuthProvider + ?Sized,
{
    fn sign_in(&self) -> Result<AuthUser, AuthError> {
        (**self).sign_in()
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        (**self).sign_out()
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        (**self).on_session_change(listener)
    }
}
