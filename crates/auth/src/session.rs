//! Session manager: current user, loading flag, login/logout.

use std::sync::{Arc, RwLock};

use stockroom_observability::Notifier;
use stockroom_store::Subscription;

use crate::provider::AuthProvider;
use crate::user::AuthUser;

#[derive(Debug, Default)]
struct SessionState {
    user: Option<AuthUser>,
    loading: bool,
}

/// Tracks the authenticated session for the UI layer.
///
/// Holds the nullable current user and a loading flag, and keeps both in
/// sync with the provider through a session-change listener registered at
/// construction and released when the manager is dropped.
///
/// Every provider failure is caught here: logged, surfaced through the
/// [`Notifier`], and never propagated. Login reports failure through its
/// boolean return; logout failures are swallowed after notification.
pub struct SessionManager<P: AuthProvider> {
    provider: P,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<SessionState>>,
    _session_watch: Subscription,
}

impl<P: AuthProvider> SessionManager<P> {
    pub fn new(provider: P, notifier: Arc<dyn Notifier>) -> Self {
        let state = Arc::new(RwLock::new(SessionState {
            user: None,
            loading: true,
        }));

        let watch_state = state.clone();
        let session_watch = provider.on_session_change(Arc::new(move |user| {
            if let Ok(mut s) = watch_state.write() {
                s.user = user.cloned();
                s.loading = false;
            }
        }));

        Self {
            provider,
            notifier,
            state,
            _session_watch: session_watch,
        }
    }

    /// The signed-in identity, if any.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.read().ok().and_then(|s| s.user.clone())
    }

    /// Whether an auth operation (or the initial session probe) is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.read().map(|s| s.loading).unwrap_or(false)
    }

    /// Run the interactive Google sign-in flow.
    ///
    /// Returns whether the sign-in succeeded; the loading flag is cleared on
    /// both paths.
    pub fn login_with_google(&self) -> bool {
        self.set_loading(true);

        let succeeded = match self.provider.sign_in() {
            Ok(user) => {
                tracing::info!(user = %user.auth_id, "signed in");
                if let Ok(mut s) = self.state.write() {
                    s.user = Some(user);
                }
                self.notifier.success("Signed in successfully");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "google sign-in failed");
                self.notifier.error("Sign-in failed. Please try again.");
                false
            }
        };

        self.set_loading(false);
        succeeded
    }

    /// Terminate the session. Failures are notified and swallowed.
    pub fn logout(&self) {
        match self.provider.sign_out() {
            Ok(()) => {
                if let Ok(mut s) = self.state.write() {
                    s.user = None;
                }
                self.notifier.success("Signed out");
            }
            Err(e) => {
                tracing::error!(error = %e, "sign-out failed");
                self.notifier.error("Sign-out failed");
            }
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Ok(mut s) = self.state.write() {
            s.loading = loading;
        }
    }
}
