//! Authentication state for the console.
//!
//! [`AuthContext`] is an explicit state container over
//! `{Loading, Unauthenticated, Authenticated}` that views receive by reference.
//! It owns no global state: the token lives in the [`SessionStore`] the
//! [`ApiClient`] was built with.
//!
//! ```text
//!            restore(): token + profile ok
//! Loading ───────────────────────────────────► Authenticated(user)
//!    │                                              │   ▲
//!    │ restore(): no token / profile failed         │   │ login()/register() ok
//!    ▼                                              ▼   │
//! Unauthenticated ◄──── logout() / SessionEvent::Expired
//! ```
//!
//! [`SessionStore`]: crate::session::SessionStore

use tracing::{debug, info, warn};

use crate::api::{ApiClient, SessionEvent};
use crate::error::{AuthError, RequestError};
use crate::types::{AuthResponse, User};

/// Authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Session restore has not settled yet.
    #[default]
    Loading,
    /// No usable session.
    Unauthenticated,
    /// Signed in as the given user.
    Authenticated(User),
}

/// Holds the authentication state and exposes login, register and logout.
#[derive(Debug)]
pub struct AuthContext {
    api: ApiClient,
    state: AuthState,
}

impl AuthContext {
    /// Creates a context in the [`AuthState::Loading`] state.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: AuthState::Loading,
        }
    }

    /// The API client this context authenticates.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == AuthState::Loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The signed-in user, or [`AuthError::NotAuthenticated`].
    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.user().ok_or(AuthError::NotAuthenticated)
    }

    /// Restores a persisted session.
    ///
    /// With a stored token the profile is fetched: success authenticates, any
    /// failure clears the token. Without a token the context becomes
    /// unauthenticated immediately.
    pub async fn restore(&mut self) -> &AuthState {
        if self.begin_restore() {
            let result = self.api.profile().await;
            self.complete_restore(result);
        }
        &self.state
    }

    /// First half of [`AuthContext::restore`] for callers that fetch the
    /// profile themselves. Returns true if a profile fetch is needed; without
    /// a stored token the context becomes unauthenticated immediately.
    pub fn begin_restore(&mut self) -> bool {
        if self.api.is_authenticated() {
            self.state = AuthState::Loading;
            return true;
        }
        debug!("No stored session");
        self.state = AuthState::Unauthenticated;
        false
    }

    /// Signs in. On failure the state is left unchanged.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        let response = self.api.login(email, password).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            e
        })?;
        self.establish(response)
    }

    /// Creates an account and signs in. On failure the state is left unchanged.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        let response = self.api.register(email, password).await.map_err(|e| {
            warn!(error = %e, "Registration failed");
            e
        })?;
        self.establish(response)
    }

    /// Signs out locally. No backend call is made.
    pub fn logout(&mut self) {
        if let Err(e) = self.api.session().remove_token() {
            warn!(error = %e, "Failed to clear session token");
        }
        self.state = AuthState::Unauthenticated;
        info!("Logged out");
    }

    /// Applies a session notification from the API client.
    pub fn handle_session_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Expired { path } => {
                debug!(path = %path, "Session expired");
                self.state = AuthState::Unauthenticated;
            }
        }
    }

    /// Adopts a session produced by a successful login or registration.
    ///
    /// Used directly by callers that performed the request themselves.
    pub fn establish(&mut self, response: AuthResponse) -> Result<&User, AuthError> {
        self.api.session().set_token(&response.access_token)?;
        info!(email = %response.user.email, "Signed in");
        self.state = AuthState::Authenticated(response.user);
        self.require_user()
    }

    /// Settles a session restore with the result of a profile fetch.
    pub fn complete_restore(&mut self, result: Result<User, RequestError>) {
        match result {
            Ok(user) => {
                info!(email = %user.email, "Session restored");
                self.state = AuthState::Authenticated(user);
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected");
                if let Err(e) = self.api.session().remove_token() {
                    warn!(error = %e, "Failed to clear session token");
                }
                self.state = AuthState::Unauthenticated;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::session::{MemorySessionStore, SessionStore};

    fn context_with_store(store: Arc<MemorySessionStore>) -> AuthContext {
        // Port 9 (discard) is never contacted by these tests.
        let config = Config::new("http://127.0.0.1:9", PathBuf::from("/unused"));
        let api = ApiClient::new(&config, store).unwrap();
        AuthContext::new(api)
    }

    fn user(email: &str) -> User {
        User {
            id: "usr_1".to_string(),
            email: email.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn starts_loading() {
        let auth = context_with_store(Arc::new(MemorySessionStore::new()));
        assert!(auth.is_loading());
        assert!(auth.user().is_none());
        assert!(matches!(
            auth.require_user(),
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn restore_without_token_is_unauthenticated() {
        let mut auth = context_with_store(Arc::new(MemorySessionStore::new()));
        assert_eq!(auth.restore().await, &AuthState::Unauthenticated);
    }

    #[test]
    fn begin_restore_reports_whether_a_fetch_is_needed() {
        let mut without = context_with_store(Arc::new(MemorySessionStore::new()));
        assert!(!without.begin_restore());
        assert_eq!(without.state(), &AuthState::Unauthenticated);

        let mut with = context_with_store(Arc::new(MemorySessionStore::with_token("tok")));
        assert!(with.begin_restore());
        assert!(with.is_loading());
    }

    #[test]
    fn establish_persists_token_and_authenticates() {
        let store = Arc::new(MemorySessionStore::new());
        let mut auth = context_with_store(store.clone());

        let signed_in = auth
            .establish(AuthResponse {
                access_token: "tok_123".to_string(),
                user: user("a@b.com"),
            })
            .unwrap()
            .clone();

        assert_eq!(signed_in.email, "a@b.com");
        assert!(auth.is_authenticated());
        assert_eq!(store.get_token().unwrap().expose(), "tok_123");
    }

    #[test]
    fn logout_clears_token_and_state() {
        let store = Arc::new(MemorySessionStore::with_token("tok"));
        let mut auth = context_with_store(store.clone());
        auth.complete_restore(Ok(user("a@b.com")));
        assert!(auth.is_authenticated());

        auth.logout();

        assert_eq!(auth.state(), &AuthState::Unauthenticated);
        assert!(!store.has_token());
    }

    #[test]
    fn failed_restore_clears_token() {
        let store = Arc::new(MemorySessionStore::with_token("stale"));
        let mut auth = context_with_store(store.clone());

        auth.complete_restore(Err(RequestError::Status {
            status: 500,
            message: "boom".to_string(),
        }));

        assert_eq!(auth.state(), &AuthState::Unauthenticated);
        assert!(!store.has_token());
    }

    #[test]
    fn expired_session_event_signs_out() {
        let mut auth = context_with_store(Arc::new(MemorySessionStore::new()));
        auth.complete_restore(Ok(user("a@b.com")));

        auth.handle_session_event(&SessionEvent::Expired {
            path: "/webhooks".to_string(),
        });

        assert!(!auth.is_authenticated());
    }
}
