//! HTTP client for the webhook backend.
//!
//! [`ApiClient`] is the single point of HTTP access to the backend. It:
//!
//! - Attaches the stored session token as a bearer credential on every request
//! - Invalidates the session on any 401 response and broadcasts
//!   [`SessionEvent::Expired`] so the UI can return to its login screen
//! - Exposes one method per backend operation, each resolving with the decoded
//!   body or failing with a [`RequestError`]
//!
//! There are no retries and no timeout policy beyond the configured per-request
//! timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hookboard_client::api::ApiClient;
//! use hookboard_client::config::Config;
//! use hookboard_client::session::FileSessionStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let store = Arc::new(FileSessionStore::new(&config.session_dir));
//!     let api = ApiClient::new(&config, store).unwrap();
//!
//!     for sub in api.list_subscriptions().await.unwrap() {
//!         println!("{} -> {}", sub.source_url, sub.callback_url);
//!     }
//! }
//! ```

use std::sync::Arc;

use reqwest::header::HeaderValue;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::RequestError;
use crate::session::SessionStore;
use crate::types::{
    AuthResponse, Credentials, NewSubscription, ProfileResponse, SubscriptionDetail,
    TestFireResponse, User, WebhookSubscription,
};

/// Header carrying the event type tag on test fires.
pub const EVENT_TYPE_HEADER: &str = "X-Event-Type";

/// Capacity of the session event channel.
const SESSION_EVENT_CAPACITY: usize = 16;

/// Longest backend error body echoed back in a [`RequestError`].
const MAX_ERROR_BODY_CHARS: usize = 200;

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const PROFILE_PATH: &str = "/auth/profile";

/// Which responses trigger session invalidation on 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterceptPolicy {
    /// Every request, including login and register.
    #[default]
    AllRequests,
    /// Every request except the login and register endpoints, whose 401s are
    /// reported to the caller without touching the stored session.
    ExcludeAuthEndpoints,
}

impl InterceptPolicy {
    fn applies_to(self, path: &str) -> bool {
        match self {
            Self::AllRequests => true,
            Self::ExcludeAuthEndpoints => path != LOGIN_PATH && path != REGISTER_PATH,
        }
    }
}

/// Session lifecycle notifications emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the credential; the stored token has been cleared
    /// and the user must sign in again.
    Expired {
        /// Path of the request that triggered the invalidation.
        path: String,
    },
}

/// Client for the webhook backend's REST surface.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<dyn SessionStore>,
    intercept_policy: InterceptPolicy,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("intercept_policy", &self.intercept_policy)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            session,
            intercept_policy: config.intercept_policy,
            events,
        })
    }

    /// Backend base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session store whose token this client attaches.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Returns true if a session token is currently stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.has_token()
    }

    /// Subscribes to session lifecycle notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // Auth endpoints
    // -------------------------------------------------------------------------

    /// Creates an account. `POST /auth/register`.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, RequestError> {
        let body = Credentials { email, password };
        let builder = self.request(Method::POST, REGISTER_PATH).json(&body);
        self.send_json(REGISTER_PATH, builder).await
    }

    /// Authenticates. `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RequestError> {
        let body = Credentials { email, password };
        let builder = self.request(Method::POST, LOGIN_PATH).json(&body);
        self.send_json(LOGIN_PATH, builder).await
    }

    /// Fetches the current user. `GET /auth/profile`.
    pub async fn profile(&self) -> Result<User, RequestError> {
        let builder = self.request(Method::GET, PROFILE_PATH);
        let profile: ProfileResponse = self.send_json(PROFILE_PATH, builder).await?;
        Ok(profile.into_user())
    }

    // -------------------------------------------------------------------------
    // Webhook endpoints
    // -------------------------------------------------------------------------

    /// Creates a subscription. `POST /webhooks/subscribe`.
    pub async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<WebhookSubscription, RequestError> {
        let path = "/webhooks/subscribe";
        let builder = self.request(Method::POST, path).json(subscription);
        self.send_json(path, builder).await
    }

    /// Lists the current user's subscriptions. `GET /webhooks`.
    pub async fn list_subscriptions(&self) -> Result<Vec<WebhookSubscription>, RequestError> {
        let path = "/webhooks";
        let builder = self.request(Method::GET, path);
        self.send_json(path, builder).await
    }

    /// Fetches one subscription with its events. `GET /webhooks/:id`.
    pub async fn subscription(&self, id: &str) -> Result<SubscriptionDetail, RequestError> {
        let path = format!("/webhooks/{id}");
        let builder = self.request(Method::GET, &path);
        self.send_json(&path, builder).await
    }

    /// Marks a subscription inactive. `POST /webhooks/:id/cancel`.
    pub async fn cancel_subscription(&self, id: &str) -> Result<WebhookSubscription, RequestError> {
        let path = format!("/webhooks/{id}/cancel");
        let builder = self.request(Method::POST, &path);
        self.send_json(&path, builder).await
    }

    /// Removes a subscription. `DELETE /webhooks/:id`.
    ///
    /// Only meaningful for inactive subscriptions; the backend enforces this.
    pub async fn delete_subscription(&self, id: &str) -> Result<(), RequestError> {
        let path = format!("/webhooks/{id}");
        let builder = self.request(Method::DELETE, &path);
        self.send(&path, builder).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Test ingress
    // -------------------------------------------------------------------------

    /// URL that test fires for `subscription_id` are posted to.
    #[must_use]
    pub fn webhook_url(&self, subscription_id: &str) -> String {
        format!("{}/webhook-events/{}", self.base_url, subscription_id)
    }

    /// Fires a synthetic event at `/webhook-events/:subscription_id`.
    ///
    /// This is a direct call to the public ingress endpoint: no bearer token is
    /// attached and a 401 here does not invalidate the session. Any status is
    /// returned as a [`TestFireResponse`]; the body must be JSON.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` on transport failure, an invalid event type header,
    /// or a body that is not JSON.
    pub async fn fire_test_event(
        &self,
        subscription_id: &str,
        event_type: &str,
        payload: &Value,
    ) -> Result<TestFireResponse, RequestError> {
        let url = self.webhook_url(subscription_id);
        let event_type_value = HeaderValue::from_str(event_type)?;

        debug!(url = %url, event_type = %event_type, "Firing test event");

        let response = self
            .client
            .post(&url)
            .header(EVENT_TYPE_HEADER, event_type_value)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        debug!(status, "Test event response received");
        Ok(TestFireResponse { status, body })
    }

    // -------------------------------------------------------------------------
    // Plumbing
    // -------------------------------------------------------------------------

    /// Builds a request with the bearer credential attached when one is stored.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.session.get_token() {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Sends a request and returns the raw body of a successful response.
    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Vec<u8>, RequestError> {
        debug!(path = %path, "Sending request");

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(status, &body);

        if status == StatusCode::UNAUTHORIZED {
            if self.intercept_policy.applies_to(path) {
                self.invalidate_session(path);
            }
            return Err(RequestError::Unauthorized { message });
        }

        debug!(path = %path, status = status.as_u16(), message = %message, "Request failed");
        Err(RequestError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, RequestError> {
        let body = self.send(path, builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Clears the stored credential and tells listeners to return to login.
    fn invalidate_session(&self, path: &str) {
        warn!(path = %path, "Authorization failed, clearing session");

        if let Err(e) = self.session.remove_token() {
            warn!(error = %e, "Failed to clear session token");
        }

        // No receivers is fine: nothing is showing a login screen.
        let _ = self.events.send(SessionEvent::Expired {
            path: path.to_string(),
        });
    }
}

/// Extracts the backend's error message from a failed response body.
///
/// Prefers the `message` field (string, or array of validation messages),
/// then `error`, then the raw body text, then the canonical status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("message") {
            Some(Value::String(message)) => return message.clone(),
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return joined;
                }
            }
            _ => {}
        }
        if let Some(Value::String(error)) = value.get("error") {
            return error.clone();
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.chars().take(MAX_ERROR_BODY_CHARS).collect();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
