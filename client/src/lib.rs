//! Hookboard Client - session, API and auth layer for the webhook backend.
//!
//! This crate is the thin, typed access layer the Hookboard console is built on.
//! The backend owns all business logic (subscription lifecycle, delivery,
//! retries, signatures); this crate only talks to it.
//!
//! # Modules
//!
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types for client operations
//! - [`types`]: Wire types (users, subscriptions, events)
//! - [`session`]: Persistent storage for the bearer token
//! - [`api`]: HTTP client with bearer injection and 401 interception
//! - [`auth`]: Explicit authentication state container

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use api::{ApiClient, InterceptPolicy, SessionEvent};
pub use auth::{AuthContext, AuthState};
pub use config::Config;
pub use error::{AuthError, ClientError, RequestError, Result};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SessionToken};
pub use types::{
    AuthResponse, NewSubscription, SubscriptionDetail, TestFireResponse, User, WebhookEvent,
    WebhookSubscription,
};
