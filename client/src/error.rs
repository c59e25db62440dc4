//! Error types for the Hookboard client.
//!
//! This module defines the error types used throughout the client crate,
//! providing structured error handling with clear, human-readable messages.

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionError;

/// Errors returned by a single backend request.
///
/// Every API operation either resolves with the decoded body or fails with one
/// of these variants. Non-2xx responses carry the HTTP status and the message
/// the backend supplied.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Network or transport failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the credential (401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The backend returned any other non-success status.
    #[error("server error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A header value (e.g., the event type tag) contains invalid characters.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl RequestError {
    /// HTTP status carried by this error, if the backend responded at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::InvalidHeader(_) => None,
        }
    }

    /// Returns true if the backend answered with an authorization failure.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Errors raised by the auth context.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend call failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The returned token could not be persisted.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An operation that needs a signed-in user was called without one.
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Top-level error for client setup and operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session storage error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Backend request error.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Authentication error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
