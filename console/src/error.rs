//! Error types for the Hookboard console.
//!
//! View operations return these instead of swallowing failures, so the caller
//! decides how to render them.

use hookboard_client::{ClientError, RequestError};
use thiserror::Error;

/// Errors raised by dashboard operations.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The backend call failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// No subscription with this id is in the loaded list.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(String),

    /// The action is not offered for the subscription's current state.
    #[error("cannot {action} subscription {id} in its current state")]
    ActionUnavailable { action: &'static str, id: String },

    /// Another action is still in flight.
    #[error("another request is still pending")]
    Busy,

    /// Submit was called with no create form open.
    #[error("no subscription form is open")]
    NoForm,

    /// A create form field failed validation.
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },

    /// Confirm was called with no pending deletion.
    #[error("no deletion awaiting confirmation")]
    NothingToConfirm,

    /// A response arrived for a request that has since been superseded.
    #[error("response superseded by a newer request")]
    Stale,
}

/// Errors raised by tester operations.
#[derive(Error, Debug)]
pub enum TesterError {
    /// The backend call failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Send was requested without choosing a subscription.
    #[error("please select a subscription")]
    NoSubscriptionSelected,

    /// No active subscription with this id is loaded.
    #[error("unknown or inactive subscription: {0}")]
    UnknownSubscription(String),

    /// A test send is already in flight.
    #[error("a test webhook is already being sent")]
    SendInProgress,

    /// The custom payload is not valid JSON. The failure has been recorded as
    /// a test result.
    #[error("invalid custom payload: {0}")]
    InvalidPayload(String),

    /// A response arrived for a request that has since been superseded.
    #[error("response superseded by a newer request")]
    Stale,

    /// The tunnel collaborator failed.
    #[error(transparent)]
    Tunnel(#[from] TunnelError),
}

/// Errors raised by a tunnel implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TunnelError {
    /// The tunnel could not be established.
    #[error("failed to start tunnel: {0}")]
    StartFailed(String),

    /// The tunnel could not be torn down cleanly.
    #[error("failed to stop tunnel: {0}")]
    StopFailed(String),
}

/// Errors that can occur during TUI operation.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Terminal initialization failed.
    #[error("failed to initialize terminal: {0}")]
    TerminalInit(#[source] std::io::Error),

    /// Terminal rendering failed.
    #[error("render error: {0}")]
    Render(#[source] std::io::Error),

    /// Event handling error.
    #[error("event error: {0}")]
    Event(String),
}

/// Top-level console error.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    #[error("tester error: {0}")]
    Tester(#[from] TesterError),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_action_unavailable_display() {
        let err = DashboardError::ActionUnavailable {
            action: "delete",
            id: "sub_1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot delete subscription sub_1 in its current state"
        );
    }

    #[test]
    fn dashboard_invalid_display() {
        let err = DashboardError::Invalid {
            field: "source URL",
            message: "is required".to_string(),
        };
        assert_eq!(err.to_string(), "source URL: is required");
    }

    #[test]
    fn dashboard_request_is_transparent() {
        let err: DashboardError = RequestError::Status {
            status: 404,
            message: "Subscription not found".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "server error: 404 - Subscription not found");
    }

    #[test]
    fn tester_no_selection_display() {
        assert_eq!(
            TesterError::NoSubscriptionSelected.to_string(),
            "please select a subscription"
        );
    }

    #[test]
    fn tunnel_error_converts_into_tester_error() {
        let err: TesterError = TunnelError::StartFailed("port busy".to_string()).into();
        assert_eq!(err.to_string(), "failed to start tunnel: port busy");
    }

    #[test]
    fn tui_error_source_chain() {
        use std::error::Error;

        let io_err = std::io::Error::other("raw mode failed");
        let err = TuiError::TerminalInit(io_err);
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "failed to initialize terminal: raw mode failed"
        );
    }

    #[test]
    fn console_error_wraps_tui_error() {
        let err: ConsoleError = TuiError::Event("poll timeout".to_string()).into();
        assert_eq!(err.to_string(), "TUI error: event error: poll timeout");
    }
}
