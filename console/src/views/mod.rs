//! View models for the console screens.
//!
//! Views own the state a screen renders and expose each user action as a
//! pair of synchronous steps (`begin_*` validates and marks the action
//! pending, `finish_*` applies the backend's answer) plus an async
//! convenience that runs both around the [`ApiClient`](hookboard_client::ApiClient)
//! call. The TUI drives the split form so requests can run on spawned tasks;
//! the CLI and tests use the async form.
//!
//! - [`dashboard`]: subscription list, create form, cancel/delete, details panel
//! - [`tester`]: test fire composer, result log, tunnel control

pub mod dashboard;
pub mod tester;

pub use dashboard::{CreateField, CreateForm, DashboardView, DetailsPanel, PendingAction};
pub use tester::{PreparedSend, TesterView};

/// Outcome of a data load, kept as an explicit value instead of being
/// swallowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Loadable<T> {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// First request in flight.
    Loading,
    /// Last request succeeded.
    Loaded(T),
    /// Last request failed with this message.
    Failed(String),
}

impl<T> Loadable<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The loaded value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one issued request so a late response can be recognised as
/// superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Issues [`Ticket`]s; only the most recently issued one is current.
#[derive(Debug, Clone, Default)]
pub struct TicketCounter {
    issued: u64,
}

impl TicketCounter {
    /// Issues a new ticket, superseding every earlier one.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Supersedes every outstanding ticket without issuing a new one.
    pub fn invalidate(&mut self) {
        self.issued += 1;
    }

    /// True if `ticket` is the latest one issued.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }
}
