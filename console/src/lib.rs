//! Hookboard Console - terminal dashboard and tester for webhook subscriptions.
//!
//! Built on [`hookboard_client`]: this crate holds the view state for the
//! subscription dashboard and the manual tester, and the interactive terminal
//! interface that drives them. The `hookboard` binary also exposes every
//! operation as a one-shot subcommand.
//!
//! # Views
//!
//! Views are plain state machines. Each backend operation is split into a
//! synchronous `begin_*` step, the request itself, and a synchronous
//! `finish_*` step that applies the response. An async convenience method
//! chains the three for one-shot callers; the TUI performs the request on a
//! spawned task instead and feeds the response back through its event loop.
//! Responses to a superseded request are recognised by their [`views::Ticket`]
//! and dropped.
//!
//! # Modules
//!
//! - [`error`]: Error types for console operations
//! - [`payloads`]: Event type catalogue and sample payloads
//! - [`results`]: Bounded log of test fire outcomes
//! - [`tunnel`]: Public tunnel collaborator
//! - [`views`]: Dashboard and tester view state
//! - [`tui`]: Interactive terminal interface

pub mod error;
pub mod payloads;
pub mod results;
pub mod tui;
pub mod tunnel;
pub mod views;

pub use error::{ConsoleError, DashboardError, TesterError, TuiError, TunnelError};
pub use payloads::{sample_payload, EventTypeOption, DEFAULT_EVENT_TYPE, EVENT_TYPES};
pub use results::{TestResult, TestResultLog, MAX_TEST_RESULTS};
pub use tunnel::{StubTunnel, Tunnel, TunnelStatus};
pub use views::{DashboardView, Loadable, PendingAction, TesterView, Ticket};
