//! Interactive terminal interface.
//!
//! - [`app`]: state, key handling and the input event loop
//! - [`runner`]: effect execution and the draw loop
//! - [`terminal`]: terminal setup and restoration
//! - [`ui`]: screen composition
//! - [`widgets`]: drawing primitives

pub mod app;
pub mod runner;
pub mod terminal;
pub mod ui;
pub mod widgets;

pub use app::{
    ApiEvent, AppState, Effect, EventHandler, LoginField, LoginForm, LoginMode, Password, Screen,
    Symbols, Theme, TuiEvent,
};
pub use runner::{forward_session_events, perform, App};
pub use terminal::{install_panic_hook, Tui};
