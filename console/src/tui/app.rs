//! Application state and event management for the Hookboard console TUI.
//!
//! The main types are:
//!
//! - [`AppState`]: screens, forms and views; turns events into [`Effect`]s
//! - [`Screen`]: which screen is displayed
//! - [`TuiEvent`]: everything that can wake the UI loop
//! - [`Effect`]: a backend request the loop must perform on the state's behalf
//! - [`EventHandler`]: async loop multiplexing terminal input and ticks
//!
//! # Architecture
//!
//! State changes only happen in [`AppState::handle_event`]. Key presses and
//! backend responses both arrive as [`TuiEvent`]s; handling one may return
//! effects, which the runner performs on spawned tasks and feeds back as
//! [`TuiEvent::Api`]. This keeps every transition synchronous and testable
//! without a terminal or a network.
//!
//! ```text
//! EventHandler --Key/Tick--> AppState::handle_event --Effect--> runner
//!      ^                                ^                          |
//!      |                                +-------- Api(ApiEvent) ---+
//! ```

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hookboard_client::{
    AuthContext, AuthResponse, NewSubscription, RequestError, SessionEvent, SubscriptionDetail,
    TestFireResponse, User, WebhookSubscription,
};
use ratatui::style::{Color, Modifier, Style};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::TesterError;
use crate::views::{DashboardView, PreparedSend, TesterView, Ticket};

// =============================================================================
// Screens and forms
// =============================================================================

/// Current screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// A stored session is being checked.
    #[default]
    Loading,
    /// Sign in or register.
    Login,
    /// Subscription management.
    Dashboard,
    /// Manual test fires.
    Tester,
}

/// Whether the login form signs in or creates an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    Register,
}

impl LoginMode {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::SignIn => Self::Register,
            Self::Register => Self::SignIn,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in to your account",
            Self::Register => "Create your account",
        }
    }

    #[must_use]
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::Register => "Sign up",
        }
    }
}

/// Focusable field of the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Email => Self::Password,
            Self::Password => Self::Email,
        }
    }
}

/// A password that never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// State of the login form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: Password,
    pub mode: LoginMode,
    pub focused: LoginField,
    /// A credential request is in flight.
    pub submitting: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn push_char(&mut self, c: char) {
        match self.focused {
            LoginField::Email => self.email.push(c),
            LoginField::Password => self.password.0.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focused {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.0.pop();
            }
        }
    }

    /// Checks that both fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns the message to show on the form.
    pub fn validate(&self) -> Result<(), String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        if !email.contains('@') {
            return Err("Enter a valid email address".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Theme and Symbols
// =============================================================================

/// Color theme for the console.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub border: Style,
    pub border_focused: Style,
    pub text_primary: Style,
    pub text_secondary: Style,
    pub text_muted: Style,
    pub label: Style,
    pub input_focused: Style,
    pub input_unfocused: Style,
    pub input_error: Style,
    pub status_active: Style,
    pub status_inactive: Style,
    pub success: Style,
    pub failure: Style,
    pub pending: Style,
    pub selected: Style,
    pub key_hint: Style,
    pub tab_active: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            text_primary: Style::default(),
            text_secondary: Style::default().fg(Color::Gray),
            text_muted: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::White),
            input_focused: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            input_unfocused: Style::default().fg(Color::Gray),
            input_error: Style::default().fg(Color::Red),
            status_active: Style::default().fg(Color::Green),
            status_inactive: Style::default().fg(Color::Red),
            success: Style::default().fg(Color::Green),
            failure: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            pending: Style::default().fg(Color::Yellow),
            selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            key_hint: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        }
    }
}

impl Theme {
    /// Theme using modifiers only, for `NO_COLOR`.
    #[must_use]
    pub fn monochrome() -> Self {
        Self {
            title: Style::default().add_modifier(Modifier::BOLD),
            border: Style::default(),
            border_focused: Style::default().add_modifier(Modifier::BOLD),
            text_primary: Style::default(),
            text_secondary: Style::default().add_modifier(Modifier::DIM),
            text_muted: Style::default().add_modifier(Modifier::DIM),
            label: Style::default(),
            input_focused: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            input_unfocused: Style::default().add_modifier(Modifier::DIM),
            input_error: Style::default().add_modifier(Modifier::BOLD),
            status_active: Style::default().add_modifier(Modifier::BOLD),
            status_inactive: Style::default().add_modifier(Modifier::DIM),
            success: Style::default().add_modifier(Modifier::BOLD),
            failure: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            pending: Style::default().add_modifier(Modifier::ITALIC),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            key_hint: Style::default().add_modifier(Modifier::BOLD),
            tab_active: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        }
    }

    /// [`Theme::monochrome`] when `NO_COLOR` is set, the default otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        if std::env::var("NO_COLOR").is_ok() {
            Self::monochrome()
        } else {
            Self::default()
        }
    }
}

/// Symbol set for the TUI (unicode or ASCII).
#[derive(Debug, Clone, Copy)]
pub struct Symbols {
    pub active: &'static str,
    pub inactive: &'static str,
    pub pending: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
    pub arrow: &'static str,
    pub bullet: &'static str,
}

pub const UNICODE_SYMBOLS: Symbols = Symbols {
    active: "●",
    inactive: "○",
    pending: "◔",
    success: "✓",
    failure: "✗",
    arrow: "→",
    bullet: "•",
};

pub const ASCII_SYMBOLS: Symbols = Symbols {
    active: "[*]",
    inactive: "[ ]",
    pending: "[.]",
    success: "[+]",
    failure: "[x]",
    arrow: "->",
    bullet: "*",
};

impl Symbols {
    /// ASCII on the Linux console and VT100, unicode elsewhere.
    #[must_use]
    pub fn detect() -> Self {
        if std::env::var("TERM")
            .map(|t| t.contains("linux") || t.contains("vt100"))
            .unwrap_or(false)
        {
            ASCII_SYMBOLS
        } else {
            UNICODE_SYMBOLS
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::detect()
    }
}

// =============================================================================
// Events and effects
// =============================================================================

/// A backend request the UI loop performs for the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RestoreSession,
    Authenticate {
        mode: LoginMode,
        email: String,
        password: Password,
    },
    LoadDashboard(Ticket),
    LoadTester(Ticket),
    CreateSubscription(NewSubscription),
    CancelSubscription(String),
    DeleteSubscription(String),
    LoadDetails {
        id: String,
        ticket: Ticket,
    },
    FireTestEvent(PreparedSend),
    ToggleTunnel,
}

/// The settled outcome of an [`Effect`].
#[derive(Debug)]
pub enum ApiEvent {
    SessionRestored(Result<User, RequestError>),
    Authenticated(Result<AuthResponse, RequestError>),
    DashboardLoaded {
        ticket: Ticket,
        result: Result<Vec<WebhookSubscription>, RequestError>,
    },
    TesterLoaded {
        ticket: Ticket,
        result: Result<Vec<WebhookSubscription>, RequestError>,
    },
    Created(Result<WebhookSubscription, RequestError>),
    ActionSettled(Result<(), RequestError>),
    DetailsLoaded {
        ticket: Ticket,
        result: Result<SubscriptionDetail, RequestError>,
    },
    TestFired {
        result: Result<TestFireResponse, RequestError>,
        at: DateTime<Utc>,
    },
}

/// Events that drive the TUI loop.
#[derive(Debug)]
pub enum TuiEvent {
    /// Periodic tick; triggers a redraw.
    Tick,
    /// Key press.
    Key(KeyEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Session notification from the API client.
    Session(SessionEvent),
    /// A backend request settled.
    Api(ApiEvent),
}

/// Notice shown on the login screen after a 401 ends the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

// =============================================================================
// Application state
// =============================================================================

/// Everything the console renders, plus the transitions between screens.
pub struct AppState {
    pub screen: Screen,
    pub auth: AuthContext,
    pub login: LoginForm,
    pub dashboard: DashboardView,
    pub tester: TesterView,
    /// Keys go to the custom payload editor.
    pub editing_payload: bool,
    /// One-line message for the footer, cleared on the next key press.
    pub status: Option<String>,
    pub should_quit: bool,
    pub theme: Theme,
    pub symbols: Symbols,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("screen", &self.screen)
            .field("auth", self.auth.state())
            .field("editing_payload", &self.editing_payload)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates state around an auth context, with the stub tunnel.
    #[must_use]
    pub fn new(auth: AuthContext) -> Self {
        Self::with_tester(auth, TesterView::new())
    }

    /// Creates state with a preconfigured tester (e.g. a real tunnel).
    #[must_use]
    pub fn with_tester(auth: AuthContext, tester: TesterView) -> Self {
        Self {
            screen: Screen::Loading,
            auth,
            login: LoginForm::default(),
            dashboard: DashboardView::new(),
            tester,
            editing_payload: false,
            status: None,
            should_quit: false,
            theme: Theme::from_env(),
            symbols: Symbols::detect(),
        }
    }

    /// Starts the session restore.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.auth.begin_restore() {
            self.screen = Screen::Loading;
            vec![Effect::RestoreSession]
        } else {
            self.show_login(None);
            Vec::new()
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Email of the signed-in user.
    #[must_use]
    pub fn user_email(&self) -> Option<&str> {
        self.auth.user().map(|u| u.email.as_str())
    }

    /// Applies one event and returns the requests it triggers.
    pub fn handle_event(&mut self, event: TuiEvent) -> Vec<Effect> {
        match event {
            TuiEvent::Tick | TuiEvent::Resize(..) => Vec::new(),
            TuiEvent::Key(key) => self.handle_key(key),
            TuiEvent::Session(event) => {
                let was_signed_in = self.auth.is_authenticated();
                self.auth.handle_session_event(&event);
                if was_signed_in {
                    self.reset_views();
                    self.show_login(Some(SESSION_EXPIRED_MESSAGE.to_string()));
                }
                Vec::new()
            }
            TuiEvent::Api(event) => self.apply(event),
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn show_login(&mut self, error: Option<String>) {
        let email = std::mem::take(&mut self.login.email);
        self.login = LoginForm {
            email,
            error,
            ..LoginForm::default()
        };
        self.editing_payload = false;
        self.screen = Screen::Login;
    }

    fn enter_dashboard(&mut self) -> Vec<Effect> {
        self.screen = Screen::Dashboard;
        vec![Effect::LoadDashboard(self.dashboard.begin_load())]
    }

    fn enter_tester(&mut self) -> Vec<Effect> {
        self.screen = Screen::Tester;
        vec![Effect::LoadTester(self.tester.begin_load())]
    }

    fn reset_views(&mut self) {
        self.dashboard.reset();
        self.tester.reset();
        self.editing_payload = false;
    }

    fn logout(&mut self) {
        self.auth.logout();
        self.reset_views();
        self.show_login(None);
    }

    // -------------------------------------------------------------------------
    // Backend responses
    // -------------------------------------------------------------------------

    fn apply(&mut self, event: ApiEvent) -> Vec<Effect> {
        match event {
            ApiEvent::SessionRestored(result) => {
                self.auth.complete_restore(result);
                if self.auth.is_authenticated() {
                    self.enter_dashboard()
                } else {
                    self.show_login(None);
                    Vec::new()
                }
            }
            ApiEvent::Authenticated(result) => {
                self.login.submitting = false;
                let outcome = result
                    .map_err(|e| e.to_string())
                    .and_then(|response| {
                        self.auth
                            .establish(response)
                            .map(|_| ())
                            .map_err(|e| e.to_string())
                    });
                match outcome {
                    Ok(()) => {
                        self.login.password = Password::default();
                        self.login.error = None;
                        self.enter_dashboard()
                    }
                    Err(message) => {
                        self.login.error = Some(message);
                        Vec::new()
                    }
                }
            }
            _ if !self.auth.is_authenticated() => {
                debug!("Ignoring response that arrived after sign-out");
                Vec::new()
            }
            ApiEvent::DashboardLoaded { ticket, result } => {
                let _ = self.dashboard.finish_load(ticket, result);
                Vec::new()
            }
            ApiEvent::TesterLoaded { ticket, result } => {
                let _ = self.tester.finish_load(ticket, result);
                Vec::new()
            }
            ApiEvent::Created(result) => {
                let _ = self.dashboard.finish_create(result);
                vec![Effect::LoadDashboard(self.dashboard.begin_load())]
            }
            ApiEvent::ActionSettled(result) => {
                let _ = self.dashboard.finish_action(result);
                vec![Effect::LoadDashboard(self.dashboard.begin_load())]
            }
            ApiEvent::DetailsLoaded { ticket, result } => {
                let _ = self.dashboard.finish_details(ticket, result);
                Vec::new()
            }
            ApiEvent::TestFired { result, at } => {
                self.tester.finish_send(result, at);
                Vec::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Key handling
    // -------------------------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return Vec::new();
        }
        self.status = None;

        match self.screen {
            Screen::Loading => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.quit();
                }
                Vec::new()
            }
            Screen::Login => self.handle_login_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Tester => self.handle_tester_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let form = &mut self.login;
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.mode = form.mode.toggle();
                form.error = None;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focused = form.focused.toggle();
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push_char(c),
            KeyCode::Enter => {
                if form.submitting {
                    return Vec::new();
                }
                if let Err(message) = form.validate() {
                    form.error = Some(message);
                    return Vec::new();
                }
                form.submitting = true;
                form.error = None;
                return vec![Effect::Authenticate {
                    mode: form.mode,
                    email: form.email.trim().to_string(),
                    password: form.password.clone(),
                }];
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if self.dashboard.pending_confirmation().is_some() {
            return self.handle_confirm_key(key);
        }
        if self.dashboard.create_form().is_some() {
            return self.handle_create_form_key(key);
        }

        let selected_id = self.dashboard.selected_subscription().map(|s| s.id.clone());
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Tab => return self.enter_tester(),
            KeyCode::Char('L') => self.logout(),
            KeyCode::Down | KeyCode::Char('j') => self.dashboard.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.dashboard.select_previous(),
            KeyCode::Char('r') => return vec![Effect::LoadDashboard(self.dashboard.begin_load())],
            KeyCode::Char('n') => self.dashboard.open_create_form(),
            KeyCode::Esc => {
                if self.dashboard.details().is_some() {
                    self.dashboard.close_details();
                }
            }
            KeyCode::Enter => {
                if let Some(id) = selected_id {
                    match self.dashboard.open_details(&id) {
                        Ok(ticket) => return vec![Effect::LoadDetails { id, ticket }],
                        Err(e) => self.status = Some(e.to_string()),
                    }
                }
            }
            KeyCode::Char('c') => {
                if let Some(id) = selected_id {
                    match self.dashboard.begin_cancel(&id) {
                        Ok(()) => return vec![Effect::CancelSubscription(id)],
                        Err(e) => self.status = Some(e.to_string()),
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected_id {
                    if let Err(e) = self.dashboard.request_delete(&id) {
                        self.status = Some(e.to_string());
                    }
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => match self.dashboard.begin_delete() {
                Ok(id) => vec![Effect::DeleteSubscription(id)],
                Err(e) => {
                    self.status = Some(e.to_string());
                    Vec::new()
                }
            },
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.dashboard.decline_delete();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_create_form_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => {
                if !self.dashboard.close_create_form() {
                    self.status = Some("Creating subscription...".to_string());
                }
            }
            KeyCode::Enter => {
                if let Ok(request) = self.dashboard.begin_create() {
                    return vec![Effect::CreateSubscription(request)];
                }
            }
            code => {
                if let Some(form) = self.dashboard.create_form_mut() {
                    if form.submitting {
                        return Vec::new();
                    }
                    match code {
                        KeyCode::Tab | KeyCode::Down => form.focused = form.focused.next(),
                        KeyCode::BackTab | KeyCode::Up => form.focused = form.focused.previous(),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c) => form.push_char(c),
                        _ => {}
                    }
                }
            }
        }
        Vec::new()
    }

    fn handle_tester_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if self.editing_payload {
            return self.handle_payload_key(key);
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Tab => return self.enter_dashboard(),
            KeyCode::Char('L') => self.logout(),
            KeyCode::Down | KeyCode::Char('j') => self.tester.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.tester.select_previous(),
            KeyCode::Right | KeyCode::Char('l') => self.tester.next_event_type(),
            KeyCode::Left | KeyCode::Char('h') => self.tester.previous_event_type(),
            KeyCode::Char('e') => self.editing_payload = true,
            KeyCode::Char('x') => self.tester.custom_payload_mut().clear(),
            KeyCode::Char('t') => return vec![Effect::ToggleTunnel],
            KeyCode::Char('r') => return vec![Effect::LoadTester(self.tester.begin_load())],
            KeyCode::Enter | KeyCode::Char('s') => return self.send_test(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_payload_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return self.send_test();
        }

        let payload = self.tester.custom_payload_mut();
        match key.code {
            KeyCode::Esc => self.editing_payload = false,
            KeyCode::Enter => payload.push('\n'),
            KeyCode::Tab => payload.push_str("  "),
            KeyCode::Backspace => {
                payload.pop();
            }
            KeyCode::Char(c) => payload.push(c),
            _ => {}
        }
        Vec::new()
    }

    fn send_test(&mut self) -> Vec<Effect> {
        match self.tester.begin_send(Utc::now()) {
            Ok(prepared) => vec![Effect::FireTestEvent(prepared)],
            Err(TesterError::NoSubscriptionSelected) => {
                self.status = Some("Please select a subscription".to_string());
                Vec::new()
            }
            Err(e) => {
                debug!(error = %e, "Test send not started");
                Vec::new()
            }
        }
    }
}

// =============================================================================
// Event handler
// =============================================================================

/// Tick interval for redraws.
pub const DEFAULT_TICK_RATE_MS: u64 = 250;

/// Timeout for a single terminal poll.
const POLL_TIMEOUT_MS: u64 = 10;

/// Polls terminal input and generates ticks until shut down.
///
/// Terminal polling runs on `spawn_blocking` so the runtime is never blocked
/// by crossterm.
#[derive(Debug)]
pub struct EventHandler {
    event_tx: mpsc::Sender<TuiEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(event_tx: mpsc::Sender<TuiEvent>, shutdown_rx: oneshot::Receiver<()>) -> Self {
        Self::with_tick_rate(
            event_tx,
            shutdown_rx,
            Duration::from_millis(DEFAULT_TICK_RATE_MS),
        )
    }

    pub fn with_tick_rate(
        event_tx: mpsc::Sender<TuiEvent>,
        shutdown_rx: oneshot::Receiver<()>,
        tick_rate: Duration,
    ) -> Self {
        Self {
            event_tx,
            shutdown_rx,
            tick_rate,
        }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Runs until the shutdown signal fires or the receiver is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the polling task panics.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut tick_interval = tokio::time::interval(self.tick_rate);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tick_interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    debug!("EventHandler received shutdown signal");
                    break;
                }

                _ = tick_interval.tick() => {
                    if self.event_tx.send(TuiEvent::Tick).await.is_err() {
                        debug!("Event receiver dropped, exiting event loop");
                        break;
                    }
                }

                result = async {
                    tokio::time::sleep(Duration::from_millis(POLL_TIMEOUT_MS)).await;
                    tokio::task::spawn_blocking(|| {
                        Self::poll_terminal_event(Duration::from_millis(POLL_TIMEOUT_MS))
                    }).await
                } => {
                    match result {
                        Ok(Some(event)) => {
                            if self.event_tx.send(event).await.is_err() {
                                debug!("Event receiver dropped, exiting event loop");
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(join_error) => {
                            tracing::error!("spawn_blocking task panicked: {}", join_error);
                            return Err(std::io::Error::other("Terminal polling task panicked"));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Polls once. Failures (e.g. no terminal in tests) count as no event.
    fn poll_terminal_event(timeout: Duration) -> Option<TuiEvent> {
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(crossterm_event) => Self::convert_crossterm_event(crossterm_event),
                Err(e) => {
                    tracing::trace!("Failed to read terminal event: {}", e);
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::trace!("Failed to poll terminal: {}", e);
                None
            }
        }
    }

    fn convert_crossterm_event(event: CrosstermEvent) -> Option<TuiEvent> {
        match event {
            CrosstermEvent::Key(key_event) => Some(TuiEvent::Key(key_event)),
            CrosstermEvent::Resize(cols, rows) => Some(TuiEvent::Resize(cols, rows)),
            CrosstermEvent::Mouse(_)
            | CrosstermEvent::FocusGained
            | CrosstermEvent::FocusLost
            | CrosstermEvent::Paste(_) => None,
        }
    }
}
