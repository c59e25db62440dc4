//! Hookboard - terminal console for webhook subscriptions.
//!
//! Without a subcommand the interactive console starts. Every console
//! operation is also available as a one-shot subcommand for scripting.
//!
//! # Commands
//!
//! - `hookboard tui`: interactive dashboard and tester (default)
//! - `hookboard login` / `register` / `logout` / `whoami`: session management
//! - `hookboard list` / `show` / `create` / `cancel` / `delete`: subscriptions
//! - `hookboard test`: fire a test event at a subscription
//!
//! # Environment Variables
//!
//! See [`hookboard_client::config`] for available configuration options.

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hookboard_client::{
    ApiClient, AuthContext, AuthState, Config, FileSessionStore, WebhookSubscription,
};
use hookboard_console::payloads::{event_type_label, DEFAULT_EVENT_TYPE, EVENT_TYPES};
use hookboard_console::tui::{install_panic_hook, App, AppState, Tui};
use hookboard_console::views::{DashboardView, TesterView};

/// Log file written while the interactive console owns the terminal.
const TUI_LOG_FILE: &str = "hookboard.log";

/// Hookboard - manage and test webhook subscriptions from the terminal.
#[derive(Parser, Debug)]
#[command(name = "hookboard")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    HOOKBOARD_API_URL                  Backend URL (default: http://localhost:3000)
    HOOKBOARD_SESSION_DIR              Session directory (default: ~/.hookboard)
    HOOKBOARD_REQUEST_TIMEOUT_SECS     Per-request timeout (default: 30)
    HOOKBOARD_INTERCEPT_AUTH_ENDPOINTS Treat 401s from /auth/login and /auth/register
                                       as session expiry (default: true)
    RUST_LOG                           Log filter (default: info in the console,
                                       warn for other commands)

EXAMPLES:
    # Start the interactive console
    hookboard

    # Create an account and a subscription
    hookboard register --email a@b.com
    hookboard create --source-url https://src.example --callback-url https://cb.example

    # Fire a custom test event
    hookboard test sub_123 --payload '{\"foo\":1}'
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive console.
    Tui,

    /// Sign in and store the session.
    Login {
        #[arg(short, long)]
        email: String,

        /// Prompted for without echo when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and store the session.
    Register {
        #[arg(short, long)]
        email: String,

        /// Prompted for without echo when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// List subscriptions.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one subscription and its recorded events.
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Create a subscription.
    Create {
        #[arg(long)]
        source_url: String,

        #[arg(long)]
        callback_url: String,

        /// Generated by the backend when omitted.
        #[arg(long)]
        secret: Option<String>,
    },

    /// Cancel an active subscription.
    Cancel { id: String },

    /// Delete a cancelled subscription.
    Delete {
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Fire a test event at an active subscription.
    Test {
        id: String,

        /// One of the offered event types, or any custom tag.
        #[arg(short, long, default_value = DEFAULT_EVENT_TYPE)]
        event_type: String,

        /// JSON payload; a sample for the event type is used when omitted.
        #[arg(short, long)]
        payload: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List the offered event types.
    EventTypes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Command::Tui);
    if matches!(command, Command::EventTypes) {
        for option in EVENT_TYPES {
            println!("{:<22} {}", option.tag, option.label);
        }
        return Ok(());
    }

    let interactive = matches!(command, Command::Tui);
    if interactive {
        init_file_logging(&config)?;
    } else {
        init_logging("warn");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run(command, config))
}

async fn run(command: Command, config: Config) -> Result<()> {
    debug!(api_url = %config.api_url, "Configuration loaded");
    let store = Arc::new(FileSessionStore::new(&config.session_dir));
    let api = ApiClient::new(&config, store).context("Failed to create API client")?;
    let mut auth = AuthContext::new(api);

    match command {
        Command::Tui => run_tui(auth).await,
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let user = auth.login(&email, &password).await.context("Login failed")?;
            println!("Signed in as {}", user.email);
            Ok(())
        }
        Command::Register { email, password } => {
            let password = password_or_prompt(password)?;
            let user = auth
                .register(&email, &password)
                .await
                .context("Registration failed")?;
            println!("Account created. Signed in as {}", user.email);
            Ok(())
        }
        Command::Logout => {
            auth.logout();
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            match auth.restore().await {
                AuthState::Authenticated(user) => println!("{}", user.email),
                _ => println!("Not signed in."),
            }
            Ok(())
        }
        Command::List { json } => {
            require_session(&mut auth).await?;
            let mut dashboard = DashboardView::new();
            dashboard.load(auth.api()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(dashboard.subscription_list())?);
            } else {
                print_subscriptions(dashboard.subscription_list());
            }
            Ok(())
        }
        Command::Show { id, json } => {
            require_session(&mut auth).await?;
            let mut dashboard = DashboardView::new();
            dashboard.load(auth.api()).await?;
            dashboard.show_details(auth.api(), &id).await?;
            let Some(panel) = dashboard.details() else {
                bail!("Subscription {id} is no longer available");
            };
            let events = panel.events.value().map_or(&[][..], Vec::as_slice);
            if json {
                let value = serde_json::json!({
                    "subscription": panel.subscription,
                    "events": events,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_subscriptions(std::slice::from_ref(&panel.subscription));
                println!();
                println!("Webhook URL: {}", auth.api().webhook_url(&id));
                println!("Events: {}", events.len());
                for event in events {
                    let status = match (&event.processing_error, event.processed) {
                        (Some(error), _) => format!("failed: {error}"),
                        (None, true) => "processed".to_string(),
                        (None, false) => "pending".to_string(),
                    };
                    println!(
                        "  {}  {:<20} {} (retries: {})",
                        event.created_at.format("%Y-%m-%d %H:%M:%S"),
                        event.event_type,
                        status,
                        event.retry_count
                    );
                }
            }
            Ok(())
        }
        Command::Create {
            source_url,
            callback_url,
            secret,
        } => {
            require_session(&mut auth).await?;
            let mut dashboard = DashboardView::new();
            dashboard.open_create_form();
            if let Some(form) = dashboard.create_form_mut() {
                form.source_url = source_url;
                form.callback_url = callback_url;
                form.secret = secret.unwrap_or_default();
            }
            let created = dashboard.submit_create(auth.api()).await?;
            println!("Created subscription {}", created.id);
            if let Some(secret) = &created.secret {
                println!("Secret: {secret}");
            }
            println!("Webhook URL: {}", auth.api().webhook_url(&created.id));
            Ok(())
        }
        Command::Cancel { id } => {
            require_session(&mut auth).await?;
            let mut dashboard = DashboardView::new();
            dashboard.load(auth.api()).await?;
            dashboard.cancel(auth.api(), &id).await?;
            println!("Cancelled subscription {id}");
            Ok(())
        }
        Command::Delete { id, yes } => {
            require_session(&mut auth).await?;
            let mut dashboard = DashboardView::new();
            dashboard.load(auth.api()).await?;
            dashboard.request_delete(&id)?;

            if !yes && !confirm("Are you sure you want to delete this subscription?")? {
                dashboard.decline_delete();
                eprintln!("Aborted.");
                return Ok(());
            }
            dashboard.confirm_delete(auth.api()).await?;
            println!("Deleted subscription {id}");
            Ok(())
        }
        Command::Test {
            id,
            event_type,
            payload,
            json,
        } => {
            require_session(&mut auth).await?;
            let mut tester = TesterView::new();
            tester.load(auth.api()).await?;
            tester.select(&id)?;
            tester.set_event_type(event_type);
            if let Some(payload) = payload {
                tester.set_custom_payload(payload);
            }
            let result = tester.send(auth.api()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.success {
                println!(
                    "Sent {} ({}) - Event ID: {}",
                    event_type_label(tester.event_type()),
                    tester.event_type(),
                    result.event_id
                );
            }
            if !result.success {
                bail!(
                    "{}",
                    result.error.as_deref().unwrap_or("Failed to send webhook")
                );
            }
            Ok(())
        }
        Command::EventTypes => Ok(()),
    }
}

/// Runs the interactive console until the user quits.
async fn run_tui(auth: AuthContext) -> Result<()> {
    info!("Starting Hookboard console");
    install_panic_hook();

    let app = App::new(AppState::new(auth));
    let mut tui = Tui::new().context("Failed to initialize terminal")?;
    let result = app.run(&mut tui).await;
    tui.restore().context("Failed to restore terminal")?;
    result.context("Console exited with an error")
}

/// Restores the stored session, failing if there is none.
async fn require_session(auth: &mut AuthContext) -> Result<()> {
    if auth.restore().await == &AuthState::Unauthenticated {
        bail!("Not signed in. Run 'hookboard login' first.");
    }
    Ok(())
}

fn print_subscriptions(subscriptions: &[WebhookSubscription]) {
    if subscriptions.is_empty() {
        println!("No subscriptions yet.");
        return;
    }
    println!(
        "{:<28} {:<9} {:>7}  {:<10}  SOURCE -> CALLBACK",
        "ID", "STATUS", "EVENTS", "CREATED"
    );
    for s in subscriptions {
        println!(
            "{:<28} {:<9} {:>7}  {:<10}  {} -> {}",
            s.id,
            if s.is_active { "active" } else { "inactive" },
            s.event_count(),
            s.created_at.format("%Y-%m-%d"),
            s.source_url,
            s.callback_url
        );
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;

    let password = if io::stdin().is_terminal() {
        let entered = read_hidden_line()?;
        eprintln!();
        match entered {
            Some(password) => password,
            None => bail!("Cancelled"),
        }
    } else {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        input.trim_end_matches(['\r', '\n']).to_string()
    };

    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

/// Outcome of one key press at the hidden prompt.
#[derive(Debug, PartialEq, Eq)]
enum PromptKey {
    Continue,
    Submit,
    Abort,
}

fn apply_prompt_key(buffer: &mut String, key: KeyEvent) -> PromptKey {
    if key.kind != KeyEventKind::Press {
        return PromptKey::Continue;
    }
    match key.code {
        KeyCode::Enter => PromptKey::Submit,
        KeyCode::Esc => PromptKey::Abort,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => PromptKey::Abort,
        KeyCode::Backspace => {
            buffer.pop();
            PromptKey::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            PromptKey::Continue
        }
        _ => PromptKey::Continue,
    }
}

/// Keeps the terminal in raw mode, so typed characters are not echoed.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a line without echo. `None` when the user aborts with Esc or Ctrl+C.
fn read_hidden_line() -> Result<Option<String>> {
    let _raw = RawModeGuard::enable().context("Failed to disable terminal echo")?;
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read().context("Failed to read from terminal")? {
            match apply_prompt_key(&mut buffer, key) {
                PromptKey::Continue => {}
                PromptKey::Submit => return Ok(Some(buffer)),
                PromptKey::Abort => return Ok(None),
            }
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Logs to stderr, for one-shot commands.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}

/// Logs to a file in the session directory; the terminal belongs to the UI.
fn init_file_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.session_dir).with_context(|| {
        format!(
            "Failed to create session directory {}",
            config.session_dir.display()
        )
    })?;
    let path = config.session_dir.join(TUI_LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
