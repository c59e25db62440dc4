//! Drives [`AppState`] against a terminal and the backend.
//!
//! [`perform`] executes one [`Effect`] and reports its outcome as an
//! [`ApiEvent`]. [`App::run`] owns the loop: draw, wait for the next event,
//! hand it to the state, and dispatch the resulting effects on spawned tasks.

use chrono::Utc;
use hookboard_client::{ApiClient, SessionEvent};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use super::app::{ApiEvent, AppState, Effect, EventHandler, LoginMode, TuiEvent};
use super::terminal::Tui;
use super::ui;
use crate::error::TuiError;

/// Capacity of the UI event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Performs a backend effect.
///
/// Returns `None` for effects that are not backend requests
/// ([`Effect::ToggleTunnel`] mutates the tester and is handled by the loop).
pub async fn perform(api: &ApiClient, effect: Effect) -> Option<ApiEvent> {
    let event = match effect {
        Effect::RestoreSession => ApiEvent::SessionRestored(api.profile().await),
        Effect::Authenticate {
            mode,
            email,
            password,
        } => {
            let result = match mode {
                LoginMode::SignIn => api.login(&email, password.expose()).await,
                LoginMode::Register => api.register(&email, password.expose()).await,
            };
            ApiEvent::Authenticated(result)
        }
        Effect::LoadDashboard(ticket) => ApiEvent::DashboardLoaded {
            ticket,
            result: api.list_subscriptions().await,
        },
        Effect::LoadTester(ticket) => ApiEvent::TesterLoaded {
            ticket,
            result: api.list_subscriptions().await,
        },
        Effect::CreateSubscription(request) => {
            ApiEvent::Created(api.create_subscription(&request).await)
        }
        Effect::CancelSubscription(id) => {
            ApiEvent::ActionSettled(api.cancel_subscription(&id).await.map(|_| ()))
        }
        Effect::DeleteSubscription(id) => {
            ApiEvent::ActionSettled(api.delete_subscription(&id).await)
        }
        Effect::LoadDetails { id, ticket } => ApiEvent::DetailsLoaded {
            ticket,
            result: api.subscription(&id).await,
        },
        Effect::FireTestEvent(prepared) => {
            let result = api
                .fire_test_event(
                    &prepared.subscription_id,
                    &prepared.event_type,
                    &prepared.payload,
                )
                .await;
            ApiEvent::TestFired {
                result,
                at: Utc::now(),
            }
        }
        Effect::ToggleTunnel => return None,
    };
    Some(event)
}

/// Forwards session notifications from the client into the UI channel.
///
/// Ends when either side closes. A lagged receiver only loses duplicates of
/// the same expiry, so lag is logged and skipped.
pub async fn forward_session_events(
    mut session_rx: broadcast::Receiver<SessionEvent>,
    event_tx: mpsc::Sender<TuiEvent>,
) {
    loop {
        match session_rx.recv().await {
            Ok(event) => {
                if event_tx.send(TuiEvent::Session(event)).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Session event receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// The interactive console application.
pub struct App {
    state: AppState,
    event_tx: mpsc::Sender<TuiEvent>,
    event_rx: mpsc::Receiver<TuiEvent>,
}

impl App {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state,
            event_tx,
            event_rx,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Runs until the user quits.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Render` if drawing fails and `TuiError::Event` if
    /// the input loop dies.
    pub async fn run(mut self, tui: &mut Tui) -> Result<(), TuiError> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handler = EventHandler::new(self.event_tx.clone(), shutdown_rx);
        let input_task = tokio::spawn(handler.run());
        let session_task = tokio::spawn(forward_session_events(
            self.state.auth.api().subscribe(),
            self.event_tx.clone(),
        ));

        let startup = self.state.start();
        self.dispatch(startup).await;

        let result = self.event_loop(tui).await;

        let _ = shutdown_tx.send(());
        session_task.abort();
        match input_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Input loop ended with an error"),
            Err(e) => warn!(error = %e, "Input task failed"),
        }
        info!("Console closed");
        result
    }

    async fn event_loop(&mut self, tui: &mut Tui) -> Result<(), TuiError> {
        loop {
            tui.draw(|frame| ui::render(frame, &self.state))?;

            let Some(event) = self.event_rx.recv().await else {
                return Err(TuiError::Event("event channel closed".to_string()));
            };
            let effects = self.state.handle_event(event);
            self.dispatch(effects).await;

            if self.state.should_quit {
                return Ok(());
            }
        }
    }

    async fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if effect == Effect::ToggleTunnel {
                if let Err(e) = self.state.tester.toggle_tunnel().await {
                    self.state.status = Some(e.to_string());
                }
                continue;
            }

            let api = self.state.auth.api().clone();
            let event_tx = self.event_tx.clone();
            tokio::spawn(async move {
                if let Some(event) = perform(&api, effect).await {
                    let _ = event_tx.send(TuiEvent::Api(event)).await;
                }
            });
        }
    }
}
