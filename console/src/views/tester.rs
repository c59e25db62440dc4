//! Manual webhook tester.
//!
//! Composes a synthetic event for one of the user's active subscriptions,
//! fires it at the public ingress endpoint and records the outcome in a
//! bounded, newest-first result log. Also hosts the tunnel control.

use chrono::{DateTime, Utc};
use hookboard_client::{ApiClient, RequestError, TestFireResponse, WebhookSubscription};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Loadable, Ticket, TicketCounter};
use crate::error::TesterError;
use crate::payloads::{sample_payload, DEFAULT_EVENT_TYPE, EVENT_TYPES};
use crate::results::{TestResult, TestResultLog};
use crate::tunnel::{StubTunnel, Tunnel, TunnelStatus};

/// A validated test fire, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSend {
    pub subscription_id: String,
    pub event_type: String,
    pub payload: Value,
}

/// State behind the tester screen.
#[derive(Debug)]
pub struct TesterView {
    subscriptions: Loadable<Vec<WebhookSubscription>>,
    list_tickets: TicketCounter,
    selected: Option<String>,
    event_type: String,
    custom_payload: String,
    results: TestResultLog,
    sending: bool,
    tunnel: Box<dyn Tunnel>,
    tunnel_error: Option<String>,
}

impl Default for TesterView {
    fn default() -> Self {
        Self::new()
    }
}

impl TesterView {
    /// Creates a tester backed by the stub tunnel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tunnel(Box::new(StubTunnel::new()))
    }

    /// Creates a tester with a specific tunnel implementation.
    #[must_use]
    pub fn with_tunnel(tunnel: Box<dyn Tunnel>) -> Self {
        Self {
            subscriptions: Loadable::Idle,
            list_tickets: TicketCounter::default(),
            selected: None,
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            custom_payload: String::new(),
            results: TestResultLog::new(),
            sending: false,
            tunnel,
            tunnel_error: None,
        }
    }

    /// Drops per-user state, e.g. after sign-out. The tunnel is kept.
    pub fn reset(&mut self) {
        self.subscriptions = Loadable::Idle;
        self.list_tickets.invalidate();
        self.selected = None;
        self.event_type = DEFAULT_EVENT_TYPE.to_string();
        self.custom_payload.clear();
        self.results.clear();
        self.sending = false;
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn subscriptions(&self) -> &Loadable<Vec<WebhookSubscription>> {
        &self.subscriptions
    }

    /// Active subscriptions available for testing.
    #[must_use]
    pub fn active_subscriptions(&self) -> &[WebhookSubscription] {
        match self.subscriptions.value() {
            Some(subscriptions) => subscriptions,
            None => &[],
        }
    }

    pub fn begin_load(&mut self) -> Ticket {
        if self.subscriptions.value().is_none() {
            self.subscriptions = Loadable::Loading;
        }
        self.list_tickets.issue()
    }

    /// Applies a list response, keeping only active subscriptions. A
    /// selection that is no longer offered is cleared.
    ///
    /// # Errors
    ///
    /// `Stale` for a superseded load, otherwise the request error (also kept
    /// as [`Loadable::Failed`]).
    pub fn finish_load(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<WebhookSubscription>, RequestError>,
    ) -> Result<usize, TesterError> {
        if !self.list_tickets.is_current(ticket) {
            debug!("Discarding superseded tester subscription list");
            return Err(TesterError::Stale);
        }

        match result {
            Ok(all) => {
                let active: Vec<_> = all.into_iter().filter(|s| s.is_active).collect();
                let still_offered = self
                    .selected
                    .as_ref()
                    .is_some_and(|id| active.iter().any(|s| &s.id == id));
                if !still_offered {
                    self.selected = None;
                }
                let count = active.len();
                self.subscriptions = Loadable::Loaded(active);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load subscriptions for tester");
                self.subscriptions = Loadable::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Fetches subscriptions, keeping the active ones.
    ///
    /// # Errors
    ///
    /// See [`TesterView::finish_load`].
    pub async fn load(&mut self, api: &ApiClient) -> Result<usize, TesterError> {
        let ticket = self.begin_load();
        let result = api.list_subscriptions().await;
        self.finish_load(ticket, result)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn selected_subscription(&self) -> Option<&WebhookSubscription> {
        let id = self.selected.as_deref()?;
        self.active_subscriptions().iter().find(|s| s.id == id)
    }

    /// Selects an active subscription.
    ///
    /// # Errors
    ///
    /// `UnknownSubscription` if `id` is not an active loaded subscription.
    pub fn select(&mut self, id: &str) -> Result<(), TesterError> {
        if !self.active_subscriptions().iter().any(|s| s.id == id) {
            return Err(TesterError::UnknownSubscription(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Moves the selection down, starting at the first subscription.
    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    /// Moves the selection up, starting at the last subscription.
    pub fn select_previous(&mut self) {
        self.step_selection(-1);
    }

    fn step_selection(&mut self, step: isize) {
        let subscriptions = self.active_subscriptions();
        let len = subscriptions.len();
        if len == 0 {
            return;
        }

        let current = self
            .selected
            .as_deref()
            .and_then(|id| subscriptions.iter().position(|s| s.id == id));
        let index = match current {
            Some(i) => (i as isize + step).rem_euclid(len as isize) as usize,
            None if step >= 0 => 0,
            None => len - 1,
        };
        self.selected = Some(subscriptions[index].id.clone());
    }

    // -------------------------------------------------------------------------
    // Event type and payload
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Sets the event type tag. Tags outside the offered list are allowed and
    /// use the generic sample.
    pub fn set_event_type(&mut self, tag: impl Into<String>) {
        self.event_type = tag.into();
    }

    pub fn next_event_type(&mut self) {
        self.step_event_type(1);
    }

    pub fn previous_event_type(&mut self) {
        self.step_event_type(-1);
    }

    fn step_event_type(&mut self, step: isize) {
        let len = EVENT_TYPES.len();
        let current = EVENT_TYPES
            .iter()
            .position(|option| option.tag == self.event_type);
        let index = match current {
            Some(i) => (i as isize + step).rem_euclid(len as isize) as usize,
            None if step >= 0 => 0,
            None => len - 1,
        };
        self.event_type = EVENT_TYPES[index].tag.to_string();
    }

    #[must_use]
    pub fn custom_payload(&self) -> &str {
        &self.custom_payload
    }

    pub fn set_custom_payload(&mut self, payload: impl Into<String>) {
        self.custom_payload = payload.into();
    }

    pub fn custom_payload_mut(&mut self) -> &mut String {
        &mut self.custom_payload
    }

    /// Payload that would be sent at `now`: the custom payload when it is not
    /// blank, otherwise the sample for the current event type.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a custom payload that is not JSON.
    pub fn build_payload(&self, now: DateTime<Utc>) -> Result<Value, serde_json::Error> {
        if self.custom_payload.trim().is_empty() {
            Ok(sample_payload(&self.event_type, now))
        } else {
            serde_json::from_str(&self.custom_payload)
        }
    }

    // -------------------------------------------------------------------------
    // Sending
    // -------------------------------------------------------------------------

    /// A test fire is in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    #[must_use]
    pub fn results(&self) -> &TestResultLog {
        &self.results
    }

    /// Validates and builds a test fire, marking it in flight.
    ///
    /// # Errors
    ///
    /// - `NoSubscriptionSelected`: nothing is recorded.
    /// - `SendInProgress`: nothing is recorded.
    /// - `InvalidPayload`: the parse failure has been recorded as a failed
    ///   result.
    pub fn begin_send(&mut self, now: DateTime<Utc>) -> Result<PreparedSend, TesterError> {
        let subscription_id = self
            .selected
            .clone()
            .ok_or(TesterError::NoSubscriptionSelected)?;
        if self.sending {
            return Err(TesterError::SendInProgress);
        }

        match self.build_payload(now) {
            Ok(payload) => {
                self.sending = true;
                Ok(PreparedSend {
                    subscription_id,
                    event_type: self.event_type.clone(),
                    payload,
                })
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Custom payload is not valid JSON");
                self.results.push(TestResult::failure(message.clone(), now));
                Err(TesterError::InvalidPayload(message))
            }
        }
    }

    /// Records the outcome of the in-flight test fire.
    pub fn finish_send(
        &mut self,
        result: Result<TestFireResponse, RequestError>,
        at: DateTime<Utc>,
    ) -> TestResult {
        self.sending = false;

        let entry = match result {
            Ok(response) => {
                let entry = TestResult::from_response(response, at);
                info!(
                    success = entry.success,
                    event_id = %entry.event_id,
                    "Test webhook sent"
                );
                entry
            }
            Err(e) => {
                warn!(error = %e, "Test webhook failed");
                TestResult::failure(e.to_string(), at)
            }
        };

        self.results.push(entry.clone());
        entry
    }

    /// Fires a test event for the selected subscription and records the
    /// outcome.
    ///
    /// # Errors
    ///
    /// See [`TesterView::begin_send`]. Transport failures are not errors here;
    /// they are recorded as failed results.
    pub async fn send(&mut self, api: &ApiClient) -> Result<TestResult, TesterError> {
        let prepared = self.begin_send(Utc::now())?;
        let result = api
            .fire_test_event(
                &prepared.subscription_id,
                &prepared.event_type,
                &prepared.payload,
            )
            .await;
        Ok(self.finish_send(result, Utc::now()))
    }

    /// URL test fires for the selected subscription are posted to.
    #[must_use]
    pub fn webhook_url(&self, api: &ApiClient) -> Option<String> {
        self.selected.as_deref().map(|id| api.webhook_url(id))
    }

    // -------------------------------------------------------------------------
    // Tunnel
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn tunnel_status(&self) -> TunnelStatus {
        let mut status = self.tunnel.status();
        if status.error.is_none() {
            status.error = self.tunnel_error.clone();
        }
        status
    }

    /// Starts the tunnel.
    ///
    /// # Errors
    ///
    /// Returns the tunnel error, also kept for display.
    pub async fn start_tunnel(&mut self) -> Result<TunnelStatus, TesterError> {
        match self.tunnel.start().await {
            Ok(status) => {
                self.tunnel_error = None;
                Ok(status)
            }
            Err(e) => {
                warn!(error = %e, "Tunnel failed to start");
                self.tunnel_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Stops the tunnel.
    ///
    /// # Errors
    ///
    /// Returns the tunnel error, also kept for display.
    pub async fn stop_tunnel(&mut self) -> Result<(), TesterError> {
        match self.tunnel.stop().await {
            Ok(()) => {
                self.tunnel_error = None;
                Ok(())
            }
            Err(e) => {
                self.tunnel_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Starts a stopped tunnel or stops a running one.
    ///
    /// # Errors
    ///
    /// See [`TesterView::start_tunnel`] and [`TesterView::stop_tunnel`].
    pub async fn toggle_tunnel(&mut self) -> Result<TunnelStatus, TesterError> {
        if self.tunnel.status().running {
            self.stop_tunnel().await?;
        } else {
            self.start_tunnel().await?;
        }
        Ok(self.tunnel_status())
    }
}
