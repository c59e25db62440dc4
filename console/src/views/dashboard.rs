//! Subscription dashboard.
//!
//! Holds the user's subscription list and drives every mutation on it:
//! create (through a form), cancel, confirmed delete, and a details panel that
//! fetches a subscription's recent events. Each mutation reloads the whole
//! list once it settles, successful or not.
//!
//! Action gating follows `isActive`: cancel is only offered for active
//! subscriptions and delete only for inactive ones.

use hookboard_client::{
    ApiClient, NewSubscription, RequestError, SubscriptionDetail, WebhookEvent,
    WebhookSubscription,
};
use tracing::{debug, info, warn};
use url::Url;

use super::{Loadable, Ticket, TicketCounter};
use crate::error::DashboardError;

// =============================================================================
// Create form
// =============================================================================

/// Focusable field of the create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
    #[default]
    SourceUrl,
    CallbackUrl,
    Secret,
}

impl CreateField {
    /// Next field in tab order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::SourceUrl => Self::CallbackUrl,
            Self::CallbackUrl => Self::Secret,
            Self::Secret => Self::SourceUrl,
        }
    }

    /// Previous field in tab order, wrapping around.
    #[must_use]
    pub fn previous(self) -> Self {
        match self {
            Self::SourceUrl => Self::Secret,
            Self::CallbackUrl => Self::SourceUrl,
            Self::Secret => Self::CallbackUrl,
        }
    }
}

/// State of the "new subscription" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub source_url: String,
    pub callback_url: String,
    /// Left blank to have the backend generate one.
    pub secret: String,
    pub focused: CreateField,
    /// A create request is in flight; submit is disabled.
    pub submitting: bool,
    /// Validation or backend error from the last submit.
    pub error: Option<String>,
}

impl CreateForm {
    /// Mutable access to the text of `field`.
    pub fn field_mut(&mut self, field: CreateField) -> &mut String {
        match field {
            CreateField::SourceUrl => &mut self.source_url,
            CreateField::CallbackUrl => &mut self.callback_url,
            CreateField::Secret => &mut self.secret,
        }
    }

    /// Appends a character to the focused field.
    pub fn push_char(&mut self, c: char) {
        let field = self.focused;
        self.field_mut(field).push(c);
    }

    /// Removes the last character of the focused field.
    pub fn backspace(&mut self) {
        let field = self.focused;
        self.field_mut(field).pop();
    }

    /// Validates the form into a create request.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Invalid` if either URL is missing or is not an
    /// http(s) URL.
    pub fn validate(&self) -> Result<NewSubscription, DashboardError> {
        validate_url("source URL", &self.source_url)?;
        validate_url("callback URL", &self.callback_url)?;
        Ok(NewSubscription::new(
            self.source_url.as_str(),
            self.callback_url.as_str(),
            Some(self.secret.as_str()),
        ))
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<(), DashboardError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DashboardError::Invalid {
            field,
            message: "is required".to_string(),
        });
    }
    let url = Url::parse(value).map_err(|e| DashboardError::Invalid {
        field,
        message: format!("is not a valid URL ({e})"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DashboardError::Invalid {
            field,
            message: "must start with http:// or https://".to_string(),
        });
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(DashboardError::Invalid {
            field,
            message: "must include a host".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Actions and details
// =============================================================================

/// A mutation in flight against one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Cancel(String),
    Delete(String),
}

impl PendingAction {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Cancel(id) | Self::Delete(id) => id,
        }
    }

    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Cancel(_) => "cancel",
            Self::Delete(_) => "delete",
        }
    }
}

/// Details panel for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsPanel {
    /// Snapshot from the list, replaced by the fetched copy once loaded.
    pub subscription: WebhookSubscription,
    pub events: Loadable<Vec<WebhookEvent>>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// State behind the dashboard screen.
#[derive(Debug, Default)]
pub struct DashboardView {
    subscriptions: Loadable<Vec<WebhookSubscription>>,
    refreshing: bool,
    list_tickets: TicketCounter,
    selected: usize,
    create_form: Option<CreateForm>,
    pending: Option<PendingAction>,
    confirm_delete: Option<String>,
    details: Option<DetailsPanel>,
    details_tickets: TicketCounter,
    notice: Option<String>,
}

impl DashboardView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all state, e.g. after sign-out. Outstanding responses become
    /// stale.
    pub fn reset(&mut self) {
        let mut list_tickets = std::mem::take(&mut self.list_tickets);
        let mut details_tickets = std::mem::take(&mut self.details_tickets);
        list_tickets.invalidate();
        details_tickets.invalidate();
        *self = Self {
            list_tickets,
            details_tickets,
            ..Self::default()
        };
    }

    // -------------------------------------------------------------------------
    // List
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn subscriptions(&self) -> &Loadable<Vec<WebhookSubscription>> {
        &self.subscriptions
    }

    /// Loaded subscriptions, empty until the first successful load.
    #[must_use]
    pub fn subscription_list(&self) -> &[WebhookSubscription] {
        match self.subscriptions.value() {
            Some(subscriptions) => subscriptions,
            None => &[],
        }
    }

    #[must_use]
    pub fn subscription(&self, id: &str) -> Option<&WebhookSubscription> {
        self.subscription_list().iter().find(|s| s.id == id)
    }

    /// A reload is in flight while an earlier list is still shown.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Starts a list load.
    ///
    /// The loading indicator is only shown until the first load settles;
    /// later reloads keep the current list visible.
    pub fn begin_load(&mut self) -> Ticket {
        if self.subscriptions.value().is_some() {
            self.refreshing = true;
        } else {
            self.subscriptions = Loadable::Loading;
        }
        self.list_tickets.issue()
    }

    /// Applies a list response. Returns the number of subscriptions loaded.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Stale` if a newer load was started, or the
    /// request error, which is also kept as [`Loadable::Failed`].
    pub fn finish_load(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<WebhookSubscription>, RequestError>,
    ) -> Result<usize, DashboardError> {
        if !self.list_tickets.is_current(ticket) {
            debug!("Discarding superseded subscription list");
            return Err(DashboardError::Stale);
        }
        self.refreshing = false;

        match result {
            Ok(subscriptions) => {
                let count = subscriptions.len();
                debug!(count, "Subscriptions loaded");
                self.subscriptions = Loadable::Loaded(subscriptions);
                self.selected = self.selected.min(count.saturating_sub(1));
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load subscriptions");
                self.subscriptions = Loadable::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Fetches the subscription list.
    ///
    /// # Errors
    ///
    /// See [`DashboardView::finish_load`].
    pub async fn load(&mut self, api: &ApiClient) -> Result<usize, DashboardError> {
        let ticket = self.begin_load();
        let result = api.list_subscriptions().await;
        self.finish_load(ticket, result)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_subscription(&self) -> Option<&WebhookSubscription> {
        self.subscription_list().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.subscription_list().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.subscription_list().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Opens the create form, keeping any draft already in it.
    pub fn open_create_form(&mut self) {
        if self.create_form.is_none() {
            self.create_form = Some(CreateForm::default());
        }
    }

    #[must_use]
    pub fn create_form(&self) -> Option<&CreateForm> {
        self.create_form.as_ref()
    }

    pub fn create_form_mut(&mut self) -> Option<&mut CreateForm> {
        self.create_form.as_mut()
    }

    /// Closes the form, discarding the draft. Refused while a submit is in
    /// flight.
    pub fn close_create_form(&mut self) -> bool {
        match &self.create_form {
            Some(form) if form.submitting => false,
            _ => {
                self.create_form = None;
                true
            }
        }
    }

    /// Validates the form and marks it submitting.
    ///
    /// # Errors
    ///
    /// `NoForm` with no open form, `Busy` while a submit is pending, or the
    /// validation error (also shown on the form).
    pub fn begin_create(&mut self) -> Result<NewSubscription, DashboardError> {
        let form = self.create_form.as_mut().ok_or(DashboardError::NoForm)?;
        if form.submitting {
            return Err(DashboardError::Busy);
        }

        match form.validate() {
            Ok(request) => {
                form.submitting = true;
                form.error = None;
                Ok(request)
            }
            Err(e) => {
                form.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Applies a create response. Success closes the form; failure keeps it
    /// open with the error shown.
    ///
    /// # Errors
    ///
    /// Returns the request error on failure.
    pub fn finish_create(
        &mut self,
        result: Result<WebhookSubscription, RequestError>,
    ) -> Result<WebhookSubscription, DashboardError> {
        match result {
            Ok(subscription) => {
                info!(id = %subscription.id, "Subscription created");
                self.create_form = None;
                Ok(subscription)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create subscription");
                if let Some(form) = self.create_form.as_mut() {
                    form.submitting = false;
                    form.error = Some(e.to_string());
                }
                Err(e.into())
            }
        }
    }

    /// Submits the create form, then reloads the list whatever the outcome.
    ///
    /// # Errors
    ///
    /// See [`DashboardView::begin_create`] and [`DashboardView::finish_create`].
    pub async fn submit_create(
        &mut self,
        api: &ApiClient,
    ) -> Result<WebhookSubscription, DashboardError> {
        let request = self.begin_create()?;
        let result = api.create_subscription(&request).await;
        let outcome = self.finish_create(result);
        self.reload(api).await;
        outcome
    }

    // -------------------------------------------------------------------------
    // Cancel and delete
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Marks a cancel pending for an active subscription.
    ///
    /// # Errors
    ///
    /// `Busy`, `UnknownSubscription`, or `ActionUnavailable` for an inactive
    /// subscription.
    pub fn begin_cancel(&mut self, id: &str) -> Result<(), DashboardError> {
        self.ensure_idle()?;
        let subscription = self
            .subscription(id)
            .ok_or_else(|| DashboardError::UnknownSubscription(id.to_string()))?;
        if !subscription.can_cancel() {
            return Err(DashboardError::ActionUnavailable {
                action: "cancel",
                id: id.to_string(),
            });
        }
        self.pending = Some(PendingAction::Cancel(id.to_string()));
        Ok(())
    }

    /// Cancels an active subscription, then reloads the list.
    ///
    /// # Errors
    ///
    /// See [`DashboardView::begin_cancel`]; otherwise the request error.
    pub async fn cancel(&mut self, api: &ApiClient, id: &str) -> Result<(), DashboardError> {
        self.begin_cancel(id)?;
        let result = api.cancel_subscription(id).await.map(|_| ());
        let outcome = self.finish_action(result);
        self.reload(api).await;
        outcome
    }

    /// Stages deletion of an inactive subscription pending confirmation.
    ///
    /// # Errors
    ///
    /// `Busy`, `UnknownSubscription`, or `ActionUnavailable` for an active
    /// subscription.
    pub fn request_delete(&mut self, id: &str) -> Result<(), DashboardError> {
        self.ensure_idle()?;
        let subscription = self
            .subscription(id)
            .ok_or_else(|| DashboardError::UnknownSubscription(id.to_string()))?;
        if !subscription.can_delete() {
            return Err(DashboardError::ActionUnavailable {
                action: "delete",
                id: id.to_string(),
            });
        }
        self.confirm_delete = Some(id.to_string());
        Ok(())
    }

    /// Id of the subscription awaiting delete confirmation.
    #[must_use]
    pub fn pending_confirmation(&self) -> Option<&str> {
        self.confirm_delete.as_deref()
    }

    /// Silently drops a staged deletion.
    pub fn decline_delete(&mut self) {
        if let Some(id) = self.confirm_delete.take() {
            debug!(id = %id, "Deletion declined");
        }
    }

    /// Turns the staged deletion into a pending action.
    ///
    /// # Errors
    ///
    /// `Busy` or `NothingToConfirm`.
    pub fn begin_delete(&mut self) -> Result<String, DashboardError> {
        self.ensure_idle()?;
        let id = self
            .confirm_delete
            .take()
            .ok_or(DashboardError::NothingToConfirm)?;
        self.pending = Some(PendingAction::Delete(id.clone()));
        Ok(id)
    }

    /// Deletes the staged subscription, then reloads the list.
    ///
    /// # Errors
    ///
    /// See [`DashboardView::begin_delete`]; otherwise the request error.
    pub async fn confirm_delete(&mut self, api: &ApiClient) -> Result<(), DashboardError> {
        let id = self.begin_delete()?;
        let result = api.delete_subscription(&id).await;
        let outcome = self.finish_action(result);
        self.reload(api).await;
        outcome
    }

    /// Applies the result of the pending cancel or delete.
    ///
    /// # Errors
    ///
    /// Returns the request error, also kept as the dashboard notice.
    pub fn finish_action(&mut self, result: Result<(), RequestError>) -> Result<(), DashboardError> {
        let action = self.pending.take();
        let (verb, id) = action
            .as_ref()
            .map_or(("update", ""), |a| (a.verb(), a.id()));

        match result {
            Ok(()) => {
                info!(action = verb, id = %id, "Subscription updated");
                self.notice = None;
                if let Some(PendingAction::Delete(id)) = &action {
                    if self
                        .details
                        .as_ref()
                        .is_some_and(|panel| &panel.subscription.id == id)
                    {
                        self.close_details();
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(action = verb, id = %id, error = %e, "Subscription update failed");
                self.notice = Some(format!("Failed to {verb} subscription: {e}"));
                Err(e.into())
            }
        }
    }

    /// Last action failure, shown until the next successful action.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn ensure_idle(&self) -> Result<(), DashboardError> {
        if self.pending.is_some() {
            return Err(DashboardError::Busy);
        }
        Ok(())
    }

    async fn reload(&mut self, api: &ApiClient) {
        if let Err(e) = self.load(api).await {
            debug!(error = %e, "Reload after mutation did not apply");
        }
    }

    // -------------------------------------------------------------------------
    // Details
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn details(&self) -> Option<&DetailsPanel> {
        self.details.as_ref()
    }

    /// Opens the details panel for `id`, replacing any open panel.
    ///
    /// # Errors
    ///
    /// `UnknownSubscription` if `id` is not in the loaded list.
    pub fn open_details(&mut self, id: &str) -> Result<Ticket, DashboardError> {
        let subscription = self
            .subscription(id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownSubscription(id.to_string()))?;
        self.details = Some(DetailsPanel {
            subscription,
            events: Loadable::Loading,
        });
        Ok(self.details_tickets.issue())
    }

    /// Applies a details response if its panel is still the open one.
    /// Returns the number of events loaded.
    ///
    /// # Errors
    ///
    /// `Stale` if the panel was closed or replaced, otherwise the request
    /// error (also kept on the panel).
    pub fn finish_details(
        &mut self,
        ticket: Ticket,
        result: Result<SubscriptionDetail, RequestError>,
    ) -> Result<usize, DashboardError> {
        let current = self.details_tickets.is_current(ticket);
        let panel = match self.details.as_mut() {
            Some(panel) if current => panel,
            _ => {
                debug!("Discarding details for a closed panel");
                return Err(DashboardError::Stale);
            }
        };

        match result {
            Ok(detail) => {
                let count = detail.events.len();
                panel.subscription = detail.subscription;
                panel.events = Loadable::Loaded(detail.events);
                Ok(count)
            }
            Err(e) => {
                warn!(id = %panel.subscription.id, error = %e, "Failed to load subscription details");
                panel.events = Loadable::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Closes the panel; any in-flight details response is discarded.
    pub fn close_details(&mut self) {
        self.details = None;
        self.details_tickets.invalidate();
    }

    /// Opens the panel for `id` and fetches its events.
    ///
    /// # Errors
    ///
    /// See [`DashboardView::open_details`] and [`DashboardView::finish_details`].
    pub async fn show_details(&mut self, api: &ApiClient, id: &str) -> Result<usize, DashboardError> {
        let ticket = self.open_details(id)?;
        let result = api.subscription(id).await;
        self.finish_details(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subscription(id: &str, active: bool) -> WebhookSubscription {
        serde_json::from_value(json!({
            "id": id,
            "sourceUrl": "https://src.example",
            "callbackUrl": "https://cb.example",
            "isActive": active,
            "userId": "usr_1",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    fn loaded(subs: Vec<WebhookSubscription>) -> DashboardView {
        let mut view = DashboardView::new();
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(subs)).unwrap();
        view
    }

    fn server_error() -> RequestError {
        RequestError::Status {
            status: 500,
            message: "boom".to_string(),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn first_load_shows_loading_then_list() {
        let mut view = DashboardView::new();
        let ticket = view.begin_load();
        assert!(view.subscriptions().is_loading());

        let count = view
            .finish_load(ticket, Ok(vec![subscription("a", true)]))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(view.subscription_list().len(), 1);
    }

    #[test]
    fn reload_keeps_current_list_visible() {
        let mut view = loaded(vec![subscription("a", true)]);
        view.begin_load();
        assert!(view.is_refreshing());
        assert_eq!(view.subscription_list().len(), 1);
    }

    #[test]
    fn failed_load_is_explicit() {
        let mut view = DashboardView::new();
        let ticket = view.begin_load();
        let err = view.finish_load(ticket, Err(server_error())).unwrap_err();

        assert!(matches!(err, DashboardError::Request(_)));
        assert_eq!(view.subscriptions().error(), Some("server error: 500 - boom"));
        assert!(view.subscription_list().is_empty());
    }

    #[test]
    fn superseded_load_is_discarded() {
        let mut view = DashboardView::new();
        let old = view.begin_load();
        let new = view.begin_load();

        view.finish_load(new, Ok(vec![subscription("new", true)]))
            .unwrap();
        let err = view
            .finish_load(old, Ok(vec![subscription("old", true)]))
            .unwrap_err();

        assert!(matches!(err, DashboardError::Stale));
        assert_eq!(view.subscription_list()[0].id, "new");
    }

    #[test]
    fn selection_wraps_and_clamps() {
        let mut view = loaded(vec![subscription("a", true), subscription("b", true)]);
        view.select_previous();
        assert_eq!(view.selected_subscription().unwrap().id, "b");
        view.select_next();
        assert_eq!(view.selected_subscription().unwrap().id, "a");

        view.select_next();
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(vec![subscription("a", true)]))
            .unwrap();
        assert_eq!(view.selected_index(), 0);
    }

    // =========================================================================
    // Create form
    // =========================================================================

    #[test]
    fn create_form_requires_http_urls() {
        let mut view = DashboardView::new();
        view.open_create_form();

        let err = view.begin_create().unwrap_err();
        assert_eq!(err.to_string(), "source URL: is required");
        assert_eq!(
            view.create_form().unwrap().error.as_deref(),
            Some("source URL: is required")
        );

        let form = view.create_form_mut().unwrap();
        form.source_url = "ftp://src".to_string();
        form.callback_url = "https://cb".to_string();
        assert!(matches!(
            view.begin_create(),
            Err(DashboardError::Invalid {
                field: "source URL",
                ..
            })
        ));
    }

    #[test]
    fn create_form_rejects_malformed_urls() {
        let form = CreateForm {
            source_url: "https://".to_string(),
            callback_url: "https://cb.example".to_string(),
            ..CreateForm::default()
        };
        let err = form.validate().unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Invalid {
                field: "source URL",
                ..
            }
        ));
        assert!(err.to_string().contains("is not a valid URL"));

        let form = CreateForm {
            source_url: "https://src.example".to_string(),
            callback_url: "http://not a host/\\bad".to_string(),
            ..CreateForm::default()
        };
        assert!(matches!(
            form.validate(),
            Err(DashboardError::Invalid {
                field: "callback URL",
                ..
            })
        ));

        let form = CreateForm {
            source_url: " https://src.example/hook ".to_string(),
            callback_url: "http://localhost:8080/cb".to_string(),
            ..CreateForm::default()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn submit_is_disabled_while_pending() {
        let mut view = DashboardView::new();
        view.open_create_form();
        let form = view.create_form_mut().unwrap();
        form.source_url = "https://src".to_string();
        form.callback_url = "https://cb".to_string();

        let request = view.begin_create().unwrap();
        assert!(request.secret.is_none());
        assert!(matches!(view.begin_create(), Err(DashboardError::Busy)));
        assert!(!view.close_create_form());
    }

    #[test]
    fn create_failure_keeps_form_open_with_error() {
        let mut view = DashboardView::new();
        view.open_create_form();
        let form = view.create_form_mut().unwrap();
        form.source_url = "https://src".to_string();
        form.callback_url = "https://cb".to_string();
        view.begin_create().unwrap();

        assert!(view.finish_create(Err(server_error())).is_err());
        let form = view.create_form().unwrap();
        assert!(!form.submitting);
        assert_eq!(form.error.as_deref(), Some("server error: 500 - boom"));
        assert_eq!(form.source_url, "https://src");
    }

    #[test]
    fn create_success_closes_form() {
        let mut view = DashboardView::new();
        view.open_create_form();
        let form = view.create_form_mut().unwrap();
        form.source_url = "https://src".to_string();
        form.callback_url = "https://cb".to_string();
        view.begin_create().unwrap();

        view.finish_create(Ok(subscription("new", true))).unwrap();
        assert!(view.create_form().is_none());
    }

    #[test]
    fn form_editing_follows_focus() {
        let mut form = CreateForm::default();
        form.push_char('h');
        form.focused = form.focused.next();
        form.push_char('x');
        form.push_char('y');
        form.backspace();
        form.focused = form.focused.next().next();
        assert_eq!(form.focused, CreateField::SourceUrl);
        assert_eq!(form.focused.previous(), CreateField::Secret);
        assert_eq!(form.source_url, "h");
        assert_eq!(form.callback_url, "x");
    }

    // =========================================================================
    // Action gating
    // =========================================================================

    #[test]
    fn cancel_only_for_active_subscriptions() {
        let mut view = loaded(vec![subscription("on", true), subscription("off", false)]);

        assert!(matches!(
            view.begin_cancel("off"),
            Err(DashboardError::ActionUnavailable { action: "cancel", .. })
        ));
        view.begin_cancel("on").unwrap();
        assert_eq!(
            view.pending_action(),
            Some(&PendingAction::Cancel("on".to_string()))
        );
    }

    #[test]
    fn delete_only_for_inactive_subscriptions() {
        let mut view = loaded(vec![subscription("on", true), subscription("off", false)]);

        assert!(matches!(
            view.request_delete("on"),
            Err(DashboardError::ActionUnavailable { action: "delete", .. })
        ));
        assert!(view.pending_confirmation().is_none());

        view.request_delete("off").unwrap();
        assert_eq!(view.pending_confirmation(), Some("off"));
    }

    #[test]
    fn unknown_subscription_is_rejected() {
        let mut view = loaded(vec![]);
        assert!(matches!(
            view.begin_cancel("nope"),
            Err(DashboardError::UnknownSubscription(_))
        ));
        assert!(matches!(
            view.open_details("nope"),
            Err(DashboardError::UnknownSubscription(_))
        ));
    }

    #[test]
    fn declined_delete_issues_nothing() {
        let mut view = loaded(vec![subscription("off", false)]);
        view.request_delete("off").unwrap();
        view.decline_delete();

        assert!(view.pending_confirmation().is_none());
        assert!(matches!(
            view.begin_delete(),
            Err(DashboardError::NothingToConfirm)
        ));
        assert!(view.pending_action().is_none());
    }

    #[test]
    fn actions_are_serialized() {
        let mut view = loaded(vec![subscription("on", true), subscription("off", false)]);
        view.begin_cancel("on").unwrap();
        assert!(matches!(view.request_delete("off"), Err(DashboardError::Busy)));

        view.finish_action(Ok(())).unwrap();
        assert!(view.request_delete("off").is_ok());
    }

    #[test]
    fn failed_action_sets_notice() {
        let mut view = loaded(vec![subscription("on", true)]);
        view.begin_cancel("on").unwrap();
        assert!(view.finish_action(Err(server_error())).is_err());

        assert_eq!(
            view.notice(),
            Some("Failed to cancel subscription: server error: 500 - boom")
        );
        assert!(view.pending_action().is_none());
    }

    // =========================================================================
    // Details
    // =========================================================================

    fn detail(id: &str) -> SubscriptionDetail {
        serde_json::from_value(json!({
            "id": id,
            "sourceUrl": "https://src.example",
            "callbackUrl": "https://cb.example",
            "isActive": true,
            "userId": "usr_1",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z",
            "events": [{
                "id": "evt_1",
                "subscriptionId": id,
                "eventType": "user.created",
                "payload": {},
                "processed": true,
                "retryCount": 0,
                "createdAt": "2024-05-01T10:01:00Z"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn details_load_into_open_panel() {
        let mut view = loaded(vec![subscription("a", true)]);
        let ticket = view.open_details("a").unwrap();
        assert!(view.details().unwrap().events.is_loading());

        assert_eq!(view.finish_details(ticket, Ok(detail("a"))).unwrap(), 1);
        let events = view.details().unwrap().events.value().unwrap();
        assert_eq!(events[0].event_type, "user.created");
    }

    #[test]
    fn details_for_closed_panel_are_discarded() {
        let mut view = loaded(vec![subscription("a", true)]);
        let ticket = view.open_details("a").unwrap();
        view.close_details();

        assert!(matches!(
            view.finish_details(ticket, Ok(detail("a"))),
            Err(DashboardError::Stale)
        ));
        assert!(view.details().is_none());
    }

    #[test]
    fn details_for_replaced_panel_are_discarded() {
        let mut view = loaded(vec![subscription("a", true), subscription("b", true)]);
        let first = view.open_details("a").unwrap();
        let second = view.open_details("b").unwrap();

        assert!(view.finish_details(first, Ok(detail("a"))).is_err());
        assert!(view.details().unwrap().events.is_loading());
        assert!(view.finish_details(second, Ok(detail("b"))).is_ok());
        assert_eq!(view.details().unwrap().subscription.id, "b");
    }

    #[test]
    fn deleting_shown_subscription_closes_panel() {
        let mut view = loaded(vec![subscription("off", false)]);
        view.open_details("off").unwrap();
        view.request_delete("off").unwrap();
        view.begin_delete().unwrap();
        view.finish_action(Ok(())).unwrap();

        assert!(view.details().is_none());
    }
}
