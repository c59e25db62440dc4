//! Wire types for the webhook backend.
//!
//! All entities except the session token are owned by the backend; these are
//! read-only copies decoded from its camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Absent in some login/register responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response body of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Response body of `GET /auth/profile`.
///
/// The backend wraps the user as `{ "user": {...} }`; a bare user object is
/// accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProfileResponse {
    Wrapped { user: User },
    Bare(User),
}

impl ProfileResponse {
    pub(crate) fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

/// Credentials sent to the register and login endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /webhooks/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub source_url: String,
    pub callback_url: String,
    /// `None` asks the backend to generate a secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl NewSubscription {
    /// Builds a request, treating a blank secret as "auto-generate".
    #[must_use]
    pub fn new(
        source_url: impl Into<String>,
        callback_url: impl Into<String>,
        secret: Option<&str>,
    ) -> Self {
        Self {
            source_url: source_url.into().trim().to_string(),
            callback_url: callback_url.into().trim().to_string(),
            secret: secret
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Owner summary optionally embedded in a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionOwner {
    pub id: String,
    pub email: String,
}

/// Aggregate counts the backend attaches as `_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCounts {
    #[serde(default)]
    pub events: u64,
}

/// A user-owned record describing a source of events and their forwarding target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSubscription {
    pub id: String,
    pub source_url: String,
    pub callback_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub is_active: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SubscriptionOwner>,
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<SubscriptionCounts>,
}

impl WebhookSubscription {
    /// Number of events recorded against this subscription (0 when not reported).
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.counts.map(|c| c.events).unwrap_or(0)
    }

    /// Cancelling is only meaningful for an active subscription.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.is_active
    }

    /// Deleting is only offered once a subscription has been cancelled.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        !self.is_active
    }
}

/// A single delivery recorded against a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub id: String,
    pub subscription_id: String,
    pub event_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Response of `GET /webhooks/:id`: the subscription plus its events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriptionDetail {
    #[serde(flatten)]
    pub subscription: WebhookSubscription,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// Raw outcome of a test fire against `/webhook-events/:id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestFireResponse {
    /// HTTP status returned by the ingress endpoint.
    pub status: u16,
    /// Decoded JSON body.
    pub body: Value,
}

impl TestFireResponse {
    /// Returns true for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `eventId` echoed by the backend, if any.
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.body.get("eventId").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subscription_json(active: bool) -> Value {
        json!({
            "id": "sub_1",
            "sourceUrl": "https://src.example",
            "callbackUrl": "https://cb.example",
            "secret": "whsec_abc",
            "isActive": active,
            "userId": "usr_1",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z",
            "_count": { "events": 3 }
        })
    }

    #[test]
    fn subscription_decodes_camel_case_and_counts() {
        let sub: WebhookSubscription = serde_json::from_value(subscription_json(true)).unwrap();
        assert_eq!(sub.source_url, "https://src.example");
        assert_eq!(sub.secret.as_deref(), Some("whsec_abc"));
        assert_eq!(sub.event_count(), 3);
        assert!(sub.user.is_none());
    }

    #[test]
    fn subscription_without_counts_reports_zero_events() {
        let mut value = subscription_json(true);
        value.as_object_mut().unwrap().remove("_count");
        let sub: WebhookSubscription = serde_json::from_value(value).unwrap();
        assert_eq!(sub.event_count(), 0);
    }

    #[test]
    fn action_gating_follows_is_active() {
        let active: WebhookSubscription = serde_json::from_value(subscription_json(true)).unwrap();
        assert!(active.can_cancel());
        assert!(!active.can_delete());

        let inactive: WebhookSubscription =
            serde_json::from_value(subscription_json(false)).unwrap();
        assert!(!inactive.can_cancel());
        assert!(inactive.can_delete());
    }

    #[test]
    fn new_subscription_omits_blank_secret() {
        let req = NewSubscription::new("https://src.example", "https://cb.example", Some("   "));
        assert!(req.secret.is_none());

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({"sourceUrl": "https://src.example", "callbackUrl": "https://cb.example"})
        );
    }

    #[test]
    fn new_subscription_keeps_explicit_secret() {
        let req = NewSubscription::new(" https://a ", "https://b", Some("s3cret"));
        assert_eq!(req.source_url, "https://a");
        assert_eq!(req.secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn profile_accepts_wrapped_and_bare_users() {
        let wrapped: ProfileResponse =
            serde_json::from_value(json!({"user": {"id": "1", "email": "a@b.com"}})).unwrap();
        assert_eq!(wrapped.into_user().email, "a@b.com");

        let bare: ProfileResponse = serde_json::from_value(json!({
            "id": "1",
            "email": "c@d.com",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let user = bare.into_user();
        assert_eq!(user.email, "c@d.com");
        assert!(user.created_at.is_some());
    }

    #[test]
    fn detail_flattens_subscription_and_defaults_events() {
        let detail: SubscriptionDetail = serde_json::from_value(subscription_json(true)).unwrap();
        assert_eq!(detail.subscription.id, "sub_1");
        assert!(detail.events.is_empty());
    }

    #[test]
    fn event_decodes_optional_fields() {
        let event: WebhookEvent = serde_json::from_value(json!({
            "id": "evt_1",
            "subscriptionId": "sub_1",
            "eventType": "user.created",
            "payload": {"user": {"id": "u"}},
            "processed": false,
            "processingError": "callback returned 500",
            "retryCount": 2,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(event.retry_count, 2);
        assert_eq!(
            event.processing_error.as_deref(),
            Some("callback returned 500")
        );
        assert!(event.processed_at.is_none());
    }

    #[test]
    fn test_fire_response_reads_event_id() {
        let response = TestFireResponse {
            status: 201,
            body: json!({"eventId": "evt_9"}),
        };
        assert!(response.is_success());
        assert_eq!(response.event_id(), Some("evt_9"));

        let failed = TestFireResponse {
            status: 404,
            body: json!({"message": "not found"}),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.event_id(), None);
    }
}
