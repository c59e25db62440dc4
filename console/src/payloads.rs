//! Sample payloads for test webhook fires.
//!
//! Every sample is a pure function of the event type and the clock, so the
//! same inputs always produce the same JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Tag that selects the free-form payload editor instead of a sample.
pub const CUSTOM_EVENT_TYPE: &str = "custom";

/// An event type offered by the tester's selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTypeOption {
    /// Value sent in the `X-Event-Type` header.
    pub tag: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// Event types offered by the tester, in display order.
pub const EVENT_TYPES: &[EventTypeOption] = &[
    EventTypeOption {
        tag: "user.created",
        label: "User Created",
    },
    EventTypeOption {
        tag: "payment.completed",
        label: "Payment Completed",
    },
    EventTypeOption {
        tag: "order.shipped",
        label: "Order Shipped",
    },
    EventTypeOption {
        tag: "subscription.renewed",
        label: "Subscription Renewed",
    },
    EventTypeOption {
        tag: CUSTOM_EVENT_TYPE,
        label: "Custom Payload",
    },
];

/// Default event type selected in a fresh tester.
pub const DEFAULT_EVENT_TYPE: &str = "user.created";

/// Returns the display label for `tag`, or the tag itself when unknown.
#[must_use]
pub fn event_type_label(tag: &str) -> &str {
    EVENT_TYPES
        .iter()
        .find(|option| option.tag == tag)
        .map_or(tag, |option| option.label)
}

/// Builds the sample payload for `event_type` at instant `now`.
///
/// Ids embed the millisecond timestamp. Any tag without a dedicated sample
/// (including `subscription.renewed` and `custom`) yields
/// `{"message": "Test payload", "timestamp": ...}`.
#[must_use]
pub fn sample_payload(event_type: &str, now: DateTime<Utc>) -> Value {
    let millis = now.timestamp_millis();
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    match event_type {
        "user.created" => json!({
            "user": {
                "id": format!("test_{millis}"),
                "email": "test@example.com",
                "name": "Test User",
                "createdAt": timestamp,
            }
        }),
        "payment.completed" => json!({
            "payment": {
                "id": format!("pay_{millis}"),
                "amount": 99.99,
                "currency": "USD",
                "status": "completed",
                "userId": format!("user_{millis}"),
            }
        }),
        "order.shipped" => json!({
            "order": {
                "id": format!("order_{millis}"),
                "items": [
                    { "name": "Product A", "quantity": 2, "price": 29.99 },
                    { "name": "Product B", "quantity": 1, "price": 49.99 },
                ],
                "trackingNumber": format!("TRACK{}", to_base36(millis).to_uppercase()),
            }
        }),
        _ => json!({
            "message": "Test payload",
            "timestamp": timestamp,
        }),
    }
}

/// Pretty-printed sample, as shown in the payload preview.
#[must_use]
pub fn sample_payload_pretty(event_type: &str, now: DateTime<Utc>) -> String {
    let value = sample_payload(event_type, now);
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// Lower-case base-36 rendering of a non-negative integer.
fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = value.unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
