//! Bounded log of test fire outcomes.
//!
//! Results are client-local and never persisted. The log keeps the
//! [`MAX_TEST_RESULTS`] most recent entries, newest first; pushing onto a full
//! log evicts the oldest entry.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use hookboard_client::TestFireResponse;
use serde::Serialize;
use serde_json::Value;

/// Number of results retained.
pub const MAX_TEST_RESULTS: usize = 10;

/// Event id recorded when the backend does not echo one.
pub const UNKNOWN_EVENT_ID: &str = "unknown";

/// Event id recorded when the request never produced a response.
pub const ERROR_EVENT_ID: &str = "error";

/// Error text recorded for a non-2xx test fire.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send webhook";

/// Outcome of one test fire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub success: bool,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestResult {
    /// Builds a result from an HTTP response.
    ///
    /// A 2xx status is a success carrying the echoed `eventId` (or
    /// [`UNKNOWN_EVENT_ID`]). Any other status is a failure with
    /// [`SEND_FAILED_MESSAGE`] and the body kept as the response.
    #[must_use]
    pub fn from_response(response: TestFireResponse, at: DateTime<Utc>) -> Self {
        let success = response.is_success();
        let event_id = response
            .event_id()
            .unwrap_or(UNKNOWN_EVENT_ID)
            .to_string();

        Self {
            success,
            event_id,
            timestamp: at,
            response: Some(response.body),
            error: (!success).then(|| SEND_FAILED_MESSAGE.to_string()),
        }
    }

    /// Builds a failure for a request that produced no usable response.
    #[must_use]
    pub fn failure(error: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            event_id: ERROR_EVENT_ID.to_string(),
            timestamp: at,
            response: None,
            error: Some(error.into()),
        }
    }
}

/// Newest-first ring of [`TestResult`]s.
#[derive(Debug, Clone)]
pub struct TestResultLog {
    entries: VecDeque<TestResult>,
    capacity: usize,
}

impl Default for TestResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TestResultLog {
    /// Creates an empty log holding [`MAX_TEST_RESULTS`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_TEST_RESULTS)
    }

    /// Creates an empty log with a custom capacity (at least 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a result at the head, returning the evicted oldest entry if
    /// the log was full.
    pub fn push(&mut self, result: TestResult) -> Option<TestResult> {
        self.entries.push_front(result);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Most recent result.
    #[must_use]
    pub fn latest(&self) -> Option<&TestResult> {
        self.entries.front()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_714_557_600 + secs, 0).unwrap()
    }

    fn numbered(n: usize) -> TestResult {
        TestResult {
            success: true,
            event_id: format!("evt_{n}"),
            timestamp: at(n as i64),
            response: None,
            error: None,
        }
    }

    #[test]
    fn success_response_uses_echoed_event_id() {
        let result = TestResult::from_response(
            TestFireResponse {
                status: 201,
                body: json!({"eventId": "evt_abc", "status": "queued"}),
            },
            at(0),
        );
        assert!(result.success);
        assert_eq!(result.event_id, "evt_abc");
        assert!(result.error.is_none());
        assert_eq!(result.response.unwrap()["status"], "queued");
    }

    #[test]
    fn success_without_event_id_is_unknown() {
        let result = TestResult::from_response(
            TestFireResponse {
                status: 200,
                body: json!({}),
            },
            at(0),
        );
        assert!(result.success);
        assert_eq!(result.event_id, UNKNOWN_EVENT_ID);
    }

    #[test]
    fn non_success_status_is_failure_with_body() {
        let result = TestResult::from_response(
            TestFireResponse {
                status: 404,
                body: json!({"message": "Subscription not found"}),
            },
            at(0),
        );
        assert!(!result.success);
        assert_eq!(result.event_id, UNKNOWN_EVENT_ID);
        assert_eq!(result.error.as_deref(), Some(SEND_FAILED_MESSAGE));
        assert_eq!(
            result.response.unwrap()["message"],
            "Subscription not found"
        );
    }

    #[test]
    fn failure_uses_error_event_id() {
        let result = TestResult::failure("connection refused", at(0));
        assert!(!result.success);
        assert_eq!(result.event_id, ERROR_EVENT_ID);
        assert_eq!(result.error.as_deref(), Some("connection refused"));
        assert!(result.response.is_none());
    }

    #[test]
    fn log_keeps_newest_first() {
        let mut log = TestResultLog::new();
        log.push(numbered(1));
        log.push(numbered(2));
        log.push(numbered(3));

        let ids: Vec<_> = log.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["evt_3", "evt_2", "evt_1"]);
        assert_eq!(log.latest().unwrap().event_id, "evt_3");
    }

    #[test]
    fn log_retains_only_ten_most_recent() {
        let mut log = TestResultLog::new();
        let mut evicted = Vec::new();
        for n in 1..=13 {
            if let Some(old) = log.push(numbered(n)) {
                evicted.push(old.event_id);
            }
        }

        assert_eq!(log.len(), MAX_TEST_RESULTS);
        assert_eq!(evicted, vec!["evt_1", "evt_2", "evt_3"]);

        let ids: Vec<_> = log.iter().map(|r| r.event_id.clone()).collect();
        let expected: Vec<_> = (4..=13).rev().map(|n| format!("evt_{n}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = TestResultLog::with_capacity(0);
        assert_eq!(log.capacity(), 1);
        log.push(numbered(1));
        assert_eq!(log.push(numbered(2)).unwrap().event_id, "evt_1");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn serializes_camel_case_without_empty_fields() {
        let value = serde_json::to_value(numbered(7)).unwrap();
        assert_eq!(value["eventId"], "evt_7");
        assert!(value.get("error").is_none());
        assert!(value.get("response").is_none());
    }
}
