//! Integration tests for the API client against a mock backend.
//!
//! These tests verify bearer injection, request shapes, error decoding and the
//! global 401 interception that clears the stored session.

use std::path::PathBuf;
use std::sync::Arc;

use hookboard_client::api::{ApiClient, InterceptPolicy, SessionEvent};
use hookboard_client::config::Config;
use hookboard_client::error::RequestError;
use hookboard_client::session::{MemorySessionStore, SessionStore};
use hookboard_client::types::NewSubscription;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_client(server: &MockServer, store: Arc<MemorySessionStore>) -> ApiClient {
    let config = Config::new(server.uri(), PathBuf::from("/unused"));
    ApiClient::new(&config, store).expect("client should build")
}

fn create_client_with_policy(
    server: &MockServer,
    store: Arc<MemorySessionStore>,
    policy: InterceptPolicy,
) -> ApiClient {
    let mut config = Config::new(server.uri(), PathBuf::from("/unused"));
    config.intercept_policy = policy;
    ApiClient::new(&config, store).expect("client should build")
}

fn subscription_json(id: &str, active: bool) -> Value {
    json!({
        "id": id,
        "sourceUrl": "https://src.example",
        "callbackUrl": "https://cb.example",
        "secret": "whsec_generated",
        "isActive": active,
        "userId": "usr_1",
        "createdAt": "2024-05-01T10:00:00.000Z",
        "updatedAt": "2024-05-01T10:00:00.000Z",
        "_count": { "events": 0 }
    })
}

fn auth_json(email: &str) -> Value {
    json!({
        "access_token": "tok_fresh",
        "user": { "id": "usr_1", "email": email, "createdAt": "2024-05-01T10:00:00.000Z" }
    })
}

// =============================================================================
// Bearer injection
// =============================================================================

#[tokio::test]
async fn attaches_bearer_token_when_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .and(header("authorization", "Bearer tok_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok_abc")));
    let subs = client.list_subscriptions().await.expect("list should succeed");
    assert!(subs.is_empty());
}

#[tokio::test]
async fn sends_unauthenticated_request_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_json("a@b.com")))
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::new()));
    client.login("a@b.com", "pw123456").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

// =============================================================================
// Request shapes
// =============================================================================

#[tokio::test]
async fn register_posts_credentials_and_decodes_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({"email": "a@b.com", "password": "pw123456"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_json("a@b.com")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::new()));
    let response = client.register("a@b.com", "pw123456").await.unwrap();

    assert_eq!(response.access_token, "tok_fresh");
    assert_eq!(response.user.email, "a@b.com");
}

#[tokio::test]
async fn profile_unwraps_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": {"id": "usr_1", "email": "a@b.com"}})),
        )
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let user = client.profile().await.unwrap();
    assert_eq!(user.id, "usr_1");
}

#[tokio::test]
async fn create_subscription_omits_blank_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhooks/subscribe"))
        .and(body_json(json!({
            "sourceUrl": "https://src.example",
            "callbackUrl": "https://cb.example"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(subscription_json("sub_1", true)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let request = NewSubscription::new("https://src.example", "https://cb.example", Some(""));
    let created = client.create_subscription(&request).await.unwrap();

    assert_eq!(created.id, "sub_1");
    assert!(created.is_active);
}

#[tokio::test]
async fn subscription_detail_includes_events() {
    let server = MockServer::start().await;
    let mut detail = subscription_json("sub_1", true);
    detail["events"] = json!([{
        "id": "evt_1",
        "subscriptionId": "sub_1",
        "eventType": "user.created",
        "payload": {"user": {"email": "test@example.com"}},
        "processed": true,
        "retryCount": 0,
        "createdAt": "2024-05-01T10:05:00.000Z",
        "processedAt": "2024-05-01T10:05:01.000Z"
    }]);

    Mock::given(method("GET"))
        .and(path("/webhooks/sub_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let detail = client.subscription("sub_1").await.unwrap();

    assert_eq!(detail.subscription.id, "sub_1");
    assert_eq!(detail.events.len(), 1);
    assert!(detail.events[0].processed);
}

#[tokio::test]
async fn cancel_and_delete_hit_expected_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhooks/sub_1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscription_json("sub_1", false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/webhooks/sub_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));

    let cancelled = client.cancel_subscription("sub_1").await.unwrap();
    assert!(!cancelled.is_active);

    client.delete_subscription("sub_1").await.unwrap();
}

#[tokio::test]
async fn delete_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/webhooks/sub_1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    assert!(client.delete_subscription("sub_1").await.is_ok());
}

// =============================================================================
// Error decoding
// =============================================================================

#[tokio::test]
async fn non_success_status_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/webhooks/sub_1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "message": "Cannot delete an active subscription",
            "error": "Bad Request"
        })))
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let err = client.delete_subscription("sub_1").await.unwrap_err();

    match err {
        RequestError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Cannot delete an active subscription");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let err = client.list_subscriptions().await.unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Bind and drop a server so the port is closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let config = Config::new(uri, PathBuf::from("/unused"));
    let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();

    let err = client.list_subscriptions().await.unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)));
    assert_eq!(err.status(), None);
}

// =============================================================================
// 401 interception
// =============================================================================

#[tokio::test]
async fn unauthorized_response_clears_token_for_every_endpoint() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = create_client(&server, store.clone());
    let request = NewSubscription::new("https://a", "https://b", None);

    store.set_token("tok").unwrap();
    let err = client.register("a@b.com", "pw").await.unwrap_err();
    assert_cleared("register", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.login("a@b.com", "pw").await.unwrap_err();
    assert_cleared("login", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.profile().await.unwrap_err();
    assert_cleared("profile", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.create_subscription(&request).await.unwrap_err();
    assert_cleared("create", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.list_subscriptions().await.unwrap_err();
    assert_cleared("list", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.subscription("sub_1").await.unwrap_err();
    assert_cleared("get", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.cancel_subscription("sub_1").await.unwrap_err();
    assert_cleared("cancel", &err, &store);

    store.set_token("tok").unwrap();
    let err = client.delete_subscription("sub_1").await.unwrap_err();
    assert_cleared("delete", &err, &store);
}

fn assert_cleared(name: &str, err: &RequestError, store: &MemorySessionStore) {
    assert!(err.is_unauthorized(), "{name} should be unauthorized: {err:?}");
    assert!(!store.has_token(), "{name} should leave no token");
}

#[tokio::test]
async fn unauthorized_response_broadcasts_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let mut events = client.subscribe();

    let err = client.list_subscriptions().await.unwrap_err();
    assert!(err.is_unauthorized());

    let event = events.try_recv().expect("expiry should be broadcast");
    assert_eq!(
        event,
        SessionEvent::Expired {
            path: "/webhooks".to_string()
        }
    );
}

#[tokio::test]
async fn excluded_auth_endpoints_keep_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_token("tok"));
    let client =
        create_client_with_policy(&server, store.clone(), InterceptPolicy::ExcludeAuthEndpoints);
    let mut events = client.subscribe();

    let err = client.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "unauthorized: Invalid credentials");
    assert!(store.has_token());
    assert!(events.try_recv().is_err());

    // Other endpoints are still intercepted.
    client.list_subscriptions().await.unwrap_err();
    assert!(!store.has_token());
}

// =============================================================================
// Test fire
// =============================================================================

#[tokio::test]
async fn fire_test_event_sends_type_header_and_payload_without_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook-events/sub_1"))
        .and(header("x-event-type", "custom"))
        .and(body_json(json!({"foo": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"eventId": "evt_42"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Arc::new(MemorySessionStore::with_token("tok")));
    let response = client
        .fire_test_event("sub_1", "custom", &json!({"foo": 1}))
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.event_id(), Some("evt_42"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn fire_test_event_reports_failure_status_without_clearing_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook-events/sub_1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_token("tok"));
    let client = create_client(&server, store.clone());
    let response = client
        .fire_test_event("sub_1", "user.created", &json!({}))
        .await
        .unwrap();

    assert_eq!(response.status, 401);
    assert!(!response.is_success());
    assert!(store.has_token());
}

#[test]
fn webhook_url_joins_base_and_id() {
    let config = Config::new("https://hooks.example.com/", PathBuf::from("/unused"));
    let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();
    assert_eq!(
        client.webhook_url("sub_1"),
        "https://hooks.example.com/webhook-events/sub_1"
    );
}
