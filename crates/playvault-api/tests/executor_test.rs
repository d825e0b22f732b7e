#![allow(clippy::unwrap_used)]
// Integration tests for `RequestExecutor` using wiremock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use playvault_api::events::{RateLimited, RequestFailed, RequestStarted, RetryAttempted, topics};
use playvault_api::{
    CancellationToken, EndpointCall, FailureKind, Handler, MessageResponse, Payload, RequestExecutor,
    RetryPolicy, SdkContext, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const API_KEY: &str = "test-key";

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(10), Duration::from_secs(5))
}

fn executor_for(uri: &str, policy: Option<RetryPolicy>) -> RequestExecutor {
    let context = SdkContext::new();
    context.session().set_active_host_str(uri).unwrap();
    let mut builder = RequestExecutor::builder(
        context,
        TransportConfig::new(SecretString::from(API_KEY.to_string())),
    );
    if let Some(policy) = policy {
        builder = builder.retry_policy(policy);
    }
    builder.build().unwrap()
}

async fn setup() -> (MockServer, RequestExecutor) {
    let server = MockServer::start().await;
    let executor = executor_for(&server.uri(), Some(fast_policy(3)));
    (server, executor)
}

/// Count events of type `T` published on `topic`.
fn count_events<T: Send + Sync + 'static>(executor: &RequestExecutor, topic: &str) -> Arc<AtomicU32> {
    let count = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&count);
    executor.context().bus().on::<T>(topic, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    count
}

#[derive(Debug, Deserialize, PartialEq)]
struct Player {
    id: String,
    level: u32,
}

impl Payload for Player {}

// ── Structured GET ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_decodes_structured_body_and_sends_api_key() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .and(path("/players/me"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "p1", "level": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = executor.get::<Player>("/players/me", false).await;

    assert!(resp.success);
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.data,
        Some(Player {
            id: "p1".into(),
            level: 7
        })
    );
}

#[tokio::test]
async fn test_bearer_token_only_when_session_requested() {
    let (server, executor) = setup().await;
    executor
        .context()
        .session()
        .set_session_token(SecretString::from("tok-1".to_string()));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let _ = executor.get::<serde_json::Value>("/public", false).await;
    let _ = executor.get::<serde_json::Value>("/private", true).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[1].headers.get("authorization").unwrap(),
        "Bearer tok-1"
    );
}

#[tokio::test]
async fn test_session_call_without_token_omits_header() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let resp = executor.get::<serde_json::Value>("/private", true).await;
    assert!(resp.success);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

// ── Retry budget ────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_retries_until_budget_exhausted() {
    let (server, executor) = setup().await;
    let started = count_events::<RequestStarted>(&executor, topics::REQUEST_STARTED);
    let retried = count_events::<RetryAttempted>(&executor, topics::RETRY_ATTEMPTED);

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(4)
        .mount(&server)
        .await;

    let resp = executor.get::<serde_json::Value>("/news", false).await;

    assert!(!resp.success);
    assert_eq!(resp.status, 503);
    assert_eq!(resp.failure, Some(FailureKind::RetriesExhausted));
    assert!(resp.error.unwrap().contains("busy"));
    assert_eq!(started.load(Ordering::SeqCst), 4);
    // No retry event after the final attempt.
    assert_eq!(retried.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_server_error_then_success() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resp = executor.get::<Vec<serde_json::Value>>("/news", false).await;

    assert!(resp.success);
    assert_eq!(resp.data, Some(vec![]));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

// ── Rate limiting ───────────────────────────────────────────────────

#[tokio::test]
async fn test_rate_limit_honours_retry_after() {
    let (server, executor) = setup().await;
    let limited = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&limited);
    executor
        .context()
        .bus()
        .on::<RateLimited>(topics::RATE_LIMITED, move |event| {
            sink.lock().unwrap().push(event.retry_after);
        });

    Mock::given(method("GET"))
        .and(path("/leaderboards/weekly"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0.25"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/leaderboards/weekly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let before = Instant::now();
    let resp = executor
        .get::<serde_json::Value>("/leaderboards/weekly", false)
        .await;

    assert!(resp.success);
    assert!(before.elapsed() >= Duration::from_millis(250));
    assert_eq!(*limited.lock().unwrap(), vec![Duration::from_millis(250)]);
}

#[tokio::test]
async fn test_rate_limit_without_header_uses_fixed_delay() {
    let (server, executor) = setup().await;
    let limited = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&limited);
    executor
        .context()
        .bus()
        .on::<RateLimited>(topics::RATE_LIMITED, move |event| {
            sink.lock().unwrap().push(event.retry_after);
        });

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "whenever"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let resp = executor.get::<()>("/ping", false).await;

    assert!(resp.success);
    assert_eq!(*limited.lock().unwrap(), vec![Duration::from_millis(10)]);
}

#[tokio::test]
async fn test_rate_limit_consumes_retry_budget() {
    let server = MockServer::start().await;
    let executor = executor_for(&server.uri(), Some(fast_policy(1)));
    let limited = count_events::<RateLimited>(&executor, topics::RATE_LIMITED);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let resp = executor.get::<serde_json::Value>("/busy", false).await;

    assert!(!resp.success);
    assert_eq!(resp.status, 429);
    assert_eq!(resp.failure, Some(FailureKind::RetriesExhausted));
    // Only the first 429 announces a wait; the last one ends the call.
    assert_eq!(limited.load(Ordering::SeqCst), 1);
}

// ── Terminal failures ───────────────────────────────────────────────

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (server, executor) = setup().await;
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    executor
        .context()
        .bus()
        .on::<RequestFailed>(topics::REQUEST_FAILED, move |event| {
            sink.lock().unwrap().push(event.clone());
        });

    Mock::given(method("GET"))
        .and(path("/leaderboards/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Leaderboard not found",
            "code": "leaderboard_not_found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = executor
        .get::<serde_json::Value>("/leaderboards/missing", false)
        .await;

    assert!(!resp.success);
    assert_eq!(resp.status, 404);
    assert_eq!(resp.failure, Some(FailureKind::Client));
    assert!(resp.error.unwrap().contains("Leaderboard not found"));

    let failures = failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].attempts, 1);
    assert_eq!(failures[0].kind, FailureKind::Client);
}

#[tokio::test]
async fn test_client_error_with_empty_body_uses_status_text() {
    let (server, executor) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let resp = executor
        .post::<serde_json::Value, _>("/feedback", &json!({ "message": "" }), false)
        .await;

    assert_eq!(resp.status, 400);
    assert!(resp.error.unwrap().contains("HTTP 400"));
}

#[tokio::test]
async fn test_connection_failure_is_reported_not_raised() {
    // Nothing listens on port 1.
    let executor = executor_for("http://127.0.0.1:1", Some(fast_policy(0)));

    let resp = executor.get::<serde_json::Value>("/news", false).await;

    assert!(!resp.success);
    assert_eq!(resp.status, 0);
    assert_eq!(resp.failure, Some(FailureKind::RetriesExhausted));
    assert!(resp.data.is_none());
}

// ── Preconditions ───────────────────────────────────────────────────

#[tokio::test]
async fn test_no_active_host_sends_nothing() {
    let (server, executor) = setup().await;
    executor.context().session().clear_active_host();
    let started = count_events::<RequestStarted>(&executor, topics::REQUEST_STARTED);

    let resp = executor.get::<serde_json::Value>("/news", false).await;

    assert!(!resp.success);
    assert_eq!(resp.failure, Some(FailureKind::NoActiveHost));
    assert_eq!(started.load(Ordering::SeqCst), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_policy_is_not_initialized() {
    let server = MockServer::start().await;
    let executor = executor_for(&server.uri(), None);

    let resp = executor.get::<serde_json::Value>("/news", false).await;

    assert_eq!(resp.failure, Some(FailureKind::NotInitialized));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Decoding ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_decode_failure_is_terminal() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = executor.get::<Player>("/players/me", false).await;

    assert!(!resp.success);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.failure, Some(FailureKind::Decode));
}

#[tokio::test]
async fn test_plain_text_message_response() {
    let (server, executor) = setup().await;

    Mock::given(method("POST"))
        .and(path("/gift-codes/redeem"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Code redeemed"))
        .mount(&server)
        .await;

    let resp = executor
        .post::<MessageResponse, _>("/gift-codes/redeem", &json!({ "code": "WELCOME" }), true)
        .await;

    assert_eq!(
        resp.data,
        Some(MessageResponse {
            success: true,
            message: "Code redeemed".into()
        })
    );
}

#[tokio::test]
async fn test_bare_array_decodes_into_vec() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "level": 1 },
            { "id": "b", "level": 2 }
        ])))
        .mount(&server)
        .await;

    let players = executor
        .get::<Vec<Player>>("/players", false)
        .await
        .into_result()
        .unwrap();

    assert_eq!(players.len(), 2);
    assert_eq!(players[1].id, "b");
}

// ── Binary payloads ─────────────────────────────────────────────────

#[tokio::test]
async fn test_get_binary_no_content_is_not_found() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .and(path("/saves/slot-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let resp = executor.get_binary("/saves/slot-1", true).await;

    assert!(resp.success);
    assert!(!resp.found);
    assert!(resp.data.is_none());
}

#[tokio::test]
async fn test_get_binary_sends_octet_stream_accept() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .and(path("/saves/slot-1"))
        .and(header("Accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8, 1, 2, 255]))
        .expect(1)
        .mount(&server)
        .await;

    let resp = executor.get_binary("/saves/slot-1", true).await;

    assert!(resp.found);
    assert_eq!(resp.data.unwrap().as_ref(), &[0_u8, 1, 2, 255]);
}

#[tokio::test]
async fn test_post_binary_uploads_raw_bytes() {
    let (server, executor) = setup().await;

    Mock::given(method("POST"))
        .and(path("/saves/slot-2"))
        .and(header("Content-Type", "application/octet-stream"))
        .and(body_bytes(vec![9_u8, 8, 7]))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let resp = executor
        .post_binary::<()>("/saves/slot-2", vec![9_u8, 8, 7], true)
        .await;

    assert!(resp.success);
}

// ── Session refresh and cancellation ────────────────────────────────

#[tokio::test]
async fn test_token_refreshed_between_attempts_is_used() {
    let (server, executor) = setup().await;
    let session = Arc::clone(executor.context().session());
    session.set_session_token(SecretString::from("stale".to_string()));

    let refresh = Handler::new(move |_: &RetryAttempted| {
        session.set_session_token(SecretString::from("fresh".to_string()));
    });
    executor
        .context()
        .bus()
        .subscribe(topics::RETRY_ATTEMPTED, &refresh);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let resp = executor.get::<serde_json::Value>("/profile", true).await;
    assert!(resp.success);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get("authorization").unwrap(), "Bearer stale");
    assert_eq!(requests[1].headers.get("authorization").unwrap(), "Bearer fresh");
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_call() {
    let (server, executor) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let before = Instant::now();
    let resp = executor
        .execute_cancellable::<serde_json::Value>(EndpointCall::get("/slow"), &cancel)
        .await;

    assert_eq!(resp.failure, Some(FailureKind::Cancelled));
    assert!(before.elapsed() < Duration::from_secs(5));
}
