#![allow(clippy::unwrap_used)]
// Integration tests for `Sdk` bootstrap and the managers using wiremock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use playvault_core::events::{
    ConnectionFailed, SdkInitialized, ServiceInitialized, SignedIn, topics,
};
use playvault_core::{
    CoreError, FeedbackCategory, HostSelection, LogLevel, NoData, RetryPolicy, Sdk, SdkConfig,
    SdkContext,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(hosts: &[&str]) -> SdkConfig {
    let hosts = hosts.iter().map(|h| Url::parse(h).unwrap()).collect();
    let mut config = SdkConfig::new(hosts, SecretString::from("game-key".to_string()));
    config.retry = RetryPolicy::new(1, Duration::from_millis(10), Duration::from_secs(5));
    config.probe_timeout = Duration::from_secs(2);
    config
}

async fn setup() -> (MockServer, Sdk) {
    let server = MockServer::start().await;
    let mut config = config_for(&[&server.uri()]);
    config.host_selection = HostSelection::Fixed;
    let sdk = Sdk::initialize(config).await.unwrap();
    (server, sdk)
}

async fn signed_in() -> (MockServer, Sdk) {
    let (server, sdk) = setup().await;
    Mock::given(method("POST"))
        .and(path("/auth/guest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-guest",
            "player_id": "p-42",
            "guest": true
        })))
        .mount(&server)
        .await;
    sdk.auth().guest_login("device-1").await.unwrap();
    (server, sdk)
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_selects_first_healthy_host_in_order() {
    let down = MockServer::start().await;
    let up = MockServer::start().await;
    let also_up = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&down)
        .await;
    for server in [&up, &also_up] {
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    let sdk = Sdk::initialize(config_for(&[&down.uri(), &up.uri(), &also_up.uri()]))
        .await
        .unwrap();

    let active = sdk.active_host().unwrap();
    assert_eq!(active.as_str(), Url::parse(&up.uri()).unwrap().as_str());
}

#[tokio::test]
async fn test_bootstrap_announces_services_then_sdk() {
    let server = MockServer::start().await;
    let context = SdkContext::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    context
        .bus()
        .on::<ServiceInitialized>(topics::SERVICE_INITIALIZED, move |event| {
            sink.lock().unwrap().push(event.service.to_string());
        });
    let sink = Arc::clone(&seen);
    context
        .bus()
        .on::<SdkInitialized>(topics::SDK_INITIALIZED, move |_| {
            sink.lock().unwrap().push("sdk".to_string());
        });

    let mut config = config_for(&[&server.uri()]);
    config.host_selection = HostSelection::Fixed;
    let sdk = Sdk::initialize_with(config, context).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 9);
    assert_eq!(seen[0], "auth");
    assert_eq!(seen.last().unwrap(), "sdk");
    assert_eq!(sdk.services().len(), 8);
}

#[tokio::test]
async fn test_late_subscriber_sees_sdk_initialized_while_alive() {
    let (_server, sdk) = setup().await;
    let replayed = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&replayed);
    sdk.context()
        .bus()
        .on::<SdkInitialized>(topics::SDK_INITIALIZED, move |event| {
            assert_eq!(event.services.len(), 8);
            counter.fetch_add(1, Ordering::SeqCst);
        });

    assert_eq!(replayed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_reachable_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let context = SdkContext::new();
    let failed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&failed);
    context
        .bus()
        .on::<ConnectionFailed>(topics::CONNECTION_FAILED, move |event| {
            *sink.lock().unwrap() = Some(event.attempts.len());
        });

    let config = config_for(&[&server.uri(), "http://127.0.0.1:1"]);
    let result = Sdk::initialize_with(config, context.clone()).await;

    assert!(matches!(
        result,
        Err(CoreError::NoReachableHost { ref candidates }) if candidates.len() == 2
    ));
    assert_eq!(*failed.lock().unwrap(), Some(2));
    assert!(context.session().active_host().is_none());
}

#[tokio::test]
async fn test_shutdown_clears_session_and_signals() {
    let (_server, sdk) = signed_in().await;
    let shutdowns = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&shutdowns);
    sdk.context()
        .bus()
        .on::<NoData>(topics::SDK_SHUTDOWN, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    sdk.shutdown();

    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    assert!(sdk.active_host().is_none());
    assert!(!sdk.auth().is_signed_in());
}

#[tokio::test]
async fn test_shutdown_stops_replaying_startup_and_sign_in() {
    let (_server, sdk) = signed_in().await;
    sdk.shutdown();
    assert!(sdk.auth().current_player().is_none());

    let replays = Arc::new(AtomicU32::new(0));
    let bus = sdk.context().bus();
    let counter = Arc::clone(&replays);
    bus.on::<SdkInitialized>(topics::SDK_INITIALIZED, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&replays);
    bus.on::<SignedIn>(topics::AUTH_SIGNED_IN, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(replays.load(Ordering::SeqCst), 0);
    assert_eq!(sdk.services().len(), 8);
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_guest_login_stores_token_and_publishes() {
    let (server, sdk) = signed_in().await;

    let player = sdk.auth().current_player().unwrap();
    assert_eq!(player.player_id, "p-42");
    assert!(player.guest);

    // Late subscriber still gets the sign-in while the player is current.
    let replayed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&replayed);
    sdk.context()
        .bus()
        .on::<SignedIn>(topics::AUTH_SIGNED_IN, move |event| {
            *sink.lock().unwrap() = Some(event.player_id.clone());
        });
    assert_eq!(replayed.lock().unwrap().as_deref(), Some("p-42"));

    Mock::given(method("GET"))
        .and(path("/saves"))
        .and(header("Authorization", "Bearer tok-guest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    assert!(sdk.cloud_save().list_slots().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_rejected_maps_to_unauthorized() {
    let (server, sdk) = setup().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid credentials",
            "code": "invalid_credentials"
        })))
        .mount(&server)
        .await;

    let result = sdk
        .auth()
        .login("ash@example.com", &SecretString::from("wrong".to_string()))
        .await;

    assert!(matches!(
        result,
        Err(CoreError::Unauthorized { ref message }) if message.contains("Invalid credentials")
    ));
    assert!(!sdk.auth().is_signed_in());
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let (server, sdk) = signed_in().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    sdk.auth().logout().await.unwrap();

    assert!(!sdk.auth().is_signed_in());
    assert!(sdk.auth().current_player().is_none());
    assert!(!sdk.context().bus().has_cached(topics::AUTH_SIGNED_IN));
}

// ── Session-bound managers ──────────────────────────────────────────

#[tokio::test]
async fn test_session_endpoints_require_sign_in() {
    let (server, sdk) = setup().await;

    assert!(matches!(
        sdk.cloud_save().list_slots().await,
        Err(CoreError::NotSignedIn)
    ));
    assert!(matches!(
        sdk.gift_codes().redeem("WELCOME").await,
        Err(CoreError::NotSignedIn)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cloud_save_round_trip_and_missing_slot() {
    let (server, sdk) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/saves/slot-1"))
        .and(header("Content-Type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/saves/slot-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"state".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/saves/slot-2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    sdk.cloud_save().save("slot-1", b"state".to_vec()).await.unwrap();
    let loaded = sdk.cloud_save().load("slot-1").await.unwrap().unwrap();
    assert_eq!(loaded.as_ref(), b"state");
    assert_eq!(sdk.cloud_save().load("slot-2").await.unwrap(), None);
}

#[tokio::test]
async fn test_invalid_slot_is_rejected_before_sending() {
    let (server, sdk) = signed_in().await;
    let before = server.received_requests().await.unwrap().len();

    let result = sdk.cloud_save().load("../etc").await;

    assert!(matches!(result, Err(CoreError::Validation { .. })));
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

// ── Cached reads ────────────────────────────────────────────────────

#[tokio::test]
async fn test_leaderboard_cache_and_invalidation_on_submit() {
    let (server, sdk) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/leaderboards/weekly/top"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "rank": 1, "player_id": "p-1", "display_name": "Ash", "score": 900 },
            { "rank": 2, "player_id": "p-42", "score": 750 }
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/leaderboards/weekly/scores"))
        .and(body_json(json!({ "score": 800 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accepted": true,
            "rank": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first = sdk.leaderboard().top("weekly", 10).await.unwrap();
    let cached = sdk.leaderboard().top("weekly", 10).await.unwrap();
    assert!(Arc::ptr_eq(&first, &cached));
    assert_eq!(first[0].display_name.as_deref(), Some("Ash"));

    let submitted = sdk.leaderboard().submit("weekly", 800).await.unwrap();
    assert!(submitted.accepted);
    assert_eq!(submitted.rank, Some(2));

    let refetched = sdk.leaderboard().top("weekly", 10).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &refetched));
}

#[tokio::test]
async fn test_leaderboard_limit_bounds() {
    let (_server, sdk) = setup().await;
    assert!(matches!(
        sdk.leaderboard().top("weekly", 0).await,
        Err(CoreError::Validation { .. })
    ));
    assert!(matches!(
        sdk.leaderboard().top("weekly", 101).await,
        Err(CoreError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_remote_config_fetch_get_and_refresh() {
    let (server, sdk) = setup().await;

    Mock::given(method("GET"))
        .and(path("/remote-config"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"total":2,"configs":{"motd":"Season 3, now live","max_lives":"5"}}"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let rc = sdk.remote_config();
    assert_eq!(rc.get("motd").await.unwrap().as_deref(), Some("Season 3, now live"));
    assert_eq!(rc.get_parsed::<u32>("max_lives").await.unwrap(), Some(5));
    assert_eq!(rc.get("missing").await.unwrap(), None);

    rc.refresh().await.unwrap();
}

#[tokio::test]
async fn test_news_latest_is_cached() {
    let (server, sdk) = setup().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "n1",
            "title": "Patch 1.2",
            "body": "Balance changes",
            "published_at": "2026-10-01T12:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let news = sdk.news().latest().await.unwrap();
    assert_eq!(news[0].title, "Patch 1.2");
    sdk.news().latest().await.unwrap();
}

// ── Fire-and-forget endpoints ───────────────────────────────────────

#[tokio::test]
async fn test_gift_code_plain_text_reply() {
    let (server, sdk) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/gift-codes/redeem"))
        .and(body_json(json!({ "code": "WELCOME" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Enjoy 100 gems"))
        .mount(&server)
        .await;

    let resp = sdk.gift_codes().redeem("  WELCOME ").await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.message, "Enjoy 100 gems");
}

#[tokio::test]
async fn test_feedback_and_remote_log_payloads() {
    let (server, sdk) = setup().await;

    Mock::given(method("POST"))
        .and(path("/feedback"))
        .and(body_json(json!({ "category": "bug", "message": "Crash on load" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Thanks!"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ack = sdk
        .feedback()
        .submit(FeedbackCategory::Bug, "Crash on load")
        .await
        .unwrap();
    assert_eq!(ack.message, "Thanks!");

    sdk.remote_log()
        .send(LogLevel::Warning, "low memory")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let log: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(log["level"], "warning");
    assert_eq!(log["message"], "low memory");
}
