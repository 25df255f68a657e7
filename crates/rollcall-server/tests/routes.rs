use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use rollcall_roster::memory::MemoryPlatform;
use rollcall_roster::{DenyList, RosterService};
use rollcall_schedule::{SchedulePoster, card};
use rollcall_server::routes::{AppState, router};
use rollcall_slack::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use rollcall_types::ids::{ChannelId, MessageRef, UserId};
use rollcall_types::models::{CalendarLinks, Workout};
use rollcall_types::slack::SlackMessage;

const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn state(platform: &Arc<MemoryPlatform>, secret: Option<&str>) -> AppState<MemoryPlatform> {
    AppState {
        roster: Arc::new(RosterService::new(platform.clone(), DenyList::default())),
        poster: Arc::new(SchedulePoster::new(
            platform.clone(),
            CalendarLinks::default(),
            None,
        )),
        signing_secret: secret.map(Arc::from),
        schedule_channel: Some(ChannelId::new("CSCHED")),
    }
}

fn workout() -> Workout {
    Workout {
        ao: "The Yard".into(),
        start: "0530".into(),
        q: "Hammer".into(),
        types: String::new(),
        location: None,
        is_closed: false,
    }
}

/// Posts an Event Message the way the schedule poster does.
fn seed_event(platform: &MemoryPlatform) -> MessageRef {
    let workout = workout();
    platform.seed(
        &ChannelId::new("C1"),
        SlackMessage {
            ts: None,
            text: Some(card::workout_text(&workout)),
            blocks: card::workout_card(&workout),
        },
    )
}

fn commit_payload(target: &MessageRef, user: &str) -> serde_json::Value {
    json!({
        "type": "block_actions",
        "user": { "id": user },
        "channel": { "id": target.channel },
        "container": { "channel_id": target.channel, "message_ts": target.ts },
        "message": { "ts": target.ts },
        "actions": [{ "action_id": "commit_event", "block_id": "commits" }],
    })
}

fn form_body(payload: &serde_json::Value) -> String {
    serde_urlencoded::to_string([("payload", payload.to_string())]).unwrap()
}

/// POST to the interactivity endpoint, signing when `secret` is given.
async fn post_interaction(app: axum::Router, body: String, secret: Option<&str>) -> StatusCode {
    let mut req = axum::http::Request::builder()
        .method("POST")
        .uri("/slack/events")
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(secret) = secret {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        req = req
            .header(TIMESTAMP_HEADER, &timestamp)
            .header(SIGNATURE_HEADER, signature::sign(secret, &timestamp, body.as_bytes()));
    }
    let req = req.body(axum::body::Body::from(body)).unwrap();
    app.oneshot(req).await.unwrap().status()
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// The edit runs after the ack; give it a moment to land.
async fn wait_for_updates(platform: &MemoryPlatform, count: usize) {
    for _ in 0..100 {
        if platform.updates().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} updates, saw {}", platform.updates().len());
}

fn roster_text(platform: &MemoryPlatform, target: &MessageRef) -> String {
    let message = platform.message(target).unwrap();
    let index = message.commits_block_index().unwrap();
    message.blocks[index].text.as_ref().unwrap().text.clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn heartbeat_ok() {
    let platform = Arc::new(MemoryPlatform::new());
    let req = axum::http::Request::builder()
        .uri("/api/heartbeat")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = router(state(&platform, None)).oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Ok");
}

#[tokio::test]
async fn signed_commit_is_acked_then_applied() {
    let platform = Arc::new(MemoryPlatform::new());
    let target = seed_event(&platform);
    let app = router(state(&platform, Some(SECRET)));

    let status = post_interaction(app, form_body(&commit_payload(&target, "U1")), Some(SECRET)).await;
    assert_eq!(status, StatusCode::OK);

    wait_for_updates(&platform, 1).await;
    assert!(roster_text(&platform, &target).ends_with("*Committed:* <@U1> (1)"));

    let ephemerals = platform.ephemerals();
    assert_eq!(ephemerals.len(), 1);
    assert_eq!(ephemerals[0].user, UserId::new("U1"));
}

#[tokio::test]
async fn unsigned_request_rejected() {
    let platform = Arc::new(MemoryPlatform::new());
    let target = seed_event(&platform);
    let app = router(state(&platform, Some(SECRET)));

    let status = post_interaction(app, form_body(&commit_payload(&target, "U1")), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(platform.updates().is_empty());
}

#[tokio::test]
async fn wrong_secret_rejected() {
    let platform = Arc::new(MemoryPlatform::new());
    let target = seed_event(&platform);
    let app = router(state(&platform, Some(SECRET)));

    let status = post_interaction(
        app,
        form_body(&commit_payload(&target, "U1")),
        Some("not-the-secret"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verification_skipped_without_secret() {
    let platform = Arc::new(MemoryPlatform::new());
    let target = seed_event(&platform);
    let app = router(state(&platform, None));

    let status = post_interaction(app, form_body(&commit_payload(&target, "U1")), None).await;

    assert_eq!(status, StatusCode::OK);
    wait_for_updates(&platform, 1).await;
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() {
    let platform = Arc::new(MemoryPlatform::new());
    let app = router(state(&platform, None));

    // No payload field.
    let status = post_interaction(app.clone(), "token=abc".into(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Payload that isn't JSON.
    let body = serde_urlencoded::to_string([("payload", "{not json")]).unwrap();
    let status = post_interaction(app.clone(), body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Commit with no user.
    let payload = json!({
        "type": "block_actions",
        "channel": { "id": "C1" },
        "message": { "ts": "1.0" },
        "actions": [{ "action_id": "commit_event" }],
    });
    let status = post_interaction(app, form_body(&payload), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unrelated_interactions_are_acked() {
    let platform = Arc::new(MemoryPlatform::new());
    let app = router(state(&platform, None));

    let payload = json!({
        "type": "block_actions",
        "user": { "id": "U1" },
        "actions": [{ "action_id": "something_else" }],
    });
    let status = post_interaction(app.clone(), form_body(&payload), None).await;
    assert_eq!(status, StatusCode::OK);

    let payload = json!({ "type": "view_submission", "user": { "id": "U1" } });
    let status = post_interaction(app, form_body(&payload), None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(platform.updates().is_empty());
    assert!(platform.ephemerals().is_empty());
}

#[tokio::test]
async fn uncommit_button_round_trip() {
    let platform = Arc::new(MemoryPlatform::new());
    let target = seed_event(&platform);
    let app = router(state(&platform, None));

    post_interaction(app.clone(), form_body(&commit_payload(&target, "U1")), None).await;
    wait_for_updates(&platform, 1).await;

    // The uncommit button lives on the ephemeral, so the context points there.
    let value = platform.ephemerals()[0].blocks[1].elements[0].clone();
    let value = serde_json::to_value(value).unwrap()["value"].as_str().unwrap().to_string();
    let payload = json!({
        "type": "block_actions",
        "user": { "id": "U1" },
        "container": { "type": "message", "is_ephemeral": true },
        "actions": [{ "action_id": "uncommit_event", "value": value }],
    });
    let status = post_interaction(app, form_body(&payload), None).await;
    assert_eq!(status, StatusCode::OK);

    wait_for_updates(&platform, 2).await;
    assert!(roster_text(&platform, &target).ends_with("*Committed:* None yet"));
}

#[tokio::test]
async fn schedule_posts_to_requested_channel() {
    let platform = Arc::new(MemoryPlatform::new());
    let app = router(state(&platform, None));

    let (status, body) = post_json(
        app,
        "/api/schedule",
        json!({
            "channel": "C9",
            "workouts": [{ "ao": "The Yard", "start": "0530", "q": "Hammer" }],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posted"], 2);
    let posted = platform.posted();
    assert!(posted.iter().all(|m| m.channel == ChannelId::new("C9")));
}

#[tokio::test]
async fn schedule_defaults_to_configured_channel() {
    let platform = Arc::new(MemoryPlatform::new());
    let app = router(state(&platform, None));

    let (status, body) = post_json(app, "/api/schedule", json!({ "workouts": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posted"], 0);
}

#[tokio::test]
async fn schedule_platform_failure_is_bad_gateway() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.reject_channel(&ChannelId::new("CSCHED"));
    let app = router(state(&platform, None));

    let (status, _) = post_json(
        app,
        "/api/schedule",
        json!({ "workouts": [{ "ao": "The Yard", "start": "0530", "q": "Hammer" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn schedule_without_channel_is_bad_request() {
    let platform = Arc::new(MemoryPlatform::new());
    let mut state = state(&platform, None);
    state.schedule_channel = None;

    let (status, _) = post_json(router(state), "/api/schedule", json!({ "workouts": [] })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
