//! Integration tests for the facilitator API.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` against
//! the in-memory store, without starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use facilitator_api::{AppState, build_router};
use facilitator_core::{AuthConfig, BroadcastHub, Channel, Services, Stores};
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    let auth = AuthConfig {
        jwt_secret: String::from("api-test-secret-long-enough"),
        token_ttl_secs: 3600,
        bcrypt_cost: 4,
    };
    let services = Services::new(Stores::in_memory(), Arc::new(BroadcastHub::new()), &auth);
    Arc::new(AppState::new(services))
}

/// Send a request and return the status plus the parsed JSON body
/// (`Value::Null` for an empty body).
async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register and log in a facilitator, returning the bearer token.
async fn login(router: &Router) -> String {
    let credentials = json!({
        "email": "admin@arctic-echo.com",
        "password": "admin123",
        "role": "facilitator",
    });
    let (status, _) = send(
        router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(router, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_owned()
}

async fn create_participant(router: &Router, token: &str, name: &str) -> Value {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/participants",
        Some(token),
        Some(json!({ "name": name, "role": "Incident Manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

// =========================================================================
// Health and auth
// =========================================================================

#[tokio::test]
async fn health_is_public() {
    let router = build_router(make_test_state(), &[]);
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 0);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let router = build_router(make_test_state(), &[]);

    let (status, body) = send(&router, Method::GET, "/api/participants", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["status"], 401);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/session/start",
        Some("not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let (status, me) = send(&router, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@arctic-echo.com");
    assert_eq!(me["role"], "facilitator");
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let router = build_router(make_test_state(), &[]);
    login(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "ADMIN@arctic-echo.com", "password": "another-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let router = build_router(make_test_state(), &[]);
    login(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@arctic-echo.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid credentials");
}

// =========================================================================
// Sessions
// =========================================================================

#[tokio::test]
async fn session_lifecycle() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let (status, body) = send(&router, Method::GET, "/api/session/status", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (_, first) = send(&router, Method::POST, "/api/session/start", Some(&token), None).await;
    let (_, second) = send(&router, Method::POST, "/api/session/start", Some(&token), None).await;
    assert_eq!(second["status"], "active");
    assert_ne!(first["id"], second["id"]);

    let (_, status_body) = send(&router, Method::GET, "/api/session/status", Some(&token), None).await;
    assert_eq!(status_body["id"], second["id"]);

    let first_uri = format!("/api/session/{}", first["id"].as_str().unwrap());
    let (status, old) = send(&router, Method::GET, &first_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(old["status"], "stopped");
    assert!(!old["endedAt"].is_null());

    let (_, stopped) = send(&router, Method::POST, "/api/session/stop", Some(&token), None).await;
    assert_eq!(stopped["id"], second["id"]);
    assert_eq!(stopped["status"], "stopped");

    let (status, again) = send(&router, Method::POST, "/api/session/stop", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(again.is_null());

    let (_, history) = send(&router, Method::GET, "/api/session", Some(&token), None).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn session_lookup_rejects_bad_and_unknown_ids() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let (status, body) = send(&router, Method::GET, "/api/session/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let unknown = format!("/api/session/{}", facilitator_types::SessionId::new());
    let (status, body) = send(&router, Method::GET, &unknown, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

// =========================================================================
// CRUD
// =========================================================================

#[tokio::test]
async fn participant_crud() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let created = create_participant(&router, &token, "Alice Johnson").await;
    assert_eq!(created["status"], "active");
    let uri = format!("/api/participants/{}", created["id"].as_str().unwrap());

    let (status, fetched) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Alice Johnson");

    let (status, patched) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "inactive");
    assert_eq!(patched["name"], "Alice Johnson");

    let (_, all) = send(&router, Method::GET, "/api/participants", Some(&token), None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/participants",
        Some(&token),
        Some(json!({ "name": "", "role": "Agile Lead" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({ "type": "earthquake", "title": "t", "description": "d" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn score_for_unknown_participant_is_not_found() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/scores",
        Some(&token),
        Some(json!({
            "participantId": facilitator_types::ParticipantId::new(),
            "value": 95.5,
            "reason": "Outstanding incident response",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn score_creation_is_broadcast() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state), &[]);
    let token = login(&router).await;
    let alice = create_participant(&router, &token, "Alice Johnson").await;

    let mut subscription = state.services.hub.attach().await.unwrap();
    let (status, score) = send(
        &router,
        Method::POST,
        "/api/scores",
        Some(&token),
        Some(json!({
            "participantId": alice["id"],
            "value": 95.5,
            "reason": "Outstanding incident response",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(score["value"], 95.5);

    let notification = subscription.try_recv().unwrap();
    assert_eq!(notification.channel, Channel::ScoreUpdated);
    assert_eq!(notification.payload, score);
    assert!(notification.payload.get("participant").is_none());
    assert!(subscription.try_recv().is_none());

    let uri = format!("/api/scores/{}", score["id"].as_str().unwrap());
    let (status, fetched) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["value"], 95.5);
    assert_eq!(fetched["participant"]["id"], alice["id"]);
    assert_eq!(fetched["participant"]["name"], "Alice Johnson");
}

#[tokio::test]
async fn feedback_can_be_filtered_by_participant() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;
    let alice = create_participant(&router, &token, "Alice Johnson").await;
    let bob = create_participant(&router, &token, "Bob Smith").await;

    for (participant, message) in [(&alice, "Great response"), (&bob, "Good process")] {
        let (status, _) = send(
            &router,
            Method::POST,
            "/api/feedback",
            Some(&token),
            Some(json!({ "participantId": participant["id"], "message": message })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/api/feedback?participantId={}", alice["id"].as_str().unwrap());
    let (status, filtered) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.first().unwrap()["message"], "Great response");
    assert_eq!(filtered.first().unwrap()["participant"]["name"], "Alice Johnson");

    let (_, all) = send(&router, Method::GET, "/api/feedback", Some(&token), None).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|f| f["participant"]["id"] == f["participantId"]));

    let (status, _) = send(
        &router,
        Method::GET,
        "/api/feedback?participantId=nope",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seed_endpoint_populates_the_store() {
    let router = build_router(make_test_state(), &[]);
    let token = login(&router).await;

    let (status, summary) = send(&router, Method::POST, "/api/seed", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["participants"], 3);
    assert_eq!(summary["adminCreated"], false);

    let (_, events) = send(&router, Method::GET, "/api/events", Some(&token), None).await;
    assert_eq!(events.as_array().unwrap().len(), 2);
}
