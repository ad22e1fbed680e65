use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{Value, json};

use passcode_testing::app::{TestApp, default_settings};

use crate::helpers::wrong_code;

#[tokio::test]
async fn should_issue_and_verify_over_http() {
    let app = TestApp::new();

    let resp = app
        .server
        .post("/auth/request-code")
        .json(&json!({ "identity": "a@b.com", "role": "candidate" }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["message"], "login code sent");
    assert_eq!(body["expires_at"], "2026-01-01T12:10:00.000Z");

    let code = app.notifier.last_code();
    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": code }))
        .await;
    resp.assert_status_ok();
    resp.assert_json(&json!({ "identity": "a@b.com", "role": "candidate" }));

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": code }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "CHALLENGE_NOT_FOUND");
}

#[tokio::test]
async fn should_accept_legacy_field_names() {
    let app = TestApp::new();

    app.server
        .post("/auth/request-code")
        .json(&json!({ "email": "User@Example.com", "role": "employer" }))
        .await
        .assert_status_ok();
    let code = app.notifier.last_code();

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "email": "user@example.com", "otp": code }))
        .await;
    resp.assert_status_ok();
    resp.assert_json(&json!({ "identity": "user@example.com", "role": "employer" }));
}

#[tokio::test]
async fn should_reject_missing_fields_with_400() {
    let app = TestApp::new();

    let resp = app
        .server
        .post("/auth/request-code")
        .json(&json!({ "identity": "a@b.com" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
    assert_eq!(body["message"], "identity and role are required");

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "code": "123456" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn should_reject_malformed_json_with_400() {
    let app = TestApp::new();

    let resp = app
        .server
        .post("/auth/request-code")
        .json(&json!({ "identity": 42, "role": "candidate" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn should_accept_numeric_code() {
    let app = TestApp::new();
    let code = app.request_code("a@b.com", "candidate").await;
    let numeric: u64 = code.parse().unwrap();

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": numeric }))
        .await;
    resp.assert_status_ok();
    resp.assert_json(&json!({ "identity": "a@b.com", "role": "candidate" }));
}

#[tokio::test]
async fn should_reject_non_textual_code_with_400() {
    let app = TestApp::new();
    app.request_code("a@b.com", "candidate").await;

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": ["123456"] }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn should_distinguish_failure_messages() {
    let app = TestApp::new();
    let code = app.request_code("a@b.com", "candidate").await;

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": wrong_code(&code) }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "CODE_MISMATCH");
    assert_eq!(body["message"], "incorrect code");

    app.clock.advance(Duration::minutes(11));
    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": code }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "CHALLENGE_EXPIRED");
    assert_eq!(body["message"], "code has expired, request a new one");

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": code }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "CHALLENGE_NOT_FOUND");
    assert_eq!(body["message"], "no code was requested for this identity");
}

#[tokio::test]
async fn should_return_429_when_attempts_exhausted() {
    let mut settings = default_settings();
    settings.max_attempts = 1;
    let app = TestApp::with_settings(settings);
    let code = app.request_code("a@b.com", "candidate").await;

    let resp = app
        .server
        .post("/auth/verify-code")
        .json(&json!({ "identity": "a@b.com", "code": wrong_code(&code) }))
        .await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "ATTEMPTS_EXHAUSTED");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn should_serve_health_probes() {
    let app = TestApp::new();
    app.server.get("/healthz").await.assert_status_ok();
    app.server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_tag_responses_with_request_id() {
    let app = TestApp::new();
    let resp = app.server.get("/healthz").await;
    let id = resp.header("x-request-id");
    assert!(!id.is_empty(), "x-request-id should be set");
}

#[tokio::test]
async fn should_use_json_envelope_for_unknown_routes() {
    let app = TestApp::new();

    let resp = app.server.get("/auth/nope").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "NOT_FOUND");

    let resp = app.server.get("/auth/verify-code").await;
    resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "METHOD_NOT_ALLOWED");
}
