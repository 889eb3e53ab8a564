//! Web API Authentication Tests
//!
//! Integration tests for login, lockout, one-time codes and password reset.

mod common;

use axum::http::StatusCode;
use caredesk::auth::AuthPolicy;
use caredesk::config::WebConfig;
use caredesk::store::Repository;
use chrono::Duration;
use serde_json::{json, Value};

use common::{test_web_config, TestApp, PASSWORD};

async fn login(app: &TestApp, identifier: &str, password: &str) -> axum_test::TestResponse {
    app.server
        .post("/login")
        .json(&json!({"identifier": identifier, "password": password}))
        .await
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");

    let response = login(&app, "ann@example.com", PASSWORD).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({"ok": true, "user": {"id": "u1", "name": "Ann", "email": "ann@example.com"}})
    );
}

#[tokio::test]
async fn test_login_by_name_ignores_case() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");

    let response = login(&app, "ANN", PASSWORD).await;
    response.assert_status_ok();

    let response = login(&app, "Ann@Example.COM", PASSWORD).await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/login")
        .json(&json!({"identifier": "ann@example.com"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "missing");

    let response = app
        .server
        .post("/login")
        .json(&json!({"password": PASSWORD}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = TestApp::new();

    let response = app.server.post("/login").text("not json at all").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "missing");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new();

    let response = login(&app, "nobody@example.com", PASSWORD).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "user_not_found");
}

#[tokio::test]
async fn test_wrong_password_counts_and_success_resets() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");

    let response = login(&app, "ann@example.com", "wrong-password").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_credentials");
    assert_eq!(app.user("u1").failed_attempts, 1);

    login(&app, "ann@example.com", PASSWORD)
        .await
        .assert_status_ok();
    assert_eq!(app.user("u1").failed_attempts, 0);
}

#[tokio::test]
async fn test_lockout_after_five_failures() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");

    for _ in 0..5 {
        login(&app, "ann@example.com", "wrong-password")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
    assert!(app.user("u1").locked_until.is_some());

    // Even the right password is refused while locked.
    let response = login(&app, "ann@example.com", PASSWORD).await;
    response.assert_status(StatusCode::LOCKED);
    let body: Value = response.json();
    assert_eq!(body["error"], "locked");
    assert!(body["lockedUntil"].is_i64());

    app.clock.advance(Duration::minutes(15) + Duration::seconds(1));

    login(&app, "ann@example.com", PASSWORD)
        .await
        .assert_status_ok();
    let user = app.user("u1");
    assert_eq!(user.failed_attempts, 0);
    assert!(user.locked_until.is_none());
}

#[tokio::test]
async fn test_two_factor_flow() {
    let app = TestApp::new();
    let mut user = app.add_user("u1", "Ann", "ann@example.com");
    user.two_factor = true;
    app.users.put("u1", user).unwrap();

    let response = login(&app, "ann@example.com", PASSWORD).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mfa"], true);
    assert_eq!(body["userId"], "u1");
    let code = body["demoCode"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);

    let wrong = if code == "000000" { "111111" } else { "000000" };
    let response = app
        .server
        .post("/verify-otp")
        .json(&json!({"userId": "u1", "code": wrong}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid");

    let response = app
        .server
        .post("/verify-otp")
        .json(&json!({"userId": "u1", "code": code}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"ok": true}));

    // Consumed.
    let response = app
        .server
        .post("/verify-otp")
        .json(&json!({"userId": "u1", "code": code}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "no_otp");
}

#[tokio::test]
async fn test_one_time_code_expires() {
    let app = TestApp::new();
    let mut user = app.add_user("u1", "Ann", "ann@example.com");
    user.two_factor = true;
    app.users.put("u1", user).unwrap();

    let body: Value = login(&app, "ann@example.com", PASSWORD).await.json();
    let code = body["demoCode"].as_str().unwrap().to_string();

    app.clock.advance(Duration::minutes(5) + Duration::seconds(1));

    let response = app
        .server
        .post("/verify-otp")
        .json(&json!({"userId": "u1", "code": code}))
        .await;
    response.assert_status(StatusCode::GONE);
    let body: Value = response.json();
    assert_eq!(body["error"], "expired");
}

#[tokio::test]
async fn test_demo_mode_off_hides_secrets() {
    let policy = AuthPolicy {
        demo_mode: false,
        ..AuthPolicy::default()
    };
    let app = TestApp::build(test_web_config(), policy);
    let mut user = app.add_user("u1", "Ann", "ann@example.com");
    user.two_factor = true;
    app.users.put("u1", user).unwrap();

    let body: Value = login(&app, "ann@example.com", PASSWORD).await.json();
    assert_eq!(body["mfa"], true);
    assert!(body.get("demoCode").is_none());
    assert!(app.otps.get("u1").unwrap().is_some());

    let body: Value = app
        .server
        .post("/forgot")
        .json(&json!({"email": "ann@example.com"}))
        .await
        .json();
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(app.resets.len(), 1);
}

#[tokio::test]
async fn test_first_login_with_default_password() {
    let app = TestApp::new();
    app.add_fresh_user("u2", "Ben", "ben@example.com");
    let default_password = AuthPolicy::default().default_password;

    let response = login(&app, "ben@example.com", &default_password).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({"ok": true, "mustChangePassword": true, "userId": "u2"}));

    // Credentials were written on first use.
    let user = app.user("u2");
    assert!(user.salt.is_some());
    assert!(user.hash.is_some());

    let response = app
        .server
        .post("/first-login")
        .json(&json!({"userId": "u2", "password": "brand-new-pass"}))
        .await;
    response.assert_status_ok();
    assert!(!app.user("u2").must_change_password);

    let body: Value = login(&app, "ben@example.com", "brand-new-pass").await.json();
    assert_eq!(body["user"]["id"], "u2");

    login(&app, "ben@example.com", &default_password)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_first_login_rejects_weak_password() {
    let policy = AuthPolicy {
        enforce_password_policy: true,
        ..AuthPolicy::default()
    };
    let app = TestApp::build(test_web_config(), policy);
    app.add_user("u1", "Ann", "ann@example.com");

    let response = app
        .server
        .post("/first-login")
        .json(&json!({"userId": "u1", "password": "short"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "weak_password");
}

#[tokio::test]
async fn test_forgot_unknown_email() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/forgot")
        .json(&json!({"email": "nobody@example.com"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"ok": false}));
    assert!(app.resets.is_empty());
}

#[tokio::test]
async fn test_reset_flow() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");

    let body: Value = app
        .server
        .post("/forgot")
        .json(&json!({"email": "ann@example.com"}))
        .await
        .json();
    assert_eq!(body["ok"], true);
    let token = body["token"].as_str().unwrap().to_string();

    // Checking the token does not consume it.
    for _ in 0..2 {
        let response = app
            .server
            .post("/verify-token")
            .json(&json!({"token": token}))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"ok": true, "email": "ann@example.com"})
        );
    }

    let response = app
        .server
        .post("/reset")
        .json(&json!({"token": token, "password": "another-pass"}))
        .await;
    response.assert_status_ok();

    login(&app, "ann@example.com", "another-pass")
        .await
        .assert_status_ok();

    // Single use.
    let response = app
        .server
        .post("/reset")
        .json(&json!({"token": token, "password": "third-pass-1"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_reset_clears_lockout() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");
    for _ in 0..5 {
        login(&app, "ann@example.com", "wrong-password").await;
    }
    assert!(app.user("u1").locked_until.is_some());

    let body: Value = app
        .server
        .post("/forgot")
        .json(&json!({"email": "ann@example.com"}))
        .await
        .json();
    let token = body["token"].as_str().unwrap().to_string();

    app.server
        .post("/reset")
        .json(&json!({"token": token, "password": "another-pass"}))
        .await
        .assert_status_ok();

    login(&app, "ann@example.com", "another-pass")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_reset_token_expires() {
    let app = TestApp::new();
    app.add_user("u1", "Ann", "ann@example.com");

    let body: Value = app
        .server
        .post("/forgot")
        .json(&json!({"email": "ann@example.com"}))
        .await
        .json();
    let token = body["token"].as_str().unwrap().to_string();

    app.clock.advance(Duration::hours(1) + Duration::seconds(1));

    let response = app
        .server
        .post("/verify-token")
        .json(&json!({"token": token}))
        .await;
    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"], "expired");
}

#[tokio::test]
async fn test_verify_unknown_token() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/verify-token")
        .json(&json!({"token": "does-not-exist"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "invalid_token");
}

#[tokio::test]
async fn test_login_rate_limit() {
    let config = WebConfig {
        login_rate_limit: 2,
        ..test_web_config()
    };
    let app = TestApp::build(config, AuthPolicy::default());
    app.add_user("u1", "Ann", "ann@example.com");

    login(&app, "ann@example.com", PASSWORD)
        .await
        .assert_status_ok();
    login(&app, "ann@example.com", PASSWORD)
        .await
        .assert_status_ok();

    let response = login(&app, "ann@example.com", PASSWORD).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<Value>()["error"], "rate_limited");

    // Other endpoints are not limited.
    app.server
        .post("/forgot")
        .json(&json!({"email": "ann@example.com"}))
        .await
        .assert_status_ok();
}

async fn login_from(app: &TestApp, forwarded_for: &str) -> axum_test::TestResponse {
    app.server
        .post("/login")
        .add_header("x-forwarded-for", forwarded_for)
        .json(&json!({"identifier": "ann@example.com", "password": PASSWORD}))
        .await
}

#[tokio::test]
async fn test_forwarded_header_ignored_by_default() {
    let config = WebConfig {
        login_rate_limit: 1,
        ..test_web_config()
    };
    let app = TestApp::build(config, AuthPolicy::default());
    app.add_user("u1", "Ann", "ann@example.com");

    login_from(&app, "203.0.113.1").await.assert_status_ok();
    login_from(&app, "203.0.113.2")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_header_keys_limiter_when_trusted() {
    let config = WebConfig {
        login_rate_limit: 1,
        trust_proxy_headers: true,
        ..test_web_config()
    };
    let app = TestApp::build(config, AuthPolicy::default());
    app.add_user("u1", "Ann", "ann@example.com");

    login_from(&app, "203.0.113.1").await.assert_status_ok();
    login_from(&app, "203.0.113.2").await.assert_status_ok();
    login_from(&app, "203.0.113.1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
