use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_email, test_password, TestContext};

#[tokio::test]
async fn login_before_verification_is_rejected_with_account_id() {
    let ctx = TestContext::new().await;
    let email = test_email();
    let (_, user_id) = ctx.register(&email, "donor").await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Please verify your email before logging in");
    assert_eq!(body["requiresVerification"], true);
    assert_eq!(body["userId"], user_id);
}

#[tokio::test]
async fn login_after_verification_returns_session() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, "receiver").await;
    let token = ctx.mailer.last_verification_token(&email).unwrap();

    ctx.server
        .post("/api/auth/verify-email")
        .json(&json!({ "token": token }))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["isVerified"], true);
    assert_eq!(body["user"]["role"], "receiver");

    let session = body["token"].as_str().unwrap();
    ctx.server
        .get("/api/auth/me")
        .authorization_bearer(session)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn login_with_wrong_password_returns_invalid_credentials() {
    let ctx = TestContext::new().await;
    let (email, _) = ctx.verified_login("donor").await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": &email, "password": "WrongPassword123!" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");
    assert!(body.get("userId").is_none());
}

#[tokio::test]
async fn login_with_unknown_email_matches_wrong_password() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": test_email(), "password": test_password() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Invalid credentials" }));
}

#[tokio::test]
async fn login_with_wrong_password_on_unverified_account_hides_verification_state() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, "donor").await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": &email, "password": "WrongPassword123!" }))
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");
    assert!(body.get("requiresVerification").is_none());
}

#[tokio::test]
async fn login_with_missing_password_returns_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": test_email() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"][0]["field"], "password");
}
