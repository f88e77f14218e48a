use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{test_email, TestContext};

async fn request_reset(ctx: &TestContext, email: &str) -> String {
    ctx.server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": email }))
        .await
        .assert_status_ok();

    ctx.mailer.last_reset_token(email).unwrap()
}

#[tokio::test]
async fn reset_password_with_valid_token_changes_password() {
    let ctx = TestContext::new().await;
    let (email, _) = ctx.verified_login("donor").await;
    let token = request_reset(&ctx, &email).await;

    let response = ctx
        .server
        .put(&format!("/api/auth/reset-password/{}", token))
        .json(&json!({ "password": "NewPassword123!" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Password reset successful");

    ctx.server
        .post("/api/auth/login")
        .json(&json!({ "email": &email, "password": "NewPassword123!" }))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/auth/login")
        .json(&json!({ "email": &email, "password": crate::common::test_password() }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_token_cannot_be_reused() {
    let ctx = TestContext::new().await;
    let (email, _) = ctx.verified_login("donor").await;
    let token = request_reset(&ctx, &email).await;
    let path = format!("/api/auth/reset-password/{}", token);

    ctx.server
        .put(&path)
        .json(&json!({ "password": "NewPassword123!" }))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .put(&path)
        .json(&json!({ "password": "OtherPassword123!" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn second_reset_request_invalidates_the_first() {
    let ctx = TestContext::new().await;
    let (email, _) = ctx.verified_login("donor").await;
    let first = request_reset(&ctx, &email).await;
    let second = request_reset(&ctx, &email).await;
    assert_ne!(first, second);

    ctx.server
        .put(&format!("/api/auth/reset-password/{}", first))
        .json(&json!({ "password": "NewPassword123!" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .put(&format!("/api/auth/reset-password/{}", second))
        .json(&json!({ "password": "NewPassword123!" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, "donor").await;

    let now = Utc::now();
    let stored = ctx
        .storage
        .accounts
        .set_reset_token(&email, "expired-token", now - Duration::seconds(1), now)
        .await
        .unwrap();
    assert!(stored);

    let response = ctx
        .server
        .put("/api/auth/reset-password/expired-token")
        .json(&json!({ "password": "NewPassword123!" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn reset_password_with_short_password_returns_bad_request() {
    let ctx = TestContext::new().await;
    let (email, _) = ctx.verified_login("donor").await;
    let token = request_reset(&ctx, &email).await;

    let response = ctx
        .server
        .put(&format!("/api/auth/reset-password/{}", token))
        .json(&json!({ "password": "12345" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn reset_password_with_unknown_token_returns_bad_request() {
    let ctx = TestContext::new().await;

    ctx.server
        .put("/api/auth/reset-password/not-a-real-token")
        .json(&json!({ "password": "NewPassword123!" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
