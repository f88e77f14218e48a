use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_email, SentMail, TestContext};

#[tokio::test]
async fn forgot_password_mails_a_reset_link() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, "donor").await;

    let response = ctx
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": &email }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Password reset email sent");

    let reset_url = ctx
        .mailer
        .sent()
        .into_iter()
        .find_map(|mail| match mail {
            SentMail::PasswordReset { reset_url, .. } => Some(reset_url),
            _ => None,
        })
        .unwrap();
    assert!(reset_url.starts_with("http://localhost:3000/reset-password?token="));
}

#[tokio::test]
async fn forgot_password_for_unknown_email_returns_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": test_email() }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn forgot_password_with_invalid_email_returns_bad_request() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": "not-an-email" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forgot_password_works_for_unverified_accounts() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, "receiver").await;

    ctx.server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": &email }))
        .await
        .assert_status_ok();

    assert!(ctx.mailer.last_reset_token(&email).is_some());
}
