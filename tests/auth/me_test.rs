use axum::http::StatusCode;
use chrono::Duration;

use karnya_backend::modules::auth::model::{Identity, Role};
use karnya_backend::services::jwt::JwtService;

use crate::common::TestContext;

#[tokio::test]
async fn me_with_valid_token_returns_user_data() {
    let ctx = TestContext::new().await;
    let (email, token) = ctx.verified_login("donor").await;

    let response = ctx
        .server
        .get("/api/auth/me")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], email);
    assert_eq!(body["firstName"], "Test");
    assert!(body.get("id").is_some());
    assert!(body.get("createdAt").is_some());
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("resetPasswordToken").is_none());
}

#[tokio::test]
async fn me_without_auth_header_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/auth/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No token, authorization denied");
}

#[tokio::test]
async fn me_with_invalid_token_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/auth/me")
        .authorization_bearer("invalid-token")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Token is not valid");
}

#[tokio::test]
async fn me_with_foreign_signature_returns_unauthorized() {
    let ctx = TestContext::new().await;
    let (_, user_id) = ctx.register(&crate::common::test_email(), "donor").await;

    let forged = JwtService::new("some-other-secret".into())
        .issue_session_token(&Identity {
            id: user_id,
            email: "x@example.com".into(),
            role: Role::SuperAdmin,
        })
        .unwrap();

    ctx.server
        .get("/api/auth/me")
        .authorization_bearer(&forged)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_with_expired_token_returns_unauthorized() {
    let ctx = TestContext::new().await;
    let (_, user_id) = ctx.register(&crate::common::test_email(), "donor").await;

    let expired = ctx
        .jwt
        .issue_session_token_at(
            &Identity {
                id: user_id,
                email: "x@example.com".into(),
                role: Role::Donor,
            },
            chrono::Utc::now() - Duration::days(31),
        )
        .unwrap();

    ctx.server
        .get("/api/auth/me")
        .authorization_bearer(&expired)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_for_unknown_account_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let token = ctx
        .jwt
        .issue_session_token(&Identity {
            id: "no-such-account".into(),
            email: "ghost@example.com".into(),
            role: Role::Donor,
        })
        .unwrap();

    let response = ctx
        .server
        .get("/api/auth/me")
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Token is not valid");
}
