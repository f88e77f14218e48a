use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::extractor::AuthUser;
use super::schema::{
    AccountResponse, EmailRequest, LoginRequest, MessageResponse, RegisterRequest,
    ResetPasswordRequest, SessionResponse, VerifyEmailRequest, VerifyEmailResponse,
};
use super::service::AccountService;
use crate::error::ApiError;
use crate::services::metrics::AuthMetricsCollector;
use crate::AppState;
use validator::Validate;

/// Counts the outcome of an auth operation and passes the result through.
fn record<T>(state: &AppState, event: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(ApiError::Server(_)) => "error",
        Err(_) => "rejected",
    };
    AuthMetricsCollector::new(state.metrics.clone()).record_event(event, outcome);
    result
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let result = AccountService::from_state(&state).register(req).await;
    let (account, token) = record(&state, "register", result)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            token,
            user: account.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let result = AccountService::from_state(&state).login(req).await;
    let (account, token) = record(&state, "login", result)?;

    Ok(Json(SessionResponse {
        success: true,
        token,
        user: account.into(),
    }))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = AccountService::from_state(&state).get_me(&identity).await?;
    Ok(Json(account.into()))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;
    let result = AccountService::from_state(&state)
        .request_password_reset(&req.email)
        .await;
    record(&state, "forgot_password", result)?;

    Ok(Json(MessageResponse {
        message: "Password reset email sent",
    }))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;
    let result = AccountService::from_state(&state)
        .reset_password(&token, &req.password)
        .await;
    record(&state, "reset_password", result)?;

    Ok(Json(MessageResponse {
        message: "Password reset successful",
    }))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    req.validate()?;
    let result = AccountService::from_state(&state)
        .verify_email(&req.token)
        .await;
    let account = record(&state, "verify_email", result)?;

    Ok(Json(VerifyEmailResponse {
        message: "Email verified successfully",
        user: account.into(),
    }))
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;
    let result = AccountService::from_state(&state)
        .resend_verification(&req.email)
        .await;
    record(&state, "resend_verification", result)?;

    Ok(Json(MessageResponse {
        message: "Verification email sent",
    }))
}
