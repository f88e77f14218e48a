use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(controller::register))
        .route("/login", post(controller::login))
        .route("/me", get(controller::me))
        .route("/forgot-password", post(controller::forgot_password))
        .route("/reset-password/{token}", put(controller::reset_password))
        .route("/verify-email", post(controller::verify_email))
        .route("/resend-verification", post(controller::resend_verification))
}
