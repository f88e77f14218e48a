pub mod config;
pub mod error;
pub mod modules;
pub mod services;
pub mod storage;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use modules::admin::admin_routes;
use modules::auth::auth_routes;
use modules::metrics::metrics_routes;
use modules::places::{hotel_routes, ngo_routes};
use services::hashing::PasswordHasher;
use services::jwt::JwtService;
use services::mailer::Mailer;
use services::metrics::{metrics_middleware, MetricsRegistry};
use services::rate_limit::{GlobalRateLimiter, RateLimitLayer};
use services::security::security_headers;
use storage::Storage;

pub struct AppState {
    pub storage: Storage,
    pub jwt_service: JwtService,
    pub hasher: PasswordHasher,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Arc<MetricsRegistry>,
    pub frontend_url: String,
}

pub fn create_app(state: AppState, rate_limiter: GlobalRateLimiter) -> Router {
    let metrics = state.metrics.clone();
    let state = Arc::new(state);

    Router::new()
        .route("/", get(root))
        .merge(metrics_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/hotels", hotel_routes())
        .nest("/api/ngos", ngo_routes())
        .nest("/api/admin", admin_routes())
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Karnya Marketplace API"
}
