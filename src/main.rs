use chrono::Duration;
use karnya_backend::config::{init_db, Config};
use karnya_backend::services::{
    hashing::PasswordHasher, jwt::JwtService, mailer::LogMailer, metrics::MetricsRegistry,
    rate_limit::create_rate_limiter,
};
use karnya_backend::storage::Storage;
use karnya_backend::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "karnya_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let storage = match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            tracing::info!("Connected to MySQL");
            Storage::mysql(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            Storage::in_memory()
        }
    };

    let state = AppState {
        storage,
        jwt_service: JwtService::new(config.jwt_secret.clone())
            .with_session_duration(Duration::days(config.session_ttl_days)),
        hasher: PasswordHasher::new(config.argon2_memory_kib, config.argon2_iterations)
            .map_err(|e| format!("invalid argon2 parameters: {}", e))?,
        mailer: Arc::new(LogMailer),
        metrics: MetricsRegistry::new()?,
        frontend_url: config.frontend_url.clone(),
    };

    let rate_limiter = create_rate_limiter(config.rate_limit_per_minute, config.rate_limit_burst);
    let app = karnya_backend::create_app(state, rate_limiter);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server running on http://{}", config.bind_address());
    axum::serve(listener, app).await?;

    Ok(())
}
