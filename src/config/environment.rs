use std::env;
use std::str::FromStr;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Base of the password reset link sent by mail.
    pub frontend_url: String,
    pub session_ttl_days: i64,
    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| "JWT_SECRET must be set".to_string())?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let session_ttl_days = parsed_or("SESSION_TTL_DAYS", 30)?;
        if session_ttl_days < 1 {
            return Err("SESSION_TTL_DAYS must be at least 1".to_string());
        }

        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port: parsed_or("PORT", 5000)?,
            frontend_url,
            session_ttl_days,
            rate_limit_per_minute: parsed_or("RATE_LIMIT_PER_MINUTE", 100)?,
            rate_limit_burst: parsed_or("RATE_LIMIT_BURST", 100)?,
            argon2_memory_kib: parsed_or("ARGON2_MEMORY_KIB", 8192)?,
            argon2_iterations: parsed_or("ARGON2_ITERATIONS", 2)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
