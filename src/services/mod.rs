pub mod authorization;
pub mod hashing;
pub mod jwt;
pub mod mailer;
pub mod metrics;
pub mod rate_limit;
pub mod security;
