use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::modules::auth::model::{Identity, Role};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Malformed, tampered and expired tokens are deliberately one error.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and validates session tokens; mints the opaque verification and
/// reset tokens that are stored on the account.
pub struct JwtService {
    secret: String,
    session_duration: Duration,
    reset_token_duration: Duration,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            session_duration: Duration::days(30),
            reset_token_duration: Duration::hours(1),
        }
    }

    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    pub fn issue_session_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_session_token_at(identity, Utc::now())
    }

    /// Deterministic for a given identity and issue time.
    pub fn issue_session_token_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.session_duration).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            TokenError::Invalid
        })?;

        Ok(Identity {
            id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }

    pub fn issue_verification_token(&self) -> String {
        opaque_token()
    }

    /// Opaque token plus the instant it stops being accepted.
    pub fn issue_reset_token(&self, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
        (opaque_token(), now + self.reset_token_duration)
    }

    pub fn session_duration_secs(&self) -> i64 {
        self.session_duration.num_seconds()
    }
}

fn opaque_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}
