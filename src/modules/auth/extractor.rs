use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use std::sync::Arc;

use super::model::Identity;
use crate::error::ApiError;
use crate::AppState;

/// Caller identity taken from `Authorization: Bearer <token>`.
///
/// The role is the one embedded at issue time; the account only has to still
/// exist.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingToken)?;

        let identity = state.jwt_service.validate(token)?;

        if state
            .storage
            .accounts
            .find_by_id(&identity.id)
            .await?
            .is_none()
        {
            tracing::debug!("Token subject {} no longer exists", identity.id);
            return Err(ApiError::InvalidToken);
        }

        Ok(AuthUser(identity))
    }
}
