use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::model::{Account, Role, UserType};

fn validate_user_type(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<UserType>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("user_type").with_message("User type is required".into()))
}

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
    pub phone: Option<String>,
    #[validate(custom(function = "validate_user_type"))]
    pub user_type: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub token: String,
    pub user: AccountResponse,
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// =============================================================================
// ME (Current User)
// =============================================================================

/// Public view of an account: no hash, no tokens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone: account.phone,
            user_type: account.user_type,
            role: account.role,
            is_verified: account.is_verified,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EmailRequest {
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Verification token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub message: &'static str,
    pub user: AccountResponse,
}
