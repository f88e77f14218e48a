use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::interface::AccountRepository;
use super::model::{Account, Identity, UserType};
use super::schema::{LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::services::{hashing::PasswordHasher, jwt::JwtService, mailer::Mailer};
use crate::AppState;

/// Registration, login, email verification and password reset on top of the
/// credential store.
pub struct AccountService<'a> {
    accounts: Arc<dyn AccountRepository>,
    jwt_service: &'a JwtService,
    hasher: &'a PasswordHasher,
    mailer: &'a dyn Mailer,
    frontend_url: &'a str,
}

impl<'a> AccountService<'a> {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        jwt_service: &'a JwtService,
        hasher: &'a PasswordHasher,
        mailer: &'a dyn Mailer,
        frontend_url: &'a str,
    ) -> Self {
        Self {
            accounts,
            jwt_service,
            hasher,
            mailer,
            frontend_url,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.storage.accounts.clone(),
            &state.jwt_service,
            &state.hasher,
            state.mailer.as_ref(),
            &state.frontend_url,
        )
    }

    /// Creates an unverified account and returns it with a session token. The
    /// token is usable immediately even though login requires verification.
    pub async fn register(&self, req: RegisterRequest) -> Result<(Account, String), ApiError> {
        req.validate()?;
        let user_type: UserType = req
            .user_type
            .parse()
            .map_err(|_| ApiError::validation("userType", "User type is required"))?;

        // Fast path only; the store's unique index decides races.
        if self.accounts.email_exists(&req.email).await? {
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            user_type,
            role: user_type.role(),
            password_hash,
            is_verified: false,
            verification_token: Some(self.jwt_service.issue_verification_token()),
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now,
            updated_at: now,
        };

        self.accounts.insert(&account).await?;
        tracing::info!("Registered account {} as {}", account.id, account.role);

        if let Some(token) = &account.verification_token {
            self.mailer.send_verification(&account.email, token).await;
        }

        let token = self
            .jwt_service
            .issue_session_token(&Identity::from(&account))?;
        Ok((account, token))
    }

    /// Unknown email and wrong password fail identically. A correct password on
    /// an unverified account fails with its own error, which reveals that the
    /// account exists so the client can offer to resend verification.
    pub async fn login(&self, req: LoginRequest) -> Result<(Account, String), ApiError> {
        req.validate()?;

        let Some(account) = self.accounts.find_by_email(&req.email).await? else {
            self.hasher.verify_unknown_account(&req.password)?;
            tracing::warn!("Login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_password(&req.password, &account.password_hash)?
        {
            tracing::warn!("Login failed: bad password for account {}", account.id);
            return Err(ApiError::InvalidCredentials);
        }

        if !account.is_verified {
            return Err(ApiError::UnverifiedAccount {
                user_id: account.id,
            });
        }

        let token = self
            .jwt_service
            .issue_session_token(&Identity::from(&account))?;
        tracing::info!("Account {} logged in", account.id);
        Ok((account, token))
    }

    pub async fn get_me(&self, identity: &Identity) -> Result<Account, ApiError> {
        self.accounts
            .find_by_id(&identity.id)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }

    /// Single use: the token is cleared on success.
    pub async fn verify_email(&self, token: &str) -> Result<Account, ApiError> {
        if token.is_empty() {
            return Err(ApiError::validation("token", "Verification token is required"));
        }

        let account = self
            .accounts
            .consume_verification_token(token, Utc::now())
            .await?
            .ok_or(ApiError::InvalidVerificationToken)?;

        tracing::info!("Account {} verified its email", account.id);
        Ok(account)
    }

    /// Replaces the outstanding verification token and mails the new one.
    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ApiError::NotFound("User"))?;

        if account.is_verified {
            return Err(ApiError::AlreadyVerified);
        }

        let token = self.jwt_service.issue_verification_token();
        if !self
            .accounts
            .set_verification_token(&account.id, &token, Utc::now())
            .await?
        {
            // Verified between the read and the write.
            return Err(ApiError::AlreadyVerified);
        }

        self.mailer.send_verification(&account.email, &token).await;
        Ok(())
    }

    /// Each call overwrites the previous reset token.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let now = Utc::now();
        let (token, expires) = self.jwt_service.issue_reset_token(now);

        if !self
            .accounts
            .set_reset_token(email, &token, expires, now)
            .await?
        {
            return Err(ApiError::NotFound("User"));
        }

        let reset_url = format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        );
        self.mailer.send_password_reset(email, &reset_url).await;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let password_hash = self.hasher.hash_password(new_password)?;

        if !self
            .accounts
            .reset_password(token, &password_hash, Utc::now())
            .await?
        {
            return Err(ApiError::InvalidOrExpiredToken);
        }

        tracing::info!("Password reset completed");
        Ok(())
    }
}
