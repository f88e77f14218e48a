use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::Account;
use crate::storage::StoreResult;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Credential store. Every mutating method is a single-record write; the store
/// is trusted for its atomicity and for email uniqueness.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `StoreError::Duplicate("email")` when the email is taken.
    async fn insert(&self, account: &Account) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>>;

    /// Exact, case-sensitive match on the stored email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// Marks the account holding `token` as verified and clears the token.
    /// Returns the updated account, or `None` when no account holds it.
    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Account>>;

    /// Replaces the verification token of an unverified account.
    async fn set_verification_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Stores a reset token and its expiry, overwriting any previous pair.
    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Sets the new hash and clears the reset pair, only if `token` matches and
    /// its expiry is strictly after `now`.
    async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;
}
