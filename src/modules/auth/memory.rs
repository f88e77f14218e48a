use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{interface::AccountRepository, model::Account};
use crate::storage::{StoreError, StoreResult};

/// Process-local account store keyed by id. The write lock makes the email
/// uniqueness check and the insert one step.
#[derive(Default)]
pub struct MemoryAccounts {
    rows: RwLock<HashMap<String, Account>>,
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn insert(&self, account: &Account) -> StoreResult<()> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|a| a.email == account.email) {
            return Err(StoreError::Duplicate("email"));
        }
        rows.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.rows.read().await.values().any(|a| a.email == email))
    }

    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Account>> {
        let mut rows = self.rows.write().await;
        let Some(account) = rows
            .values_mut()
            .find(|a| a.verification_token.as_deref() == Some(token))
        else {
            return Ok(None);
        };

        account.is_verified = true;
        account.verification_token = None;
        account.updated_at = now;
        Ok(Some(account.clone()))
    }

    async fn set_verification_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(id) {
            Some(account) if !account.is_verified => {
                account.verification_token = Some(token.to_string());
                account.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        let Some(account) = rows.values_mut().find(|a| a.email == email) else {
            return Ok(false);
        };

        account.reset_password_token = Some(token.to_string());
        account.reset_password_expires = Some(expires);
        account.updated_at = now;
        Ok(true)
    }

    async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        let Some(account) = rows.values_mut().find(|a| {
            a.reset_password_token.as_deref() == Some(token)
                && a.reset_password_expires.is_some_and(|exp| exp > now)
        }) else {
            return Ok(false);
        };

        account.password_hash = password_hash.to_string();
        account.reset_password_token = None;
        account.reset_password_expires = None;
        account.updated_at = now;
        Ok(true)
    }
}
