use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, Pool};

use super::interface::AccountRepository;
use super::model::Account;
use crate::storage::{StoreError, StoreResult};

pub struct AccountCrud {
    pool: Pool<MySql>,
}

impl AccountCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    user_type: String,
    role: String,
    password_hash: String,
    is_verified: bool,
    verification_token: Option<String>,
    reset_password_token: Option<String>,
    reset_password_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            user_type: row
                .user_type
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("users.{}: {}", row.id, e)))?,
            role: row
                .role
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("users.{}: {}", row.id, e)))?,
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            verification_token: row.verification_token,
            reset_password_token: row.reset_password_token,
            reset_password_expires: row.reset_password_expires,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_account(row: Option<AccountRow>) -> StoreResult<Option<Account>> {
    row.map(Account::try_from).transpose()
}

#[async_trait]
impl AccountRepository for AccountCrud {
    async fn insert(&self, account: &Account) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, phone, user_type, role, password_hash,
                               is_verified, verification_token, reset_password_token, reset_password_expires,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(account.user_type.as_str())
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .bind(account.is_verified)
        .bind(&account.verification_token)
        .bind(&account.reset_password_token)
        .bind(account.reset_password_expires)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate("email"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        into_account(row)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        into_account(row)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Account>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE verification_token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        let Some(id) = id else {
            return Ok(None);
        };

        // The token predicate is repeated so a concurrent consumer loses the race.
        let result = sqlx::query(
            r#"
            UPDATE users SET is_verified = TRUE, verification_token = NULL, updated_at = ?
            WHERE id = ? AND verification_token = ?
            "#,
        )
        .bind(now)
        .bind(&id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(&id).await
    }

    async fn set_verification_token(
        &self,
        id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET verification_token = ?, updated_at = ? WHERE id = ? AND is_verified = FALSE",
        )
        .bind(token)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET reset_password_token = ?, reset_password_expires = ?, updated_at = ?
            WHERE email = ?
            "#,
        )
        .bind(token)
        .bind(expires)
        .bind(now)
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, reset_password_token = NULL, reset_password_expires = NULL, updated_at = ?
            WHERE reset_password_token = ? AND reset_password_expires > ?
            "#,
        )
        .bind(password_hash)
        .bind(now)
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
