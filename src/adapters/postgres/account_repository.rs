//! PostgreSQL implementation of AccountRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::account::{Account, Role};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::AccountRepository;

use super::{database_error, decode_error, unique_violation};

#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                uid, email, display_name, phone, role, email_verified, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.uid.as_str())
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(account.phone.as_deref())
        .bind(account.role.as_str())
        .bind(account.email_verified)
        .bind(account.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                DomainError::new(
                    ErrorCode::DuplicateRecord,
                    format!("An account already exists for {}", account.email),
                )
            } else {
                database_error("insert account", e)
            }
        })?;

        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                display_name = $2,
                phone = $3,
                role = $4,
                email_verified = $5
            WHERE uid = $1
            "#,
        )
        .bind(account.uid.as_str())
        .bind(&account.display_name)
        .bind(account.phone.as_deref())
        .bind(account.role.as_str())
        .bind(account.email_verified)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("update account", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", account.uid),
            ));
        }

        Ok(())
    }

    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT uid, email, display_name, phone, role, email_verified, created_at
            FROM accounts WHERE uid = $1
            "#,
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch account", e))?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT uid, email, display_name, phone, role, email_verified, created_at
            FROM accounts WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch account by email", e))?;

        row.map(row_to_account).transpose()
    }
}

fn row_to_account(row: PgRow) -> Result<Account, DomainError> {
    let uid: String = row.try_get("uid").map_err(|e| decode_error("uid", e))?;
    let role: String = row.try_get("role").map_err(|e| decode_error("role", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| decode_error("created_at", e))?;

    Ok(Account {
        uid: UserId::new(uid).map_err(|e| decode_error("uid", e))?,
        email: row.try_get("email").map_err(|e| decode_error("email", e))?,
        display_name: row
            .try_get("display_name")
            .map_err(|e| decode_error("display_name", e))?,
        phone: row.try_get("phone").map_err(|e| decode_error("phone", e))?,
        role: role.parse::<Role>().map_err(|e| decode_error("role", e))?,
        email_verified: row
            .try_get("email_verified")
            .map_err(|e| decode_error("email_verified", e))?,
        created_at: Timestamp::from_datetime(created_at),
    })
}
