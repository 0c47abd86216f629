//! PostgreSQL implementation of IdentityStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    AuthenticatedUser, DomainError, ErrorCode, FactorId, Timestamp, UserId,
};
use crate::domain::mfa::{MfaFactor, TotpSecret};
use crate::ports::{FactorRecord, IdentityRecord, IdentityStore, PendingSecret};

use super::{database_error, decode_error, unique_violation};

const IDENTITY_COLUMNS: &str =
    "uid, email, display_name, email_verified, password_hash, created_at";

#[derive(Clone)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn insert(&self, record: &IdentityRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO identities (
                uid, email, display_name, email_verified, password_hash, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.user.id.as_str())
        .bind(&record.user.email)
        .bind(record.user.display_name.as_deref())
        .bind(record.user.email_verified)
        .bind(&record.password_hash)
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                DomainError::new(
                    ErrorCode::DuplicateRecord,
                    format!("An identity already exists for {}", record.user.email),
                )
            } else {
                database_error("insert identity", e)
            }
        })?;

        Ok(())
    }

    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<IdentityRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM identities WHERE uid = $1",
            IDENTITY_COLUMNS
        ))
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch identity", e))?;

        row.map(row_to_identity).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM identities WHERE lower(email) = lower($1)",
            IDENTITY_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch identity by email", e))?;

        row.map(row_to_identity).transpose()
    }

    async fn delete(&self, uid: &UserId) -> Result<(), DomainError> {
        // Tokens, secrets, and factors cascade.
        sqlx::query("DELETE FROM identities WHERE uid = $1")
            .bind(uid.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete identity", e))?;
        Ok(())
    }

    async fn replace_verification_token(
        &self,
        uid: &UserId,
        token: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO identity_verification_tokens (token, uid) VALUES ($1, $2)
            ON CONFLICT (uid) DO UPDATE SET token = EXCLUDED.token
            "#,
        )
        .bind(token)
        .bind(uid.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("store verification token", e))?;
        Ok(())
    }

    async fn verification_token_for(&self, uid: &UserId) -> Result<Option<String>, DomainError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT token FROM identity_verification_tokens WHERE uid = $1")
                .bind(uid.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("fetch verification token", e))?;
        Ok(row.map(|(token,)| token))
    }

    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedUser>, DomainError> {
        let row = sqlx::query(
            r#"
            WITH consumed AS (
                DELETE FROM identity_verification_tokens WHERE token = $1 RETURNING uid
            )
            UPDATE identities SET email_verified = TRUE
            FROM consumed
            WHERE identities.uid = consumed.uid
            RETURNING identities.uid, identities.email, identities.display_name,
                      identities.email_verified, identities.password_hash,
                      identities.created_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("consume verification token", e))?;

        Ok(row.map(row_to_identity).transpose()?.map(|record| record.user))
    }

    async fn replace_pending_secret(
        &self,
        uid: &UserId,
        pending: &PendingSecret,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO identity_pending_secrets (uid, secret_ref, secret) VALUES ($1, $2, $3)
            ON CONFLICT (uid) DO UPDATE
                SET secret_ref = EXCLUDED.secret_ref, secret = EXCLUDED.secret
            "#,
        )
        .bind(uid.as_str())
        .bind(&pending.secret_ref)
        .bind(pending.secret.as_base32())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("store pending secret", e))?;
        Ok(())
    }

    async fn pending_secret(&self, uid: &UserId) -> Result<Option<PendingSecret>, DomainError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT secret_ref, secret FROM identity_pending_secrets WHERE uid = $1",
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch pending secret", e))?;

        row.map(|(secret_ref, secret)| {
            Ok(PendingSecret {
                secret_ref,
                secret: TotpSecret::parse(&secret).map_err(|e| decode_error("secret", e))?,
            })
        })
        .transpose()
    }

    async fn enroll_factor(
        &self,
        uid: &UserId,
        secret_ref: &str,
        factor: &FactorRecord,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("begin enrollment", e))?;

        let claimed = sqlx::query(
            "DELETE FROM identity_pending_secrets WHERE uid = $1 AND secret_ref = $2",
        )
        .bind(uid.as_str())
        .bind(secret_ref)
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("claim pending secret", e))?;
        if claimed.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO identity_factors (
                id, uid, display_name, secret, last_counter, enrolled_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(factor.factor.id.as_uuid())
        .bind(uid.as_str())
        .bind(&factor.factor.display_name)
        .bind(factor.secret.as_base32())
        .bind(counter_to_db(factor.last_counter)?)
        .bind(factor.factor.enrolled_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("insert factor", e))?;

        tx.commit()
            .await
            .map_err(|e| database_error("commit enrollment", e))?;
        Ok(true)
    }

    async fn factors(&self, uid: &UserId) -> Result<Vec<FactorRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_name, secret, last_counter, enrolled_at
            FROM identity_factors WHERE uid = $1 ORDER BY enrolled_at ASC
            "#,
        )
        .bind(uid.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list factors", e))?;

        rows.into_iter().map(row_to_factor).collect()
    }

    async fn remove_factor(
        &self,
        uid: &UserId,
        factor_id: &FactorId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM identity_factors WHERE id = $1 AND uid = $2")
            .bind(factor_id.as_uuid())
            .bind(uid.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("remove factor", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn advance_factor_counter(
        &self,
        factor_id: &FactorId,
        counter: u64,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE identity_factors SET last_counter = $2 WHERE id = $1 AND last_counter < $2",
        )
        .bind(factor_id.as_uuid())
        .bind(counter_to_db(counter)?)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("advance factor counter", e))?;
        Ok(result.rows_affected() == 1)
    }
}

fn counter_to_db(counter: u64) -> Result<i64, DomainError> {
    i64::try_from(counter).map_err(|_| DomainError::validation("last_counter", "out of range"))
}

fn row_to_identity(row: PgRow) -> Result<IdentityRecord, DomainError> {
    let uid: String = row.try_get("uid").map_err(|e| decode_error("uid", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| decode_error("created_at", e))?;

    Ok(IdentityRecord {
        user: AuthenticatedUser::new(
            UserId::new(uid).map_err(|e| decode_error("uid", e))?,
            row.try_get::<String, _>("email")
                .map_err(|e| decode_error("email", e))?,
            row.try_get("display_name")
                .map_err(|e| decode_error("display_name", e))?,
            row.try_get("email_verified")
                .map_err(|e| decode_error("email_verified", e))?,
        ),
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| decode_error("password_hash", e))?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_factor(row: PgRow) -> Result<FactorRecord, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| decode_error("id", e))?;
    let secret: String = row.try_get("secret").map_err(|e| decode_error("secret", e))?;
    let last_counter: i64 = row
        .try_get("last_counter")
        .map_err(|e| decode_error("last_counter", e))?;
    let enrolled_at: DateTime<Utc> = row
        .try_get("enrolled_at")
        .map_err(|e| decode_error("enrolled_at", e))?;

    Ok(FactorRecord {
        factor: MfaFactor {
            id: FactorId::from_uuid(id),
            display_name: row
                .try_get("display_name")
                .map_err(|e| decode_error("display_name", e))?,
            enrolled_at: Timestamp::from_datetime(enrolled_at),
        },
        secret: TotpSecret::parse(&secret).map_err(|e| decode_error("secret", e))?,
        last_counter: u64::try_from(last_counter).map_err(|e| decode_error("last_counter", e))?,
    })
}
