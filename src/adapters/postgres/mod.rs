//! PostgreSQL adapters.
//!
//! Schema lives in `migrations/`. The partial unique index on
//! `appointments (date, time)` enforces slot uniqueness; conditional updates
//! compare the `version` column. Identity records for the local provider
//! live in `identities` and the `identity_*` tables.

mod account_repository;
mod appointment_repository;
mod coach_repository;
mod identity_store;

pub use account_repository::PostgresAccountRepository;
pub use appointment_repository::PostgresAppointmentRepository;
pub use coach_repository::PostgresCoachRepository;
pub use identity_store::PostgresIdentityStore;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};

const UNIQUE_VIOLATION: &str = "23505";

/// Opens a pool and applies pending migrations.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| database_error("connect to database", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to run migrations: {}", e),
            )
        })?;

    tracing::info!(max_connections, "Database pool ready");
    Ok(pool)
}

/// Maps a driver error. Pool exhaustion and I/O failures are transient.
fn database_error(action: &str, e: sqlx::Error) -> DomainError {
    let code = match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => {
            ErrorCode::ServiceUnavailable
        }
        _ => ErrorCode::DatabaseError,
    };
    DomainError::new(code, format!("Failed to {}: {}", action, e))
}

/// Constraint name if `e` is a unique violation.
fn unique_violation(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// Column decode failure.
fn decode_error(column: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to decode {}: {}", column, e),
    )
}
