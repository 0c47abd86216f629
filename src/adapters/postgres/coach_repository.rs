//! PostgreSQL implementation of CoachRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::coach::Coach;
use crate::domain::foundation::{CoachId, DomainError, ErrorCode, Timestamp};
use crate::ports::CoachRepository;

use super::{database_error, decode_error, unique_violation};

#[derive(Clone)]
pub struct PostgresCoachRepository {
    pool: PgPool,
}

impl PostgresCoachRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoachRepository for PostgresCoachRepository {
    async fn insert(&self, coach: &Coach) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO coaches (
                id, name, email, phone, specialty, experience, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(coach.id.as_uuid())
        .bind(&coach.name)
        .bind(&coach.email)
        .bind(&coach.phone)
        .bind(coach.specialty.as_str())
        .bind(&coach.experience)
        .bind(coach.status.as_str())
        .bind(coach.created_at.as_datetime())
        .bind(coach.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e).is_some() {
                DomainError::new(
                    ErrorCode::DuplicateRecord,
                    format!("A coach with email {} already exists", coach.email),
                )
            } else {
                database_error("insert coach", e)
            }
        })?;

        Ok(())
    }

    async fn update(&self, coach: &Coach) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE coaches SET
                name = $2,
                email = $3,
                phone = $4,
                specialty = $5,
                experience = $6,
                status = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(coach.id.as_uuid())
        .bind(&coach.name)
        .bind(&coach.email)
        .bind(&coach.phone)
        .bind(coach.specialty.as_str())
        .bind(&coach.experience)
        .bind(coach.status.as_str())
        .bind(coach.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("update coach", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CoachNotFound,
                format!("Coach not found: {}", coach.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &CoachId) -> Result<Option<Coach>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, specialty, experience, status, created_at, updated_at
            FROM coaches WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch coach", e))?;

        row.map(row_to_coach).transpose()
    }

    async fn list(&self) -> Result<Vec<Coach>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone, specialty, experience, status, created_at, updated_at
            FROM coaches ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list coaches", e))?;

        rows.into_iter().map(row_to_coach).collect()
    }
}

fn row_to_coach(row: PgRow) -> Result<Coach, DomainError> {
    let get = |column: &str| -> Result<String, DomainError> {
        row.try_get(column).map_err(|e| decode_error(column, e))
    };

    let id: uuid::Uuid = row.try_get("id").map_err(|e| decode_error("id", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| decode_error("created_at", e))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| decode_error("updated_at", e))?;

    Ok(Coach {
        id: CoachId::from_uuid(id),
        name: get("name")?,
        email: get("email")?,
        phone: get("phone")?,
        specialty: get("specialty")?
            .parse()
            .map_err(|e| decode_error("specialty", e))?,
        experience: get("experience")?,
        status: get("status")?
            .parse()
            .map_err(|e| decode_error("status", e))?,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
