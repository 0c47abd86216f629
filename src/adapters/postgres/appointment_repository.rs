//! PostgreSQL implementation of AppointmentRepository.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::booking::{Appointment, TimeSlot};
use crate::domain::foundation::{
    AppointmentId, DomainError, IdempotencyKey, Timestamp, UserId,
};
use crate::ports::{
    appointment_not_found, slot_taken, version_conflict, AppointmentRepository, InsertOutcome,
};

use super::{database_error, decode_error, unique_violation};

const ACTIVE_SLOT_CONSTRAINT: &str = "appointments_active_slot_key";
const IDEMPOTENCY_CONSTRAINT: &str = "appointments_idempotency_key";

const SELECT_COLUMNS: &str = r#"
    SELECT id, client_name, client_email, client_phone, service_type, service_name,
           date, time, coach, coach_specialty, status, payment_method, payment_status,
           user_id, idempotency_key, version, created_at, updated_at
    FROM appointments
"#;

#[derive(Clone)]
pub struct PostgresAppointmentRepository {
    pool: PgPool,
}

impl PostgresAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key(
        &self,
        user_id: &UserId,
        key: &IdempotencyKey,
    ) -> Result<Option<Appointment>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE user_id = $1 AND idempotency_key = $2",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(key.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch appointment by idempotency key", e))?;

        row.map(row_to_appointment).transpose()
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepository {
    async fn insert(&self, appointment: &Appointment) -> Result<InsertOutcome, DomainError> {
        if let Some(key) = &appointment.idempotency_key {
            if let Some(existing) = self.find_by_key(&appointment.user_id, key).await? {
                return Ok(InsertOutcome::Duplicate(existing));
            }
        }

        let result = sqlx::query(
            r#"
            INSERT INTO appointments (
                id, client_name, client_email, client_phone, service_type, service_name,
                date, time, coach, coach_specialty, status, payment_method, payment_status,
                user_id, idempotency_key, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(appointment.id.as_uuid())
        .bind(&appointment.client_name)
        .bind(&appointment.client_email)
        .bind(&appointment.client_phone)
        .bind(appointment.service_type.as_str())
        .bind(&appointment.service_name)
        .bind(appointment.date)
        .bind(appointment.time.to_string())
        .bind(appointment.coach.as_deref())
        .bind(appointment.coach_specialty.map(|s| s.as_str()))
        .bind(appointment.status.as_str())
        .bind(appointment.payment_method.as_str())
        .bind(appointment.payment_status.as_str())
        .bind(appointment.user_id.as_str())
        .bind(appointment.idempotency_key.map(|k| *k.as_uuid()))
        .bind(appointment.version as i32)
        .bind(appointment.created_at.as_datetime())
        .bind(appointment.updated_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) => match unique_violation(&e).as_deref() {
                Some(ACTIVE_SLOT_CONSTRAINT) => Err(slot_taken(appointment.date, appointment.time)),
                Some(IDEMPOTENCY_CONSTRAINT) => {
                    // Lost a race with a replay of the same submission.
                    let key = appointment
                        .idempotency_key
                        .ok_or_else(|| database_error("insert appointment", e))?;
                    self.find_by_key(&appointment.user_id, &key)
                        .await?
                        .map(InsertOutcome::Duplicate)
                        .ok_or_else(|| appointment_not_found(&appointment.id))
                }
                _ => Err(database_error("insert appointment", e)),
            },
        }
    }

    async fn update(
        &self,
        appointment: &Appointment,
        expected_version: u32,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments SET
                status = $3,
                payment_status = $4,
                coach = $5,
                coach_specialty = $6,
                version = $7,
                updated_at = $8
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(appointment.id.as_uuid())
        .bind(expected_version as i32)
        .bind(appointment.status.as_str())
        .bind(appointment.payment_status.as_str())
        .bind(appointment.coach.as_deref())
        .bind(appointment.coach_specialty.map(|s| s.as_str()))
        .bind(appointment.version as i32)
        .bind(appointment.updated_at.as_datetime())
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) if unique_violation(&e).as_deref() == Some(ACTIVE_SLOT_CONSTRAINT) => {
                return Err(slot_taken(appointment.date, appointment.time));
            }
            Err(e) => return Err(database_error("update appointment", e)),
        };

        if result.rows_affected() == 0 {
            let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM appointments WHERE id = $1")
                .bind(appointment.id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database_error("check appointment existence", e))?;

            return Err(if exists.0 > 0 {
                version_conflict(&appointment.id, expected_version)
            } else {
                appointment_not_found(&appointment.id)
            });
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &AppointmentId) -> Result<Option<Appointment>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("fetch appointment", e))?;

        row.map(row_to_appointment).transpose()
    }

    async fn booked_slots(&self, date: NaiveDate) -> Result<BTreeSet<TimeSlot>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT time FROM appointments WHERE date = $1 AND status IN ('pending', 'confirmed')",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("fetch booked slots", e))?;

        rows.into_iter()
            .map(|(time,)| time.parse::<TimeSlot>().map_err(|e| decode_error("time", e)))
            .collect()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Appointment>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list appointments", e))?;

        let mut appointments = rows
            .into_iter()
            .map(row_to_appointment)
            .collect::<Result<Vec<_>, _>>()?;
        // Text times don't sort chronologically in SQL.
        appointments.sort_by(Appointment::latest_first);
        Ok(appointments)
    }

    async fn list_pending_payments(&self) -> Result<Vec<Appointment>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE payment_status IN ('pending', 'paid') ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list pending payments", e))?;

        rows.into_iter().map(row_to_appointment).collect()
    }
}

fn row_to_appointment(row: PgRow) -> Result<Appointment, DomainError> {
    fn text(row: &PgRow, column: &str) -> Result<String, DomainError> {
        row.try_get(column).map_err(|e| decode_error(column, e))
    }

    fn parsed<T>(row: &PgRow, column: &str) -> Result<T, DomainError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        text(row, column)?
            .parse()
            .map_err(|e| decode_error(column, e))
    }

    let id: uuid::Uuid = row.try_get("id").map_err(|e| decode_error("id", e))?;
    let date: NaiveDate = row.try_get("date").map_err(|e| decode_error("date", e))?;
    let coach: Option<String> = row.try_get("coach").map_err(|e| decode_error("coach", e))?;
    let coach_specialty: Option<String> = row
        .try_get("coach_specialty")
        .map_err(|e| decode_error("coach_specialty", e))?;
    let idempotency_key: Option<uuid::Uuid> = row
        .try_get("idempotency_key")
        .map_err(|e| decode_error("idempotency_key", e))?;
    let version: i32 = row.try_get("version").map_err(|e| decode_error("version", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| decode_error("created_at", e))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| decode_error("updated_at", e))?;
    let user_id = UserId::new(text(&row, "user_id")?).map_err(|e| decode_error("user_id", e))?;

    Ok(Appointment {
        id: AppointmentId::from_uuid(id),
        client_name: text(&row, "client_name")?,
        client_email: text(&row, "client_email")?,
        client_phone: text(&row, "client_phone")?,
        service_type: parsed(&row, "service_type")?,
        service_name: text(&row, "service_name")?,
        date,
        time: parsed(&row, "time")?,
        coach,
        coach_specialty: coach_specialty
            .map(|s| s.parse().map_err(|e| decode_error("coach_specialty", e)))
            .transpose()?,
        status: parsed(&row, "status")?,
        payment_method: parsed(&row, "payment_method")?,
        payment_status: parsed(&row, "payment_status")?,
        user_id,
        idempotency_key: idempotency_key.map(IdempotencyKey::from_uuid),
        version: u32::try_from(version).map_err(|e| decode_error("version", e))?,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
