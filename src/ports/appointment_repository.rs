//! Appointment repository port.
//!
//! The store is the only place two sessions meet, so it carries the
//! guarantees the booking flow relies on:
//!
//! - **Slot uniqueness**: at most one appointment with status `pending` or
//!   `confirmed` per `(date, time)`. The check and the write are one atomic
//!   operation.
//! - **Idempotent submission**: a repeated `(user_id, idempotency_key)` returns
//!   the appointment created by the first submission.
//! - **Conditional update**: `update` only succeeds if the stored version
//!   matches the version the caller read.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::booking::{Appointment, TimeSlot};
use crate::domain::foundation::{AppointmentId, DomainError, ErrorCode, UserId};

/// Result of [`AppointmentRepository::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Same user and idempotency key as an earlier submission.
    Duplicate(Appointment),
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Persists a new appointment.
    ///
    /// # Errors
    ///
    /// - `SlotTaken` (with `date` and `time` details) if an active appointment
    ///   already holds the slot
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, appointment: &Appointment) -> Result<InsertOutcome, DomainError>;

    /// Writes every field of `appointment` if the stored version is still
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// - `AppointmentNotFound` if the record is gone
    /// - `VersionConflict` (with an `appointment_id` detail) if someone else
    ///   wrote first
    async fn update(
        &self,
        appointment: &Appointment,
        expected_version: u32,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &AppointmentId) -> Result<Option<Appointment>, DomainError>;

    /// Times on `date` held by `pending` or `confirmed` appointments.
    async fn booked_slots(&self, date: NaiveDate) -> Result<BTreeSet<TimeSlot>, DomainError>;

    /// The user's appointments, newest date first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Appointment>, DomainError>;

    /// Appointments whose payment still needs an admin decision, oldest first.
    async fn list_pending_payments(&self) -> Result<Vec<Appointment>, DomainError>;
}

/// Error returned by stores when the slot is already held.
pub fn slot_taken(date: NaiveDate, time: TimeSlot) -> DomainError {
    DomainError::new(
        ErrorCode::SlotTaken,
        format!("{} on {} is already booked", time, date),
    )
    .with_detail("date", date.to_string())
    .with_detail("time", time.to_string())
}

/// Error returned by stores when a conditional update loses.
pub fn version_conflict(id: &AppointmentId, expected: u32) -> DomainError {
    DomainError::new(
        ErrorCode::VersionConflict,
        format!("Appointment {} is no longer at version {}", id, expected),
    )
    .with_detail("appointment_id", id.to_string())
}

pub fn appointment_not_found(id: &AppointmentId) -> DomainError {
    DomainError::new(
        ErrorCode::AppointmentNotFound,
        format!("Appointment not found: {}", id),
    )
    .with_detail("appointment_id", id.to_string())
}
