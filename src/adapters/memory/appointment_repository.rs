//! In-memory appointment store for tests and single-process deployments.
//!
//! Slot check, idempotency lookup, and insert run under one write lock, which
//! gives the same guarantee as the partial unique index in PostgreSQL.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::booking::{Appointment, TimeSlot};
use crate::domain::foundation::{AppointmentId, DomainError, UserId};
use crate::ports::{
    appointment_not_found, slot_taken, version_conflict, AppointmentRepository, InsertOutcome,
};

#[derive(Debug, Default, Clone)]
pub struct InMemoryAppointmentRepository {
    appointments: Arc<RwLock<HashMap<AppointmentId, Appointment>>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored appointments, any status.
    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert(&self, appointment: &Appointment) -> Result<InsertOutcome, DomainError> {
        let mut appointments = self.appointments.write().await;

        if let Some(key) = appointment.idempotency_key {
            let existing = appointments
                .values()
                .find(|a| a.user_id == appointment.user_id && a.idempotency_key == Some(key));
            if let Some(existing) = existing {
                return Ok(InsertOutcome::Duplicate(existing.clone()));
            }
        }

        let held = appointments.values().any(|a| {
            a.holds_slot() && a.date == appointment.date && a.time == appointment.time
        });
        if held && appointment.holds_slot() {
            return Err(slot_taken(appointment.date, appointment.time));
        }

        appointments.insert(appointment.id, appointment.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update(
        &self,
        appointment: &Appointment,
        expected_version: u32,
    ) -> Result<(), DomainError> {
        let mut appointments = self.appointments.write().await;

        let stored = appointments
            .get(&appointment.id)
            .ok_or_else(|| appointment_not_found(&appointment.id))?;
        if stored.version != expected_version {
            return Err(version_conflict(&appointment.id, expected_version));
        }

        let reclaims_slot = appointment.holds_slot() && !stored.holds_slot();
        if reclaims_slot
            && appointments.values().any(|a| {
                a.id != appointment.id
                    && a.holds_slot()
                    && a.date == appointment.date
                    && a.time == appointment.time
            })
        {
            return Err(slot_taken(appointment.date, appointment.time));
        }

        appointments.insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AppointmentId) -> Result<Option<Appointment>, DomainError> {
        Ok(self.appointments.read().await.get(id).cloned())
    }

    async fn booked_slots(&self, date: NaiveDate) -> Result<BTreeSet<TimeSlot>, DomainError> {
        Ok(self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.date == date && a.holds_slot())
            .map(|a| a.time)
            .collect())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Appointment>, DomainError> {
        let mut mine: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(Appointment::latest_first);
        Ok(mine)
    }

    async fn list_pending_payments(&self) -> Result<Vec<Appointment>, DomainError> {
        let mut pending: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.payment_status.awaiting_admin())
            .cloned()
            .collect();
        pending.sort_by_key(|a| a.created_at);
        Ok(pending)
    }
}
