//! UpdateAppointmentStatusHandler - Staff command moving an appointment
//! through its lifecycle.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::booking::{Appointment, AppointmentError, AppointmentStatus};
use crate::domain::foundation::AppointmentId;
use crate::ports::{AppointmentRepository, Clock};

#[derive(Debug, Clone)]
pub struct UpdateAppointmentStatusCommand {
    pub appointment_id: AppointmentId,
    pub status: AppointmentStatus,
    pub actor_role: Role,
}

#[derive(Debug, Clone)]
pub struct UpdateAppointmentStatusResult {
    pub appointment: Appointment,
}

/// Admins, owners, and coaches may confirm, complete, or cancel.
pub struct UpdateAppointmentStatusHandler {
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
    policy: CallPolicy,
}

impl UpdateAppointmentStatusHandler {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            appointments,
            clock,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateAppointmentStatusCommand,
    ) -> Result<UpdateAppointmentStatusResult, AppointmentError> {
        if !cmd.actor_role.can_update_appointments() {
            return Err(AppointmentError::Forbidden);
        }

        let mut appointment = self
            .policy
            .read("find_appointment", || {
                self.appointments.find_by_id(&cmd.appointment_id)
            })
            .await?
            .ok_or(AppointmentError::NotFound(cmd.appointment_id))?;

        let expected_version = appointment.version;
        let from = appointment.status;
        appointment.change_status(cmd.status, self.clock.now())?;

        self.policy
            .write(
                "update_appointment",
                self.appointments.update(&appointment, expected_version),
            )
            .await?;

        tracing::info!(
            appointment_id = %appointment.id,
            from = %from,
            to = %appointment.status,
            role = %cmd.actor_role,
            "Appointment status changed"
        );

        Ok(UpdateAppointmentStatusResult { appointment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryAppointmentRepository;
    use crate::domain::booking::{
        BookingRequest, ClientDetails, PaymentMethod, ServiceType, TimeSlot,
    };
    use crate::domain::foundation::{Timestamp, UserId};
    use chrono::NaiveDate;

    async fn seeded() -> (InMemoryAppointmentRepository, Appointment) {
        let repo = InMemoryAppointmentRepository::new();
        let checked = BookingRequest {
            details: ClientDetails::new("Maria Santos", "maria@example.com", "0917"),
            service_type: ServiceType::Studio,
            service_name: "Karate Class".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 4),
            time: Some(TimeSlot::new(18).unwrap()),
            coach_id: None,
            payment_method: PaymentMethod::Cash,
            idempotency_key: None,
        }
        .validate()
        .unwrap();
        let appointment = Appointment::book(
            AppointmentId::new(),
            UserId::new("client-1").unwrap(),
            checked,
            None,
            PaymentMethod::Cash,
            None,
            Timestamp::from_unix_secs(1_748_736_000),
        )
        .unwrap();
        repo.insert(&appointment).await.unwrap();
        (repo, appointment)
    }

    fn handler(repo: &InMemoryAppointmentRepository) -> UpdateAppointmentStatusHandler {
        UpdateAppointmentStatusHandler::new(
            Arc::new(repo.clone()),
            Arc::new(FixedClock::at_unix(1_748_800_000)),
            CallPolicy::default(),
        )
    }

    fn command(id: AppointmentId, status: AppointmentStatus, role: Role) -> UpdateAppointmentStatusCommand {
        UpdateAppointmentStatusCommand {
            appointment_id: id,
            status,
            actor_role: role,
        }
    }

    #[tokio::test]
    async fn coach_can_confirm_then_complete() {
        let (repo, appointment) = seeded().await;
        let handler = handler(&repo);

        handler
            .handle(command(appointment.id, AppointmentStatus::Confirmed, Role::Coach))
            .await
            .unwrap();
        let result = handler
            .handle(command(appointment.id, AppointmentStatus::Completed, Role::Coach))
            .await
            .unwrap();

        assert_eq!(result.appointment.status, AppointmentStatus::Completed);
        assert_eq!(result.appointment.version, 3);
    }

    #[tokio::test]
    async fn pending_cannot_jump_to_completed() {
        let (repo, appointment) = seeded().await;
        let err = handler(&repo)
            .handle(command(appointment.id, AppointmentStatus::Completed, Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AppointmentError::invalid_transition("pending", "completed")
        );
    }

    #[tokio::test]
    async fn client_cannot_change_status() {
        let (repo, appointment) = seeded().await;
        let err = handler(&repo)
            .handle(command(appointment.id, AppointmentStatus::Cancelled, Role::Client))
            .await
            .unwrap_err();
        assert_eq!(err, AppointmentError::Forbidden);
    }
}
