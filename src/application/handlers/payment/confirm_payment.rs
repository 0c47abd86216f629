//! ConfirmPaymentHandler - Admin command confirming a payment.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::booking::{Appointment, AppointmentError};
use crate::domain::foundation::AppointmentId;
use crate::ports::{AppointmentRepository, Clock};

#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub appointment_id: AppointmentId,
    pub actor_role: Role,
}

#[derive(Debug, Clone)]
pub struct ConfirmPaymentResult {
    pub appointment: Appointment,
}

/// Sets payment and appointment status to confirmed in one conditional write.
pub struct ConfirmPaymentHandler {
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
    policy: CallPolicy,
}

impl ConfirmPaymentHandler {
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
        cmd: ConfirmPaymentCommand,
    ) -> Result<ConfirmPaymentResult, AppointmentError> {
        if !cmd.actor_role.can_manage_payments() {
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
        appointment.confirm_payment(self.clock.now())?;

        self.policy
            .write(
                "update_appointment",
                self.appointments.update(&appointment, expected_version),
            )
            .await?;

        tracing::info!(
            appointment_id = %appointment.id,
            version = appointment.version,
            "Payment confirmed"
        );

        Ok(ConfirmPaymentResult { appointment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryAppointmentRepository;
    use crate::domain::booking::{
        AppointmentStatus, BookingRequest, ClientDetails, PaymentMethod, PaymentStatus,
        ServiceType, TimeSlot,
    };
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::ports::InsertOutcome;
    use chrono::NaiveDate;

    async fn stored(repo: &InMemoryAppointmentRepository, method: PaymentMethod) -> Appointment {
        let checked = BookingRequest {
            details: ClientDetails::new("Maria Santos", "maria@example.com", "0917"),
            service_type: ServiceType::Studio,
            service_name: "Zumba Class".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2),
            time: Some(TimeSlot::new(9).unwrap()),
            coach_id: None,
            payment_method: method,
            idempotency_key: None,
        }
        .validate()
        .unwrap();
        let appointment = Appointment::book(
            AppointmentId::new(),
            UserId::new("client-1").unwrap(),
            checked,
            None,
            method,
            None,
            Timestamp::from_unix_secs(1_748_736_000),
        )
        .unwrap();
        assert_eq!(repo.insert(&appointment).await.unwrap(), InsertOutcome::Inserted);
        appointment
    }

    fn handler(repo: &InMemoryAppointmentRepository) -> ConfirmPaymentHandler {
        ConfirmPaymentHandler::new(
            Arc::new(repo.clone()),
            Arc::new(FixedClock::at_unix(1_748_800_000)),
            CallPolicy::default(),
        )
    }

    fn command(id: AppointmentId, role: Role) -> ConfirmPaymentCommand {
        ConfirmPaymentCommand {
            appointment_id: id,
            actor_role: role,
        }
    }

    #[tokio::test]
    async fn confirm_sets_both_fields_together() {
        let repo = InMemoryAppointmentRepository::new();
        let appointment = stored(&repo, PaymentMethod::Cash).await;

        let result = handler(&repo)
            .handle(command(appointment.id, Role::Admin))
            .await
            .unwrap();

        assert_eq!(result.appointment.payment_status, PaymentStatus::Confirmed);
        assert_eq!(result.appointment.status, AppointmentStatus::Confirmed);

        let reloaded = repo.find_by_id(&appointment.id).await.unwrap().unwrap();
        assert_eq!(reloaded.payment_status, PaymentStatus::Confirmed);
        assert_eq!(reloaded.status, AppointmentStatus::Confirmed);
        assert_eq!(reloaded.version, 2);
    }

    #[tokio::test]
    async fn self_reported_gcash_payment_can_be_confirmed() {
        let repo = InMemoryAppointmentRepository::new();
        let appointment = stored(&repo, PaymentMethod::Gcash).await;

        let result = handler(&repo)
            .handle(command(appointment.id, Role::Owner))
            .await
            .unwrap();
        assert_eq!(result.appointment.payment_status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn second_confirm_is_invalid_transition_without_change() {
        let repo = InMemoryAppointmentRepository::new();
        let appointment = stored(&repo, PaymentMethod::Cash).await;
        let handler = handler(&repo);

        handler
            .handle(command(appointment.id, Role::Admin))
            .await
            .unwrap();
        let before = repo.find_by_id(&appointment.id).await.unwrap().unwrap();

        let err = handler
            .handle(command(appointment.id, Role::Admin))
            .await
            .unwrap_err();

        assert!(matches!(err, AppointmentError::InvalidTransition { .. }));
        let after = repo.find_by_id(&appointment.id).await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn completed_cash_booking_leaves_the_pending_queue() {
        let repo = InMemoryAppointmentRepository::new();
        let mut appointment = stored(&repo, PaymentMethod::Cash).await;
        let now = Timestamp::from_unix_secs(1_748_740_000);
        for status in [AppointmentStatus::Confirmed, AppointmentStatus::Completed] {
            let expected = appointment.version;
            appointment.change_status(status, now).unwrap();
            repo.update(&appointment, expected).await.unwrap();
        }
        assert_eq!(repo.list_pending_payments().await.unwrap().len(), 1);

        let result = handler(&repo)
            .handle(command(appointment.id, Role::Admin))
            .await
            .unwrap();

        assert_eq!(result.appointment.status, AppointmentStatus::Completed);
        assert_eq!(result.appointment.payment_status, PaymentStatus::Confirmed);
        assert!(repo.list_pending_payments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let repo = InMemoryAppointmentRepository::new();
        let appointment = stored(&repo, PaymentMethod::Cash).await;

        for role in [Role::Client, Role::Coach] {
            let err = handler(&repo)
                .handle(command(appointment.id, role))
                .await
                .unwrap_err();
            assert_eq!(err, AppointmentError::Forbidden);
        }
        let unchanged = repo.find_by_id(&appointment.id).await.unwrap().unwrap();
        assert_eq!(unchanged.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn missing_appointment_is_not_found() {
        let repo = InMemoryAppointmentRepository::new();
        let id = AppointmentId::new();
        let err = handler(&repo)
            .handle(command(id, Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err, AppointmentError::NotFound(id));
    }
}
