//! RejectPaymentHandler - Admin command rejecting a payment.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::booking::{Appointment, AppointmentError};
use crate::domain::foundation::AppointmentId;
use crate::ports::{AppointmentRepository, Clock};

#[derive(Debug, Clone)]
pub struct RejectPaymentCommand {
    pub appointment_id: AppointmentId,
    pub actor_role: Role,
}

#[derive(Debug, Clone)]
pub struct RejectPaymentResult {
    pub appointment: Appointment,
}

/// Marks the payment rejected and cancels the appointment, freeing its slot.
pub struct RejectPaymentHandler {
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
    policy: CallPolicy,
}

impl RejectPaymentHandler {
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
        cmd: RejectPaymentCommand,
    ) -> Result<RejectPaymentResult, AppointmentError> {
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
        appointment.reject_payment(self.clock.now())?;

        self.policy
            .write(
                "update_appointment",
                self.appointments.update(&appointment, expected_version),
            )
            .await?;

        tracing::info!(appointment_id = %appointment.id, "Payment rejected, appointment cancelled");

        Ok(RejectPaymentResult { appointment })
    }
}
