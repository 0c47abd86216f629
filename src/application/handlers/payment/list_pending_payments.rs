//! ListPendingPaymentsHandler - Admin queue of payments awaiting a decision.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::booking::{Appointment, AppointmentError};
use crate::ports::AppointmentRepository;

#[derive(Debug, Clone)]
pub struct ListPendingPaymentsQuery {
    pub actor_role: Role,
}

/// Appointments with payment `pending` (cash) or `paid` (self-reported).
pub struct ListPendingPaymentsHandler {
    appointments: Arc<dyn AppointmentRepository>,
    policy: CallPolicy,
}

impl ListPendingPaymentsHandler {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, policy: CallPolicy) -> Self {
        Self {
            appointments,
            policy,
        }
    }

    pub async fn handle(
        &self,
        query: ListPendingPaymentsQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if !query.actor_role.can_manage_payments() {
            return Err(AppointmentError::Forbidden);
        }
        Ok(self
            .policy
            .read("list_pending_payments", || {
                self.appointments.list_pending_payments()
            })
            .await?)
    }
}
