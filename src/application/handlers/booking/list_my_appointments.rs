//! ListMyAppointmentsHandler - Query handler for a client's bookings.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::booking::Appointment;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::AppointmentRepository;

#[derive(Debug, Clone)]
pub struct ListMyAppointmentsQuery {
    pub user_id: UserId,
}

pub struct ListMyAppointmentsHandler {
    appointments: Arc<dyn AppointmentRepository>,
    policy: CallPolicy,
}

impl ListMyAppointmentsHandler {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, policy: CallPolicy) -> Self {
        Self {
            appointments,
            policy,
        }
    }

    pub async fn handle(&self, query: ListMyAppointmentsQuery) -> Result<Vec<Appointment>, DomainError> {
        self.policy
            .read("list_appointments_by_user", || {
                self.appointments.list_by_user(&query.user_id)
            })
            .await
    }
}
