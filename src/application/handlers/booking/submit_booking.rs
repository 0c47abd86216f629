//! SubmitBookingHandler - Command handler for creating appointments.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::booking::{Appointment, BookingError, BookingRequest, BookingWindow};
use crate::domain::foundation::{AppointmentId, UserId};
use crate::ports::{AppointmentRepository, Clock, CoachRepository, InsertOutcome};

/// Command to book an appointment.
#[derive(Debug, Clone)]
pub struct SubmitBookingCommand {
    /// `None` when the caller is not signed in.
    pub user_id: Option<UserId>,
    pub request: BookingRequest,
}

#[derive(Debug, Clone)]
pub struct SubmitBookingResult {
    pub appointment: Appointment,
    /// True when the idempotency key matched an earlier submission and no
    /// new record was written.
    pub replayed: bool,
}

/// Validates and persists a booking.
///
/// Nothing is written unless every check passes. The store rejects a slot
/// already held by an active appointment, so two sessions racing on the same
/// slot get exactly one success.
pub struct SubmitBookingHandler {
    appointments: Arc<dyn AppointmentRepository>,
    coaches: Arc<dyn CoachRepository>,
    clock: Arc<dyn Clock>,
    policy: CallPolicy,
}

impl SubmitBookingHandler {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        coaches: Arc<dyn CoachRepository>,
        clock: Arc<dyn Clock>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            appointments,
            coaches,
            clock,
            policy,
        }
    }

    pub async fn handle(&self, cmd: SubmitBookingCommand) -> Result<SubmitBookingResult, BookingError> {
        // 1. Authenticated users only
        let user_id = cmd.user_id.ok_or(BookingError::NotAuthenticated)?;

        // 2. Required fields, catalog entry, booking window
        let checked = cmd.request.validate()?;
        BookingWindow::starting(self.clock.today()).check(checked.date)?;

        // 3. Resolve the coach, if any
        let coach = match cmd.request.coach_id {
            Some(coach_id) => {
                let coach = self
                    .policy
                    .read("find_coach", || self.coaches.find_by_id(&coach_id))
                    .await?
                    .ok_or(BookingError::CoachNotFound(coach_id))?;
                Some(coach)
            }
            None => None,
        };

        // 4. Build the aggregate
        let appointment = Appointment::book(
            AppointmentId::new(),
            user_id,
            checked,
            coach.as_ref(),
            cmd.request.payment_method,
            cmd.request.idempotency_key,
            self.clock.now(),
        )?;

        // 5. Atomic insert (slot check + idempotency)
        let outcome = self
            .policy
            .write("insert_appointment", self.appointments.insert(&appointment))
            .await
            .map_err(|err| {
                tracing::info!(
                    date = %appointment.date,
                    time = %appointment.time,
                    error = %err,
                    "Booking rejected by store"
                );
                BookingError::from(err)
            })?;

        match outcome {
            InsertOutcome::Inserted => {
                tracing::info!(
                    appointment_id = %appointment.id,
                    service = %appointment.service_name,
                    date = %appointment.date,
                    time = %appointment.time,
                    payment_method = %appointment.payment_method,
                    "Appointment booked"
                );
                Ok(SubmitBookingResult {
                    appointment,
                    replayed: false,
                })
            }
            InsertOutcome::Duplicate(existing) => {
                tracing::debug!(appointment_id = %existing.id, "Replayed booking submission");
                Ok(SubmitBookingResult {
                    appointment: existing,
                    replayed: true,
                })
            }
        }
    }
}
