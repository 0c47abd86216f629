//! BookingSession - drives the booking workflow against the handlers.
//!
//! The workflow itself is pure; this type performs the reads and the write
//! each step needs and feeds the confirmed results back in as events. Local
//! state only changes from a backend response, never ahead of it.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::booking::{
    Appointment, BookingError, BookingEvent, BookingWorkflow, PaymentMethod,
};
use crate::domain::foundation::UserId;

use super::{
    GetBookedSlotsHandler, GetBookedSlotsQuery, SubmitBookingCommand, SubmitBookingHandler,
};

pub struct BookingSession {
    workflow: BookingWorkflow,
    slots: Arc<GetBookedSlotsHandler>,
    submit: Arc<SubmitBookingHandler>,
}

impl BookingSession {
    pub fn new(
        today: NaiveDate,
        user: Option<UserId>,
        slots: Arc<GetBookedSlotsHandler>,
        submit: Arc<SubmitBookingHandler>,
    ) -> Self {
        Self {
            workflow: BookingWorkflow::new(today, user),
            slots,
            submit,
        }
    }

    pub fn workflow(&self) -> &BookingWorkflow {
        &self.workflow
    }

    /// Applies a purely local event.
    pub fn apply(&mut self, event: BookingEvent) -> Result<(), BookingError> {
        self.workflow.apply(event)
    }

    /// Selects a date and loads its availability.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.workflow.apply(BookingEvent::SelectDate(date))?;
        let booked = self
            .slots
            .handle(GetBookedSlotsQuery { date })
            .await
            .map_err(BookingError::Backend)?;
        self.workflow
            .apply(BookingEvent::SlotsLoaded { date, booked })
    }

    /// Submits with the chosen payment method.
    ///
    /// On failure the workflow is back at payment selection with every
    /// detail and the idempotency key intact, so calling this again is safe.
    pub async fn submit(&mut self, method: PaymentMethod) -> Result<Appointment, BookingError> {
        self.workflow.apply(BookingEvent::SubmitPayment(method))?;

        let request = match self.workflow.submission() {
            Some(request) => request,
            None => {
                let err = BookingError::validation("service_name", "select a service");
                self.workflow
                    .apply(BookingEvent::SubmissionFailed(err.clone()))?;
                return Err(err);
            }
        };

        let cmd = SubmitBookingCommand {
            user_id: self.workflow.user().cloned(),
            request,
        };

        match self.submit.handle(cmd).await {
            Ok(result) => {
                self.workflow
                    .apply(BookingEvent::SubmissionSucceeded(result.appointment.id))?;
                Ok(result.appointment)
            }
            Err(err) => {
                self.workflow
                    .apply(BookingEvent::SubmissionFailed(err.clone()))?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemoryAppointmentRepository, InMemoryCoachRepository};
    use crate::application::CallPolicy;
    use crate::domain::booking::{BookingStep, ClientDetails, ServiceType, TimeSlot};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn booking_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn session(repo: &InMemoryAppointmentRepository, user: &str) -> BookingSession {
        let policy = CallPolicy::default();
        let slots = Arc::new(GetBookedSlotsHandler::new(Arc::new(repo.clone()), policy));
        let submit = Arc::new(SubmitBookingHandler::new(
            Arc::new(repo.clone()),
            Arc::new(InMemoryCoachRepository::new()),
            Arc::new(FixedClock::on(today())),
            policy,
        ));
        BookingSession::new(today(), Some(UserId::new(user).unwrap()), slots, submit)
    }

    async fn fill_zumba(session: &mut BookingSession) {
        session
            .apply(BookingEvent::SelectService {
                service_type: ServiceType::Studio,
                service_name: "Zumba Class".into(),
            })
            .unwrap();
        session.select_date(booking_date()).await.unwrap();
        session
            .apply(BookingEvent::SelectTime(TimeSlot::new(9).unwrap()))
            .unwrap();
        session
            .apply(BookingEvent::UpdateDetails(ClientDetails::new(
                "Maria Santos",
                "maria@example.com",
                "09171234567",
            )))
            .unwrap();
        session.apply(BookingEvent::Review).unwrap();
        session.apply(BookingEvent::Confirm).unwrap();
    }

    #[tokio::test]
    async fn full_flow_books_and_resets() {
        let repo = InMemoryAppointmentRepository::new();
        let mut session = session(&repo, "client-1");
        fill_zumba(&mut session).await;

        let appointment = session.submit(PaymentMethod::Cash).await.unwrap();

        assert_eq!(appointment.service_name, "Zumba Class");
        assert_eq!(session.workflow().step(), BookingStep::SelectingService);
        assert!(session.workflow().notice().is_some());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn loaded_availability_disables_taken_slot() {
        let repo = InMemoryAppointmentRepository::new();
        let mut first = session(&repo, "client-1");
        fill_zumba(&mut first).await;
        first.submit(PaymentMethod::Cash).await.unwrap();

        let mut second = session(&repo, "client-2");
        second
            .apply(BookingEvent::SelectService {
                service_type: ServiceType::Studio,
                service_name: "Karate Class".into(),
            })
            .unwrap();
        second.select_date(booking_date()).await.unwrap();

        let result = second.apply(BookingEvent::SelectTime(TimeSlot::new(9).unwrap()));
        assert!(matches!(result, Err(BookingError::SlotUnavailable { .. })));
    }

    #[tokio::test]
    async fn lost_race_returns_to_payment_with_details() {
        let repo = InMemoryAppointmentRepository::new();
        let mut a = session(&repo, "client-1");
        let mut b = session(&repo, "client-2");
        fill_zumba(&mut a).await;
        fill_zumba(&mut b).await;

        a.submit(PaymentMethod::Cash).await.unwrap();
        let err = b.submit(PaymentMethod::Cash).await.unwrap_err();

        assert!(matches!(err, BookingError::SlotTaken { .. }));
        assert_eq!(b.workflow().step(), BookingStep::SelectingPayment);
        assert_eq!(b.workflow().draft().details.name, "Maria Santos");
        assert_eq!(repo.len().await, 1);
    }
}
