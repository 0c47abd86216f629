//! Appointment aggregate and the booking request it is created from.
//!
//! # Invariants
//!
//! - `(date, time)` is unique among appointments whose status holds a slot;
//!   the repository enforces this at write time
//! - `coach` and `coach_specialty` are both present or both absent
//! - every change bumps `version`; repositories only accept an update whose
//!   expected version matches the stored one
//! - payment confirmation and rejection change `payment_status` and `status`
//!   together or not at all

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::coach::{Coach, Specialty};
use crate::domain::foundation::{
    AppointmentId, CoachId, IdempotencyKey, StateMachine, Timestamp, UserId,
};

use super::{
    AppointmentError, AppointmentStatus, BookingError, Offering, PaymentMethod, PaymentStatus,
    ServiceType, TimeSlot,
};

/// Contact details a client enters for a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ClientDetails {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Returns the trimmed details, or the first missing or malformed field.
    pub fn validated(&self) -> Result<ClientDetails, BookingError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        if name.is_empty() {
            return Err(BookingError::validation("client_name", "full name is required"));
        }
        if email.is_empty() {
            return Err(BookingError::validation("client_email", "email is required"));
        }
        if !email.contains('@') {
            return Err(BookingError::validation("client_email", "email must contain @"));
        }
        if phone.is_empty() {
            return Err(BookingError::validation("client_phone", "phone is required"));
        }

        Ok(ClientDetails::new(name, email, phone))
    }
}

/// A booking as submitted by a client, before any checks.
///
/// Date and time are optional so that a missing selection is reported as a
/// field error rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub details: ClientDetails,
    pub service_type: ServiceType,
    pub service_name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub coach_id: Option<CoachId>,
    pub payment_method: PaymentMethod,
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Output of [`BookingRequest::validate`]: every required selection resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedBooking {
    pub details: ClientDetails,
    pub offering: &'static Offering,
    pub date: NaiveDate,
    pub time: TimeSlot,
}

impl BookingRequest {
    /// Checks required fields in display order and resolves the catalog entry.
    pub fn validate(&self) -> Result<CheckedBooking, BookingError> {
        let details = self.details.validated()?;

        let service_name = self.service_name.trim();
        if service_name.is_empty() {
            return Err(BookingError::validation("service_name", "select a service"));
        }
        let offering = self.service_type.offering(service_name).ok_or_else(|| {
            BookingError::validation(
                "service_name",
                format!("'{}' is not a {} service", service_name, self.service_type),
            )
        })?;

        let date = self
            .date
            .ok_or_else(|| BookingError::validation("date", "select a date"))?;
        let time = self
            .time
            .ok_or_else(|| BookingError::validation("time", "select a time slot"))?;

        if offering.requires_coach && self.coach_id.is_none() {
            return Err(BookingError::validation(
                "coach",
                format!("{} requires a coach", offering.name),
            ));
        }

        Ok(CheckedBooking {
            details,
            offering,
            date,
            time,
        })
    }
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_type: ServiceType,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub coach: Option<String>,
    pub coach_specialty: Option<Specialty>,
    pub status: AppointmentStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub user_id: UserId,
    pub idempotency_key: Option<IdempotencyKey>,
    /// Optimistic concurrency token, starts at 1.
    pub version: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Appointment {
    /// Creates a pending appointment from a checked booking.
    ///
    /// # Errors
    ///
    /// - `Validation` on field `coach` if the offering needs a coach and none is given
    /// - `CoachNotOfferable` if the coach is inactive or teaches another service type
    #[allow(clippy::too_many_arguments)]
    pub fn book(
        id: AppointmentId,
        user_id: UserId,
        booking: CheckedBooking,
        coach: Option<&Coach>,
        payment_method: PaymentMethod,
        idempotency_key: Option<IdempotencyKey>,
        now: Timestamp,
    ) -> Result<Self, BookingError> {
        let service_type = booking.offering.service_type;

        if booking.offering.requires_coach && coach.is_none() {
            return Err(BookingError::validation(
                "coach",
                format!("{} requires a coach", booking.offering.name),
            ));
        }
        if let Some(coach) = coach {
            if !coach.is_offerable_for(service_type) {
                return Err(BookingError::CoachNotOfferable {
                    coach: coach.name.clone(),
                });
            }
        }

        Ok(Self {
            id,
            client_name: booking.details.name,
            client_email: booking.details.email,
            client_phone: booking.details.phone,
            service_type,
            service_name: booking.offering.name.to_string(),
            date: booking.date,
            time: booking.time,
            coach: coach.map(|c| c.name.clone()),
            coach_specialty: coach.map(|c| c.specialty),
            status: AppointmentStatus::Pending,
            payment_method,
            payment_status: payment_method.initial_status(),
            user_id,
            idempotency_key,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Client history order: latest slot first, newer record first within a slot.
    pub fn latest_first(a: &Appointment, b: &Appointment) -> Ordering {
        b.date
            .cmp(&a.date)
            .then(b.time.cmp(&a.time))
            .then(b.created_at.cmp(&a.created_at))
    }

    /// True while this appointment occupies its (date, time) slot.
    pub fn holds_slot(&self) -> bool {
        self.status.holds_slot()
    }

    /// Marks payment received and confirms the appointment.
    ///
    /// Legal only while payment awaits an admin. An appointment already
    /// confirmed by staff stays confirmed, and a completed or cancelled one
    /// keeps its status.
    pub fn confirm_payment(&mut self, now: Timestamp) -> Result<(), AppointmentError> {
        self.settle_payment(PaymentStatus::Confirmed, AppointmentStatus::Confirmed, now)
    }

    /// Rejects the payment and cancels the appointment, releasing the slot.
    ///
    /// A completed or cancelled appointment keeps its status.
    pub fn reject_payment(&mut self, now: Timestamp) -> Result<(), AppointmentError> {
        self.settle_payment(PaymentStatus::Rejected, AppointmentStatus::Cancelled, now)
    }

    fn settle_payment(
        &mut self,
        payment_target: PaymentStatus,
        status_target: AppointmentStatus,
        now: Timestamp,
    ) -> Result<(), AppointmentError> {
        let payment = self
            .payment_status
            .transition_to(payment_target)
            .map_err(|_| self.payment_transition_error(payment_target))?;
        let status = if self.status == status_target || self.status.is_terminal() {
            self.status
        } else {
            self.status
                .transition_to(status_target)
                .map_err(|_| self.status_transition_error(status_target))?
        };

        self.payment_status = payment;
        self.status = status;
        self.touch(now);
        Ok(())
    }

    /// Staff-driven status change (confirm, complete, cancel).
    pub fn change_status(
        &mut self,
        target: AppointmentStatus,
        now: Timestamp,
    ) -> Result<(), AppointmentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| self.status_transition_error(target))?;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }

    fn payment_transition_error(&self, target: PaymentStatus) -> AppointmentError {
        AppointmentError::invalid_transition(
            format!("payment {}", self.payment_status),
            format!("payment {}", target),
        )
    }

    fn status_transition_error(&self, target: AppointmentStatus) -> AppointmentError {
        AppointmentError::invalid_transition(self.status.to_string(), target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coach::CoachStatus;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_748_736_000)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn request(service_type: ServiceType, service_name: &str) -> BookingRequest {
        BookingRequest {
            details: ClientDetails::new("Maria Santos", "maria@example.com", "09171234567"),
            service_type,
            service_name: service_name.to_string(),
            date: Some(date()),
            time: Some("9:00 AM".parse().unwrap()),
            coach_id: None,
            payment_method: PaymentMethod::Cash,
            idempotency_key: None,
        }
    }

    fn gym_coach() -> Coach {
        Coach::create(
            CoachId::new(),
            "Ramon Cruz",
            "ramon@gymsched.test",
            "0917",
            Specialty::Gym,
            "8 years",
            now(),
        )
        .unwrap()
    }

    fn book(req: BookingRequest, coach: Option<&Coach>) -> Result<Appointment, BookingError> {
        let checked = req.validate()?;
        Appointment::book(
            AppointmentId::new(),
            UserId::new("client-1").unwrap(),
            checked,
            coach,
            req.payment_method,
            req.idempotency_key,
            now(),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Validation
    // ════════════════════════════════════════════════════════════════════════════

    fn field_of(err: BookingError) -> String {
        match err {
            BookingError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn each_missing_required_field_is_reported() {
        let mut r = request(ServiceType::Studio, "Zumba Class");
        r.details.name = "  ".into();
        assert_eq!(field_of(r.validate().unwrap_err()), "client_name");

        let mut r = request(ServiceType::Studio, "Zumba Class");
        r.details.email = String::new();
        assert_eq!(field_of(r.validate().unwrap_err()), "client_email");

        let mut r = request(ServiceType::Studio, "Zumba Class");
        r.details.phone = String::new();
        assert_eq!(field_of(r.validate().unwrap_err()), "client_phone");

        let r = request(ServiceType::Studio, "");
        assert_eq!(field_of(r.validate().unwrap_err()), "service_name");

        let mut r = request(ServiceType::Studio, "Zumba Class");
        r.date = None;
        assert_eq!(field_of(r.validate().unwrap_err()), "date");

        let mut r = request(ServiceType::Studio, "Zumba Class");
        r.time = None;
        assert_eq!(field_of(r.validate().unwrap_err()), "time");
    }

    #[test]
    fn service_name_must_match_service_type() {
        let r = request(ServiceType::Gym, "Zumba Class");
        assert_eq!(field_of(r.validate().unwrap_err()), "service_name");
    }

    #[test]
    fn personal_training_requires_coach() {
        let r = request(ServiceType::Gym, "Personal Training");
        assert_eq!(field_of(r.validate().unwrap_err()), "coach");
    }

    #[test]
    fn details_are_trimmed() {
        let mut r = request(ServiceType::Studio, "Zumba Class");
        r.details.name = "  Maria Santos ".into();
        assert_eq!(r.validate().unwrap().details.name, "Maria Santos");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Booking
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn cash_booking_starts_pending_pending() {
        let appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.payment_status, PaymentStatus::Pending);
        assert_eq!(appt.service_type, ServiceType::Studio);
        assert_eq!(appt.version, 1);
        assert!(appt.coach.is_none() && appt.coach_specialty.is_none());
    }

    #[test]
    fn gcash_booking_starts_paid() {
        let mut r = request(ServiceType::Studio, "Boxing Class");
        r.payment_method = PaymentMethod::Gcash;
        let appt = book(r, None).unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Paid);
        assert_eq!(appt.status, AppointmentStatus::Pending);
    }

    #[test]
    fn coach_name_and_specialty_are_copied_together() {
        let coach = gym_coach();
        let mut r = request(ServiceType::Gym, "Personal Training");
        r.coach_id = Some(coach.id);
        let appt = book(r, Some(&coach)).unwrap();
        assert_eq!(appt.coach.as_deref(), Some("Ramon Cruz"));
        assert_eq!(appt.coach_specialty, Some(Specialty::Gym));
    }

    #[test]
    fn inactive_or_mismatched_coach_is_refused() {
        let mut coach = gym_coach();
        coach.status = CoachStatus::Inactive;
        let mut r = request(ServiceType::Gym, "Personal Training");
        r.coach_id = Some(coach.id);
        assert!(matches!(
            book(r, Some(&coach)),
            Err(BookingError::CoachNotOfferable { .. })
        ));

        let coach = gym_coach();
        let mut r = request(ServiceType::Studio, "Karate Class");
        r.coach_id = Some(coach.id);
        assert!(matches!(
            book(r, Some(&coach)),
            Err(BookingError::CoachNotOfferable { .. })
        ));
    }

    #[test]
    fn history_order_is_date_then_time_then_creation() {
        let early = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();

        let mut later_slot = request(ServiceType::Studio, "Zumba Class");
        later_slot.time = Some(TimeSlot::new(14).unwrap());
        let later_slot = book(later_slot, None).unwrap();

        let mut rebooked = early.clone();
        rebooked.created_at = now().plus_secs(60);

        let mut history = vec![early.clone(), later_slot.clone(), rebooked.clone()];
        history.sort_by(Appointment::latest_first);
        assert_eq!(history, vec![later_slot, rebooked, early]);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Payment Transitions
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn confirm_payment_changes_both_fields() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.confirm_payment(now()).unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Confirmed);
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
        assert_eq!(appt.version, 2);
    }

    #[test]
    fn reject_payment_cancels_and_releases_slot() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.reject_payment(now()).unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Rejected);
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
        assert!(!appt.holds_slot());
    }

    #[test]
    fn confirming_twice_is_invalid_and_leaves_record_untouched() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.confirm_payment(now()).unwrap();
        let snapshot = appt.clone();

        let err = appt.confirm_payment(now()).unwrap_err();
        assert!(matches!(err, AppointmentError::InvalidTransition { .. }));
        assert_eq!(appt, snapshot);
    }

    #[test]
    fn confirming_a_rejected_payment_fails() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.reject_payment(now()).unwrap();
        let snapshot = appt.clone();

        assert!(appt.confirm_payment(now()).is_err());
        assert_eq!(appt, snapshot);
    }

    #[test]
    fn completed_appointment_keeps_status_when_payment_is_settled() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.change_status(AppointmentStatus::Confirmed, now()).unwrap();
        appt.change_status(AppointmentStatus::Completed, now()).unwrap();

        let mut confirmed = appt.clone();
        confirmed.confirm_payment(now()).unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Completed);
        assert_eq!(confirmed.payment_status, PaymentStatus::Confirmed);
        assert!(!confirmed.payment_status.awaiting_admin());

        let mut rejected = appt.clone();
        rejected.reject_payment(now()).unwrap();
        assert_eq!(rejected.status, AppointmentStatus::Completed);
        assert_eq!(rejected.payment_status, PaymentStatus::Rejected);
    }

    #[test]
    fn cancelled_appointment_can_still_have_payment_rejected() {
        let mut appt = book(request(ServiceType::Studio, "Boxing Class"), None).unwrap();
        appt.change_status(AppointmentStatus::Cancelled, now()).unwrap();

        appt.reject_payment(now()).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
        assert_eq!(appt.payment_status, PaymentStatus::Rejected);
        assert_eq!(appt.version, 3);
    }

    #[test]
    fn settled_payment_on_completed_appointment_fails_without_partial_change() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.change_status(AppointmentStatus::Confirmed, now()).unwrap();
        appt.change_status(AppointmentStatus::Completed, now()).unwrap();
        appt.confirm_payment(now()).unwrap();
        let snapshot = appt.clone();

        assert!(appt.reject_payment(now()).is_err());
        assert_eq!(appt, snapshot);
    }

    #[test]
    fn staff_confirmed_appointment_accepts_payment_confirmation() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.change_status(AppointmentStatus::Confirmed, now()).unwrap();
        appt.confirm_payment(now()).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
        assert_eq!(appt.payment_status, PaymentStatus::Confirmed);
    }

    #[test]
    fn change_status_rejects_terminal_exit() {
        let mut appt = book(request(ServiceType::Studio, "Zumba Class"), None).unwrap();
        appt.change_status(AppointmentStatus::Cancelled, now()).unwrap();
        assert!(appt
            .change_status(AppointmentStatus::Confirmed, now())
            .is_err());
    }
}
