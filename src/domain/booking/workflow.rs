//! Client-side booking workflow as an explicit state machine.
//!
//! One step enum plus an event reducer. All selections live in a single
//! [`BookingDraft`]; which of its fields are meaningful is determined by the
//! current [`BookingStep`].
//!
//! ```text
//! SelectingService → SelectingSlot → [SelectingCoach] → EnteringDetails
//!        ↑                                                    ↓ Review
//!        │ SubmissionSucceeded                             Confirming
//!        │                                                    ↓ Confirm
//!    Submitting ← SubmitPayment ← SelectingPayment ←──────────┘
//!        └──────── SubmissionFailed ──→ SelectingPayment
//! ```

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::coach::Coach;
use crate::domain::foundation::{AppointmentId, IdempotencyKey, UserId};

use super::{
    BookingError, BookingRequest, BookingWindow, ClientDetails, Offering, PaymentMethod,
    ServiceType, TimeSlot,
};

/// Notice shown after a successful submission.
pub const BOOKED_NOTICE: &str = "Appointment booked! We will confirm it shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStep {
    SelectingService,
    SelectingSlot,
    SelectingCoach,
    EnteringDetails,
    Confirming,
    SelectingPayment,
    Submitting,
}

/// Everything the client has picked or typed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub offering: Option<&'static Offering>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub coach: Option<Coach>,
    pub details: ClientDetails,
    pub payment_method: Option<PaymentMethod>,
}

/// Result of the most recent submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded(AppointmentId),
    Failed(BookingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingEvent {
    SignedIn(UserId),
    SignedOut,
    SelectService {
        service_type: ServiceType,
        service_name: String,
    },
    SelectDate(NaiveDate),
    /// Availability read for a date. Ignored if the date is no longer selected.
    SlotsLoaded {
        date: NaiveDate,
        booked: BTreeSet<TimeSlot>,
    },
    SelectTime(TimeSlot),
    SelectCoach(Coach),
    UpdateDetails(ClientDetails),
    Review,
    GoBack,
    Confirm,
    SubmitPayment(PaymentMethod),
    SubmissionSucceeded(AppointmentId),
    SubmissionFailed(BookingError),
    DismissNotice,
}

#[derive(Debug, Clone)]
pub struct BookingWorkflow {
    step: BookingStep,
    window: BookingWindow,
    draft: BookingDraft,
    /// Booked times for the selected date, once loaded.
    booked: Option<BTreeSet<TimeSlot>>,
    user: Option<UserId>,
    idempotency_key: Option<IdempotencyKey>,
    /// Selections the current key was minted for, payment method aside.
    keyed_draft: Option<BookingDraft>,
    notice: Option<String>,
    last_outcome: Option<SubmissionOutcome>,
}

impl BookingWorkflow {
    /// Starts a fresh workflow for the booking window beginning `today`.
    pub fn new(today: NaiveDate, user: Option<UserId>) -> Self {
        Self {
            step: BookingStep::SelectingService,
            window: BookingWindow::starting(today),
            draft: BookingDraft::default(),
            booked: None,
            user,
            idempotency_key: None,
            keyed_draft: None,
            notice: None,
            last_outcome: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn window(&self) -> BookingWindow {
        self.window
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// True while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.step == BookingStep::Submitting
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_outcome(&self) -> Option<&SubmissionOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn idempotency_key(&self) -> Option<IdempotencyKey> {
        self.idempotency_key
    }

    /// Booked times for the selected date, if availability has been loaded.
    pub fn booked_slots(&self) -> Option<&BTreeSet<TimeSlot>> {
        self.booked.as_ref()
    }

    /// Slots the client may pick for the selected date.
    pub fn selectable_slots(&self) -> Vec<TimeSlot> {
        match &self.booked {
            Some(booked) => TimeSlot::all()
                .into_iter()
                .filter(|slot| !booked.contains(slot))
                .collect(),
            None => Vec::new(),
        }
    }

    fn requires_coach(&self) -> bool {
        self.draft.offering.map(|o| o.requires_coach).unwrap_or(false)
    }

    /// Request for the submission currently in flight.
    pub fn submission(&self) -> Option<BookingRequest> {
        if self.step != BookingStep::Submitting {
            return None;
        }
        let offering = self.draft.offering?;
        Some(BookingRequest {
            details: self.draft.details.clone(),
            service_type: offering.service_type,
            service_name: offering.name.to_string(),
            date: self.draft.date,
            time: self.draft.time,
            coach_id: self.draft.coach.as_ref().map(|c| c.id),
            payment_method: self.draft.payment_method?,
            idempotency_key: self.idempotency_key,
        })
    }

    /// Applies an event. On error the workflow is left unchanged.
    pub fn apply(&mut self, event: BookingEvent) -> Result<(), BookingError> {
        use BookingStep::*;

        match event {
            BookingEvent::SignedIn(user) => {
                self.user = Some(user);
            }
            BookingEvent::SignedOut => {
                self.user = None;
            }
            BookingEvent::DismissNotice => {
                self.notice = None;
            }

            BookingEvent::SelectService {
                service_type,
                service_name,
            } => {
                self.expect_not_submitting("select a service")?;
                let offering = service_type.offering(service_name.trim()).ok_or_else(|| {
                    BookingError::validation(
                        "service_name",
                        format!("'{}' is not a {} service", service_name, service_type),
                    )
                })?;
                self.draft.offering = Some(offering);
                self.clear_selections();
                self.step = SelectingSlot;
            }

            BookingEvent::SelectDate(date) => {
                self.expect_step(&[SelectingSlot, SelectingCoach, EnteringDetails], "select a date")?;
                self.window.check(date)?;
                self.draft.date = Some(date);
                self.draft.time = None;
                self.booked = None;
                self.step = SelectingSlot;
            }

            BookingEvent::SlotsLoaded { date, booked } => {
                if self.step == SelectingSlot && self.draft.date == Some(date) {
                    self.booked = Some(booked);
                }
            }

            BookingEvent::SelectTime(time) => {
                self.expect_step(&[SelectingSlot], "select a time")?;
                let date = self
                    .draft
                    .date
                    .ok_or_else(|| BookingError::validation("date", "select a date first"))?;
                let booked = self.booked.as_ref().ok_or_else(|| {
                    BookingError::validation("time", "availability is still loading")
                })?;
                if booked.contains(&time) {
                    return Err(BookingError::SlotUnavailable { date, time });
                }
                self.draft.time = Some(time);
                self.step = if self.requires_coach() {
                    SelectingCoach
                } else {
                    EnteringDetails
                };
            }

            BookingEvent::SelectCoach(coach) => {
                self.expect_step(&[SelectingCoach], "select a coach")?;
                let service_type = self
                    .draft
                    .offering
                    .map(|o| o.service_type)
                    .ok_or_else(|| BookingError::validation("service_name", "select a service"))?;
                if !coach.is_offerable_for(service_type) {
                    return Err(BookingError::CoachNotOfferable { coach: coach.name });
                }
                self.draft.coach = Some(coach);
                self.step = EnteringDetails;
            }

            BookingEvent::UpdateDetails(details) => {
                self.expect_step(&[EnteringDetails], "edit details")?;
                self.draft.details = details;
            }

            BookingEvent::Review => {
                self.expect_step(&[EnteringDetails], "review the booking")?;
                self.check_draft()?;
                self.step = Confirming;
            }

            BookingEvent::GoBack => {
                self.step = match self.step {
                    SelectingService => SelectingService,
                    SelectingSlot => SelectingService,
                    SelectingCoach => SelectingSlot,
                    EnteringDetails if self.requires_coach() => SelectingCoach,
                    EnteringDetails => SelectingSlot,
                    Confirming => EnteringDetails,
                    SelectingPayment => Confirming,
                    Submitting => return Err(BookingError::AlreadySubmitting),
                };
            }

            BookingEvent::Confirm => {
                self.expect_step(&[Confirming], "confirm")?;
                if self.idempotency_key.is_none()
                    || self.keyed_draft.as_ref() != Some(&self.key_basis())
                {
                    self.mint_key();
                }
                self.step = SelectingPayment;
            }

            BookingEvent::SubmitPayment(method) => {
                if self.step == Submitting {
                    return Err(BookingError::AlreadySubmitting);
                }
                self.expect_step(&[SelectingPayment], "submit payment")?;
                if self.user.is_none() {
                    return Err(BookingError::NotAuthenticated);
                }
                if self.draft.payment_method.is_some_and(|earlier| earlier != method) {
                    self.mint_key();
                }
                self.draft.payment_method = Some(method);
                self.last_outcome = None;
                self.step = Submitting;
            }

            BookingEvent::SubmissionSucceeded(id) => {
                self.expect_step(&[Submitting], "finish submission")?;
                self.draft = BookingDraft::default();
                self.clear_selections();
                self.notice = Some(BOOKED_NOTICE.to_string());
                self.last_outcome = Some(SubmissionOutcome::Succeeded(id));
                self.step = SelectingService;
            }

            BookingEvent::SubmissionFailed(error) => {
                self.expect_step(&[Submitting], "fail submission")?;
                self.last_outcome = Some(SubmissionOutcome::Failed(error));
                self.step = SelectingPayment;
            }
        }
        Ok(())
    }

    fn key_basis(&self) -> BookingDraft {
        BookingDraft {
            payment_method: None,
            ..self.draft.clone()
        }
    }

    /// A retried submission replays the first only while nothing has changed.
    fn mint_key(&mut self) {
        self.idempotency_key = Some(IdempotencyKey::new());
        self.keyed_draft = Some(self.key_basis());
    }

    /// Clears everything that depended on the previous service choice.
    fn clear_selections(&mut self) {
        self.draft.date = None;
        self.draft.time = None;
        self.draft.coach = None;
        self.draft.payment_method = None;
        self.booked = None;
        self.idempotency_key = None;
        self.keyed_draft = None;
    }

    fn check_draft(&self) -> Result<(), BookingError> {
        self.draft.details.validated()?;
        let offering = self
            .draft
            .offering
            .ok_or_else(|| BookingError::validation("service_name", "select a service"))?;
        if self.draft.date.is_none() {
            return Err(BookingError::validation("date", "select a date"));
        }
        if self.draft.time.is_none() {
            return Err(BookingError::validation("time", "select a time slot"));
        }
        if offering.requires_coach && self.draft.coach.is_none() {
            return Err(BookingError::validation(
                "coach",
                format!("{} requires a coach", offering.name),
            ));
        }
        Ok(())
    }

    fn expect_step(&self, allowed: &[BookingStep], action: &'static str) -> Result<(), BookingError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else if self.step == BookingStep::Submitting {
            Err(BookingError::AlreadySubmitting)
        } else {
            Err(BookingError::invalid_step(self.step, action))
        }
    }

    fn expect_not_submitting(&self, action: &'static str) -> Result<(), BookingError> {
        if self.step == BookingStep::Submitting {
            Err(BookingError::invalid_step(self.step, action))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coach::{CoachStatus, Specialty};
    use crate::domain::foundation::{CoachId, DomainError, Timestamp};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn booking_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn nine_am() -> TimeSlot {
        "9:00 AM".parse().unwrap()
    }

    fn user() -> UserId {
        UserId::new("client-1").unwrap()
    }

    fn coach(specialty: Specialty) -> Coach {
        Coach::create(
            CoachId::new(),
            "Ramon Cruz",
            "ramon@gymsched.test",
            "0917",
            specialty,
            "8 years",
            Timestamp::from_unix_secs(1_748_736_000),
        )
        .unwrap()
    }

    fn details() -> ClientDetails {
        ClientDetails::new("Maria Santos", "maria@example.com", "09171234567")
    }

    fn select(workflow: &mut BookingWorkflow, service_type: ServiceType, name: &str) {
        workflow
            .apply(BookingEvent::SelectService {
                service_type,
                service_name: name.to_string(),
            })
            .unwrap();
    }

    fn pick_slot(workflow: &mut BookingWorkflow, booked: BTreeSet<TimeSlot>) {
        workflow.apply(BookingEvent::SelectDate(booking_date())).unwrap();
        workflow
            .apply(BookingEvent::SlotsLoaded {
                date: booking_date(),
                booked,
            })
            .unwrap();
        workflow.apply(BookingEvent::SelectTime(nine_am())).unwrap();
    }

    /// Drives a zumba booking up to the payment step.
    fn at_payment(user: Option<UserId>) -> BookingWorkflow {
        let mut workflow = BookingWorkflow::new(today(), user);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        pick_slot(&mut workflow, BTreeSet::new());
        workflow.apply(BookingEvent::UpdateDetails(details())).unwrap();
        workflow.apply(BookingEvent::Review).unwrap();
        workflow.apply(BookingEvent::Confirm).unwrap();
        workflow
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Service & Slot Selection
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn selecting_service_resets_downstream_selections() {
        let mut workflow = BookingWorkflow::new(today(), Some(user()));
        select(&mut workflow, ServiceType::Gym, "Personal Training");
        pick_slot(&mut workflow, BTreeSet::new());
        workflow.apply(BookingEvent::SelectCoach(coach(Specialty::Gym))).unwrap();

        select(&mut workflow, ServiceType::Studio, "Karate Class");

        assert_eq!(workflow.step(), BookingStep::SelectingSlot);
        assert!(workflow.draft().date.is_none());
        assert!(workflow.draft().time.is_none());
        assert!(workflow.draft().coach.is_none());
        assert!(workflow.booked_slots().is_none());
    }

    #[test]
    fn unknown_service_is_rejected() {
        let mut workflow = BookingWorkflow::new(today(), None);
        let result = workflow.apply(BookingEvent::SelectService {
            service_type: ServiceType::Gym,
            service_name: "Zumba Class".into(),
        });
        assert!(matches!(result, Err(BookingError::Validation { .. })));
        assert_eq!(workflow.step(), BookingStep::SelectingService);
    }

    #[test]
    fn date_outside_window_is_rejected() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        let too_far = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        assert!(workflow.apply(BookingEvent::SelectDate(too_far)).is_err());
        assert!(workflow.draft().date.is_none());
    }

    #[test]
    fn booked_slot_cannot_be_selected() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        workflow.apply(BookingEvent::SelectDate(booking_date())).unwrap();
        workflow
            .apply(BookingEvent::SlotsLoaded {
                date: booking_date(),
                booked: [nine_am()].into_iter().collect(),
            })
            .unwrap();

        let result = workflow.apply(BookingEvent::SelectTime(nine_am()));
        assert!(matches!(result, Err(BookingError::SlotUnavailable { .. })));
        assert!(!workflow.selectable_slots().contains(&nine_am()));
        assert_eq!(workflow.selectable_slots().len(), TimeSlot::all().len() - 1);
    }

    #[test]
    fn time_cannot_be_picked_before_availability_loads() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        workflow.apply(BookingEvent::SelectDate(booking_date())).unwrap();
        assert!(workflow.apply(BookingEvent::SelectTime(nine_am())).is_err());
    }

    #[test]
    fn stale_availability_for_other_date_is_ignored() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        workflow.apply(BookingEvent::SelectDate(booking_date())).unwrap();
        workflow
            .apply(BookingEvent::SlotsLoaded {
                date: today(),
                booked: BTreeSet::new(),
            })
            .unwrap();
        assert!(workflow.booked_slots().is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Coach Selection
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn coach_step_only_for_offerings_that_need_it() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Gym, "Personal Training");
        pick_slot(&mut workflow, BTreeSet::new());
        assert_eq!(workflow.step(), BookingStep::SelectingCoach);

        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Gym, "Gym Session");
        pick_slot(&mut workflow, BTreeSet::new());
        assert_eq!(workflow.step(), BookingStep::EnteringDetails);
    }

    #[test]
    fn incompatible_or_inactive_coach_is_refused() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Gym, "Personal Training");
        pick_slot(&mut workflow, BTreeSet::new());

        let result = workflow.apply(BookingEvent::SelectCoach(coach(Specialty::Zumba)));
        assert!(matches!(result, Err(BookingError::CoachNotOfferable { .. })));

        let mut inactive = coach(Specialty::Gym);
        inactive.status = CoachStatus::Inactive;
        assert!(workflow.apply(BookingEvent::SelectCoach(inactive)).is_err());
        assert_eq!(workflow.step(), BookingStep::SelectingCoach);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Details, Review & Confirmation
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn review_with_missing_phone_stays_on_details() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        pick_slot(&mut workflow, BTreeSet::new());
        workflow
            .apply(BookingEvent::UpdateDetails(ClientDetails::new(
                "Maria",
                "maria@example.com",
                "",
            )))
            .unwrap();

        let result = workflow.apply(BookingEvent::Review);
        assert!(matches!(result, Err(BookingError::Validation { field, .. }) if field == "client_phone"));
        assert_eq!(workflow.step(), BookingStep::EnteringDetails);
    }

    #[test]
    fn go_back_from_confirming_returns_to_details() {
        let mut workflow = BookingWorkflow::new(today(), None);
        select(&mut workflow, ServiceType::Studio, "Zumba Class");
        pick_slot(&mut workflow, BTreeSet::new());
        workflow.apply(BookingEvent::UpdateDetails(details())).unwrap();
        workflow.apply(BookingEvent::Review).unwrap();

        workflow.apply(BookingEvent::GoBack).unwrap();
        assert_eq!(workflow.step(), BookingStep::EnteringDetails);
        assert_eq!(workflow.draft().details, details());
    }

    #[test]
    fn confirm_mints_idempotency_key() {
        let workflow = at_payment(Some(user()));
        assert_eq!(workflow.step(), BookingStep::SelectingPayment);
        assert!(workflow.idempotency_key().is_some());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Submission
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn unauthenticated_submit_is_blocked() {
        let mut workflow = at_payment(None);
        let result = workflow.apply(BookingEvent::SubmitPayment(PaymentMethod::Cash));
        assert_eq!(result, Err(BookingError::NotAuthenticated));
        assert_eq!(workflow.step(), BookingStep::SelectingPayment);
    }

    #[test]
    fn double_submit_is_refused_while_busy() {
        let mut workflow = at_payment(Some(user()));
        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Cash))
            .unwrap();
        assert!(workflow.is_busy());

        let again = workflow.apply(BookingEvent::SubmitPayment(PaymentMethod::Cash));
        assert_eq!(again, Err(BookingError::AlreadySubmitting));
    }

    #[test]
    fn submission_request_carries_selections_and_key() {
        let mut workflow = at_payment(Some(user()));
        let key = workflow.idempotency_key();
        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Gcash))
            .unwrap();

        let request = workflow.submission().unwrap();
        assert_eq!(request.service_name, "Zumba Class");
        assert_eq!(request.service_type, ServiceType::Studio);
        assert_eq!(request.date, Some(booking_date()));
        assert_eq!(request.time, Some(nine_am()));
        assert_eq!(request.payment_method, PaymentMethod::Gcash);
        assert_eq!(request.idempotency_key, key);
    }

    #[test]
    fn success_resets_everything_and_shows_notice() {
        let mut workflow = at_payment(Some(user()));
        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Cash))
            .unwrap();
        let id = AppointmentId::new();
        workflow.apply(BookingEvent::SubmissionSucceeded(id)).unwrap();

        assert_eq!(workflow.step(), BookingStep::SelectingService);
        assert_eq!(workflow.draft(), &BookingDraft::default());
        assert!(workflow.idempotency_key().is_none());
        assert_eq!(workflow.notice(), Some(BOOKED_NOTICE));
        assert_eq!(workflow.last_outcome(), Some(&SubmissionOutcome::Succeeded(id)));
        assert!(workflow.user().is_some());
    }

    #[test]
    fn failure_returns_to_payment_keeping_details_and_key() {
        let mut workflow = at_payment(Some(user()));
        let key = workflow.idempotency_key();
        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Cash))
            .unwrap();
        workflow
            .apply(BookingEvent::SubmissionFailed(BookingError::Backend(
                DomainError::timeout("insert appointment"),
            )))
            .unwrap();

        assert_eq!(workflow.step(), BookingStep::SelectingPayment);
        assert_eq!(workflow.draft().details, details());
        assert_eq!(workflow.draft().time, Some(nine_am()));
        assert_eq!(workflow.idempotency_key(), key);
        assert!(!workflow.is_busy());
        assert!(matches!(workflow.last_outcome(), Some(SubmissionOutcome::Failed(_))));
    }

    fn fail_submission(workflow: &mut BookingWorkflow) {
        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Cash))
            .unwrap();
        workflow
            .apply(BookingEvent::SubmissionFailed(BookingError::Backend(
                DomainError::timeout("insert appointment"),
            )))
            .unwrap();
    }

    /// Steps back from payment to the slot picker.
    fn back_to_slots(workflow: &mut BookingWorkflow) {
        for _ in 0..3 {
            workflow.apply(BookingEvent::GoBack).unwrap();
        }
        assert_eq!(workflow.step(), BookingStep::SelectingSlot);
    }

    fn reconfirm(workflow: &mut BookingWorkflow) {
        workflow.apply(BookingEvent::Review).unwrap();
        workflow.apply(BookingEvent::Confirm).unwrap();
    }

    #[test]
    fn changing_the_slot_after_failure_mints_a_new_key() {
        let mut workflow = at_payment(Some(user()));
        let first_key = workflow.idempotency_key();
        fail_submission(&mut workflow);

        back_to_slots(&mut workflow);
        let next_day = booking_date().succ_opt().unwrap();
        workflow.apply(BookingEvent::SelectDate(next_day)).unwrap();
        workflow
            .apply(BookingEvent::SlotsLoaded {
                date: next_day,
                booked: BTreeSet::new(),
            })
            .unwrap();
        workflow.apply(BookingEvent::SelectTime(nine_am())).unwrap();
        reconfirm(&mut workflow);

        assert!(workflow.idempotency_key().is_some());
        assert_ne!(workflow.idempotency_key(), first_key);
    }

    #[test]
    fn editing_details_after_failure_mints_a_new_key() {
        let mut workflow = at_payment(Some(user()));
        let first_key = workflow.idempotency_key();
        fail_submission(&mut workflow);

        workflow.apply(BookingEvent::GoBack).unwrap();
        workflow.apply(BookingEvent::GoBack).unwrap();
        let mut edited = details();
        edited.phone = "09179999999".into();
        workflow.apply(BookingEvent::UpdateDetails(edited)).unwrap();
        reconfirm(&mut workflow);

        assert_ne!(workflow.idempotency_key(), first_key);
    }

    #[test]
    fn unchanged_retry_keeps_the_key() {
        let mut workflow = at_payment(Some(user()));
        let first_key = workflow.idempotency_key();
        fail_submission(&mut workflow);

        workflow.apply(BookingEvent::GoBack).unwrap();
        workflow.apply(BookingEvent::GoBack).unwrap();
        workflow.apply(BookingEvent::UpdateDetails(details())).unwrap();
        reconfirm(&mut workflow);

        assert_eq!(workflow.idempotency_key(), first_key);
    }

    #[test]
    fn reselecting_the_same_slot_keeps_the_key() {
        let mut workflow = at_payment(Some(user()));
        let first_key = workflow.idempotency_key();
        fail_submission(&mut workflow);

        back_to_slots(&mut workflow);
        pick_slot(&mut workflow, BTreeSet::new());
        reconfirm(&mut workflow);

        assert_eq!(workflow.idempotency_key(), first_key);
    }

    #[test]
    fn switching_payment_method_after_failure_mints_a_new_key() {
        let mut workflow = at_payment(Some(user()));
        let first_key = workflow.idempotency_key();
        fail_submission(&mut workflow);

        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Gcash))
            .unwrap();
        let request = workflow.submission().unwrap();
        assert_eq!(request.payment_method, PaymentMethod::Gcash);
        assert!(request.idempotency_key.is_some());
        assert_ne!(request.idempotency_key, first_key);
    }

    #[test]
    fn service_cannot_change_mid_submission() {
        let mut workflow = at_payment(Some(user()));
        workflow
            .apply(BookingEvent::SubmitPayment(PaymentMethod::Cash))
            .unwrap();
        let result = workflow.apply(BookingEvent::SelectService {
            service_type: ServiceType::Gym,
            service_name: "Gym Session".into(),
        });
        assert!(matches!(result, Err(BookingError::InvalidStep { .. })));
        assert_eq!(workflow.step(), BookingStep::Submitting);
    }
}
