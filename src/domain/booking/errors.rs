//! Booking and appointment error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | BookingError::Validation | 400 |
//! | BookingError::NotAuthenticated | 401 |
//! | BookingError::CoachNotFound | 404 |
//! | BookingError::SlotUnavailable / SlotTaken / AlreadySubmitting / InvalidStep | 409 |
//! | BookingError::CoachNotOfferable | 422 |
//! | AppointmentError::Forbidden | 403 |
//! | AppointmentError::NotFound | 404 |
//! | AppointmentError::InvalidTransition / Conflict | 409 |
//! | Backend (transient) | 503 |
//! | Backend | 500 |

use chrono::NaiveDate;

use crate::domain::foundation::{AppointmentId, CoachId, DomainError, ErrorCode, ValidationError};

use super::{BookingStep, TimeSlot};

/// Errors raised while building or submitting a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A required field is missing or malformed. Nothing was written.
    Validation { field: String, message: String },

    /// The slot was already reported as booked when the client picked it.
    SlotUnavailable { date: NaiveDate, time: TimeSlot },

    /// The store refused the write because another active booking holds the slot.
    SlotTaken { date: NaiveDate, time: TimeSlot },

    /// Chosen coach is inactive or teaches a different service type.
    CoachNotOfferable { coach: String },

    CoachNotFound(CoachId),

    /// Submission requires a signed-in user.
    NotAuthenticated,

    /// A submission from this workflow is already in flight.
    AlreadySubmitting,

    /// The event is not accepted in the workflow's current step.
    InvalidStep {
        step: BookingStep,
        action: &'static str,
    },

    /// Store or network failure.
    Backend(DomainError),
}

impl BookingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_step(step: BookingStep, action: &'static str) -> Self {
        BookingError::InvalidStep { step, action }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::Validation { .. } => ErrorCode::ValidationFailed,
            BookingError::SlotUnavailable { .. } | BookingError::SlotTaken { .. } => {
                ErrorCode::SlotTaken
            }
            BookingError::CoachNotOfferable { .. } => ErrorCode::ValidationFailed,
            BookingError::CoachNotFound(_) => ErrorCode::CoachNotFound,
            BookingError::NotAuthenticated => ErrorCode::Unauthorized,
            BookingError::AlreadySubmitting | BookingError::InvalidStep { .. } => {
                ErrorCode::InvalidStateTransition
            }
            BookingError::Backend(err) => err.code,
        }
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        match self {
            BookingError::Validation { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BookingError::SlotUnavailable { date, time } => {
                format!("{} on {} is already booked; pick another slot", time, date)
            }
            BookingError::SlotTaken { date, time } => {
                format!("{} on {} was just booked by someone else", time, date)
            }
            BookingError::CoachNotOfferable { coach } => {
                format!("Coach '{}' is not available for this service", coach)
            }
            BookingError::CoachNotFound(id) => format!("Coach not found: {}", id),
            BookingError::NotAuthenticated => "Sign in to book an appointment".to_string(),
            BookingError::AlreadySubmitting => "Booking is already being submitted".to_string(),
            BookingError::InvalidStep { step, action } => {
                format!("Cannot {} while {:?}", action, step)
            }
            BookingError::Backend(err) if err.is_transient() => {
                "Booking service is temporarily unavailable, please retry".to_string()
            }
            BookingError::Backend(err) => format!("Error: {}", err.message),
        }
    }

    /// Returns true if the same submission may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Backend(err) if err.is_transient())
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BookingError {}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        BookingError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SlotTaken => {
                let date = err.details.get("date").and_then(|d| d.parse().ok());
                let time = err.details.get("time").and_then(|t| t.parse().ok());
                match (date, time) {
                    (Some(date), Some(time)) => BookingError::SlotTaken { date, time },
                    _ => BookingError::Backend(err),
                }
            }
            ErrorCode::ValidationFailed => BookingError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => BookingError::Backend(err),
        }
    }
}

/// Errors raised by staff-side appointment changes (payment and status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    NotFound(AppointmentId),

    /// The requested change is not a legal transition from the current state.
    InvalidTransition { from: String, to: String },

    /// Another actor changed the appointment first.
    Conflict(AppointmentId),

    /// Caller's role may not perform this change.
    Forbidden,

    Backend(DomainError),
}

impl AppointmentError {
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        AppointmentError::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppointmentError::NotFound(_) => ErrorCode::AppointmentNotFound,
            AppointmentError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            AppointmentError::Conflict(_) => ErrorCode::VersionConflict,
            AppointmentError::Forbidden => ErrorCode::Forbidden,
            AppointmentError::Backend(err) => err.code,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppointmentError::NotFound(id) => format!("Appointment not found: {}", id),
            AppointmentError::InvalidTransition { from, to } => {
                format!("Cannot move appointment from {} to {}", from, to)
            }
            AppointmentError::Conflict(id) => format!(
                "Appointment {} was modified by someone else; reload and retry",
                id
            ),
            AppointmentError::Forbidden => {
                "You do not have permission to change this appointment".to_string()
            }
            AppointmentError::Backend(err) => format!("Error: {}", err.message),
        }
    }

    /// Conflicts and transient backend failures can be retried after a reload.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppointmentError::Conflict(_) => true,
            AppointmentError::Backend(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl std::fmt::Display for AppointmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppointmentError {}

impl From<DomainError> for AppointmentError {
    fn from(err: DomainError) -> Self {
        let id = err
            .details
            .get("appointment_id")
            .and_then(|id| id.parse::<AppointmentId>().ok());
        match (err.code, id) {
            (ErrorCode::VersionConflict, Some(id)) => AppointmentError::Conflict(id),
            (ErrorCode::AppointmentNotFound, Some(id)) => AppointmentError::NotFound(id),
            _ => AppointmentError::Backend(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_taken_error() -> DomainError {
        DomainError::new(ErrorCode::SlotTaken, "slot held")
            .with_detail("date", "2025-06-02")
            .with_detail("time", "9:00 AM")
    }

    #[test]
    fn slot_taken_domain_error_maps_to_booking_error() {
        let err: BookingError = slot_taken_error().into();
        assert_eq!(
            err,
            BookingError::SlotTaken {
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                time: TimeSlot::new(9).unwrap(),
            }
        );
    }

    #[test]
    fn validation_domain_error_keeps_field() {
        let err: BookingError = DomainError::validation("client_email", "bad").into();
        assert!(matches!(err, BookingError::Validation { field, .. } if field == "client_email"));
    }

    #[test]
    fn only_transient_backend_errors_are_retryable() {
        assert!(BookingError::Backend(DomainError::timeout("insert")).is_retryable());
        assert!(!BookingError::Backend(DomainError::new(ErrorCode::DatabaseError, "x")).is_retryable());
        assert!(!BookingError::NotAuthenticated.is_retryable());
    }

    #[test]
    fn version_conflict_maps_to_conflict() {
        let id = AppointmentId::new();
        let err: AppointmentError = DomainError::new(ErrorCode::VersionConflict, "stale")
            .with_detail("appointment_id", id.to_string())
            .into();
        assert_eq!(err, AppointmentError::Conflict(id));
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = AppointmentError::invalid_transition("payment rejected", "payment confirmed");
        assert_eq!(
            err.message(),
            "Cannot move appointment from payment rejected to payment confirmed"
        );
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }
}
