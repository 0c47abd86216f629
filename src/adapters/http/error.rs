//! JSON error body and the status mapping for every API error.
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation / malformed code | 400 |
//! | Not authenticated / bad credentials / bad token | 401 |
//! | Forbidden / unverified email | 403 |
//! | Not found | 404 |
//! | Slot taken / invalid transition / version conflict / duplicate | 409 |
//! | Coach not offerable / wrong or expired code | 422 |
//! | Timeout / service unavailable | 503 |
//! | Anything else | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::AuthFlowError;
use crate::domain::account::AccountError;
use crate::domain::booking::{AppointmentError, BookingError};
use crate::domain::coach::CoachError;
use crate::domain::foundation::{AuthError, DomainError, ErrorCode};
use crate::domain::mfa::MfaError;

/// Standard error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error: a status plus the body sent with it.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(error_code, message),
        }
    }

    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::with_details(
                ErrorCode::ValidationFailed.to_string(),
                message,
                serde_json::json!({ "field": field }),
            ),
        }
    }

    fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(status_for(code), code.to_string(), message)
    }
}

/// Status for a domain error code.
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::AppointmentNotFound | ErrorCode::CoachNotFound | ErrorCode::AccountNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::InvalidStateTransition
        | ErrorCode::SlotTaken
        | ErrorCode::VersionConflict
        | ErrorCode::DuplicateRecord => StatusCode::CONFLICT,
        ErrorCode::Timeout | ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error_code = %self.body.error_code,
                message = %self.body.message,
                "Request failed"
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let mut api = Self::from_code(err.code, err.message);
        if !err.details.is_empty() {
            api.body.details = serde_json::to_value(&err.details).ok();
        }
        api
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation { field, message } => Self::bad_request(&field, message),
            BookingError::CoachNotOfferable { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "COACH_NOT_OFFERABLE",
                err.message(),
            ),
            BookingError::SlotTaken { date, time } | BookingError::SlotUnavailable { date, time } => {
                Self {
                    status: StatusCode::CONFLICT,
                    body: ErrorResponse::with_details(
                        ErrorCode::SlotTaken.to_string(),
                        err.message(),
                        serde_json::json!({ "date": date, "time": time }),
                    ),
                }
            }
            BookingError::Backend(inner) => Self::from(inner),
            other => Self::from_code(other.code(), other.message()),
        }
    }
}

impl From<AppointmentError> for ApiError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Backend(inner) => Self::from(inner),
            other => Self::from_code(other.code(), other.message()),
        }
    }
}

impl From<CoachError> for ApiError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::Validation { field, message } => Self::bad_request(&field, message),
            CoachError::Backend(inner) => Self::from(inner),
            other => Self::from_code(other.code(), other.to_string()),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation { field, message } => Self::bad_request(&field, message),
            AccountError::Backend(inner) => Self::from(inner),
            other => Self::from_code(other.code(), other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidToken => Self::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message),
            AuthError::TokenExpired => Self::new(StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", message),
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
            }
            AuthError::EmailNotVerified => {
                Self::new(StatusCode::FORBIDDEN, "EMAIL_NOT_VERIFIED", message)
            }
            AuthError::AccountExists => Self::new(StatusCode::CONFLICT, "ACCOUNT_EXISTS", message),
            AuthError::UserNotFound => Self::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", message),
            AuthError::InsufficientPermissions => {
                Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
            }
            AuthError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
            }
            AuthError::ServiceUnavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
            }
        }
    }
}

impl From<MfaError> for ApiError {
    fn from(err: MfaError) -> Self {
        let message = err.to_string();
        let (status, code) = match &err {
            MfaError::InvalidCodeFormat => (StatusCode::BAD_REQUEST, "INVALID_CODE_FORMAT"),
            MfaError::InvalidOrExpiredCode => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_OR_EXPIRED_CODE")
            }
            MfaError::ChallengeExpired => (StatusCode::UNAUTHORIZED, "CHALLENGE_EXPIRED"),
            MfaError::ChallengeNotFound => (StatusCode::NOT_FOUND, "CHALLENGE_NOT_FOUND"),
            MfaError::TooManyAttempts => (StatusCode::UNAUTHORIZED, "TOO_MANY_ATTEMPTS"),
            MfaError::UnknownSecret => (StatusCode::CONFLICT, "UNKNOWN_SECRET"),
            MfaError::NotEnrolled => (StatusCode::NOT_FOUND, "NOT_ENROLLED"),
            MfaError::InvalidStep { .. } => (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION"),
            MfaError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            MfaError::Provider(_) => (StatusCode::BAD_GATEWAY, "MFA_PROVIDER_ERROR"),
        };
        Self::new(status, code, message)
    }
}

impl From<AuthFlowError> for ApiError {
    fn from(err: AuthFlowError) -> Self {
        match err {
            AuthFlowError::Auth(e) => Self::from(e),
            AuthFlowError::Mfa(e) => Self::from(e),
            AuthFlowError::Account(e) => Self::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::TimeSlot;
    use crate::domain::foundation::AppointmentId;
    use chrono::NaiveDate;

    #[test]
    fn error_response_serializes_without_details_when_none() {
        let response = ErrorResponse::new("NOT_FOUND", "Not found");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn slot_taken_is_conflict_with_slot_details() {
        let err = ApiError::from(BookingError::SlotTaken {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            time: TimeSlot::new(9).unwrap(),
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.error_code, "SLOT_TAKEN");
        let details = err.body.details.unwrap();
        assert_eq!(details["date"], "2025-06-02");
        assert_eq!(details["time"], "9:00 AM");
    }

    #[test]
    fn validation_names_the_field() {
        let err = ApiError::from(BookingError::validation("client_email", "required"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.details.unwrap()["field"], "client_email");
    }

    #[test]
    fn appointment_errors_map_to_expected_statuses() {
        let id = AppointmentId::new();
        assert_eq!(ApiError::from(AppointmentError::NotFound(id)).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(AppointmentError::Forbidden).status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(AppointmentError::Conflict(id)).status, StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(AppointmentError::invalid_transition("confirmed", "confirmed")).status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn transient_backend_failures_are_503() {
        let err = ApiError::from(BookingError::Backend(DomainError::timeout("insert")));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body.error_code, "TIMEOUT");
    }

    #[test]
    fn auth_flow_errors_unwrap_to_their_source() {
        let err = ApiError::from(AuthFlowError::from(AuthError::InvalidCredentials));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let err = ApiError::from(AuthFlowError::from(MfaError::InvalidOrExpiredCode));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
