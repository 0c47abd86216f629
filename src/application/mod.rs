//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;
pub mod resilience;

pub use resilience::{CallPolicy, RetryableError};

pub use handlers::appointment::{
    UpdateAppointmentStatusCommand, UpdateAppointmentStatusHandler, UpdateAppointmentStatusResult,
};
pub use handlers::auth::{
    AuthFlowError, CompleteMfaChallengeCommand, CompleteMfaChallengeHandler, ConfirmEmailCommand,
    ConfirmEmailHandler, RegisterCommand, RegisterHandler, RegisterResult,
    ResendVerificationCommand, ResendVerificationHandler, ResolveRoleHandler, ResolveRoleQuery,
    ResolveRoleResult, SignInCommand, SignInHandler, SignInResult, SignedIn,
};
pub use handlers::booking::{
    BookingSession, GetBookedSlotsHandler, GetBookedSlotsQuery, ListBookableCoachesHandler,
    ListBookableCoachesQuery, ListMyAppointmentsHandler, ListMyAppointmentsQuery,
    SubmitBookingCommand, SubmitBookingHandler, SubmitBookingResult,
};
pub use handlers::coach::{
    CreateCoachCommand, CreateCoachHandler, ListCoachesHandler, ListCoachesQuery,
    UpdateCoachStatusCommand, UpdateCoachStatusHandler,
};
pub use handlers::mfa::{
    GetMfaStatusHandler, GetMfaStatusQuery, MfaEnrollmentSession, MfaHandlers, MfaStatus,
    StartMfaEnrollmentCommand, StartMfaEnrollmentHandler, UnenrollMfaCommand, UnenrollMfaHandler,
    VerifyMfaEnrollmentCommand, VerifyMfaEnrollmentHandler, VerifyMfaEnrollmentResult,
};
pub use handlers::payment::{
    ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult, ListPendingPaymentsHandler,
    ListPendingPaymentsQuery, RejectPaymentCommand, RejectPaymentHandler, RejectPaymentResult,
};
