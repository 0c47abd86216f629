//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait, and the error types
//! every other domain module builds on.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AppointmentId, ChallengeId, CoachId, FactorId, IdempotencyKey, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
