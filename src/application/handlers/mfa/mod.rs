//! MFA (TOTP) handlers.
//!
//! ## Commands
//! - Starting enrollment (issue secret)
//! - Verifying enrollment
//! - Removing a factor
//!
//! ## Queries
//! - Enrollment status
//!
//! `MfaEnrollmentSession` drives the enrollment state machine against these.

mod get_status;
mod session;
mod start_enrollment;
mod unenroll;
mod verify_enrollment;

// Commands
pub use start_enrollment::{StartMfaEnrollmentCommand, StartMfaEnrollmentHandler};
pub use unenroll::{UnenrollMfaCommand, UnenrollMfaHandler};
pub use verify_enrollment::{
    VerifyMfaEnrollmentCommand, VerifyMfaEnrollmentHandler, VerifyMfaEnrollmentResult,
};

// Queries
pub use get_status::{GetMfaStatusHandler, GetMfaStatusQuery, MfaStatus};

pub use session::{MfaEnrollmentSession, MfaHandlers};
