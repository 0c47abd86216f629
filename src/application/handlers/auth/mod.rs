//! Authentication handlers.
//!
//! ## Commands
//! - Registering an account
//! - Re-sending and confirming the verification email
//! - Signing in (first factor)
//! - Completing a second-factor challenge
//!
//! ## Queries
//! - Resolving the role for an authenticated identity

mod complete_mfa_challenge;
mod confirm_email;
mod errors;
mod register;
mod resend_verification;
mod resolve_role;
mod sign_in;

pub use errors::AuthFlowError;

// Commands
pub use complete_mfa_challenge::{CompleteMfaChallengeCommand, CompleteMfaChallengeHandler};
pub use confirm_email::{ConfirmEmailCommand, ConfirmEmailHandler};
pub use register::{RegisterCommand, RegisterHandler, RegisterResult};
pub use resend_verification::{ResendVerificationCommand, ResendVerificationHandler};
pub use sign_in::{SignInCommand, SignInHandler, SignInResult, SignedIn};

// Queries
pub use resolve_role::{ResolveRoleHandler, ResolveRoleQuery, ResolveRoleResult};
