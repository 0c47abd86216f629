//! MFA domain - TOTP value types, the enrollment state machine, and
//! sign-in challenges.
//!
//! # Module Organization
//!
//! - `totp` - Secrets, codes, provisioning URIs
//! - `enrollment` - Enrollment / unenrollment state machine
//! - `challenge` - Second-factor sign-in challenge
//! - `errors` - MFA error type

mod challenge;
mod enrollment;
mod errors;
mod totp;

pub use challenge::{MfaChallenge, CHALLENGE_TTL_SECS, MAX_CHALLENGE_ATTEMPTS};
pub use enrollment::{MfaEnrollment, MfaEvent, MfaFactor, MfaSecret, MfaState};
pub use errors::MfaError;
pub use totp::{
    normalize_code_input, ProvisioningUri, TotpAlgorithm, TotpCode, TotpConfig, TotpSecret,
    CODE_DIGITS,
};
