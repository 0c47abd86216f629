//! TOTP enrollment as an explicit state machine.
//!
//! ```text
//! Unenrolled → GeneratingSecret → AwaitingCode → Enrolled
//!                    ↑                 │
//!                    └── regenerate ───┘
//! Enrolled → Unenrolling → Unenrolled (or Enrolled on failure)
//! ```
//!
//! The enrolled flag is never trusted locally: `StatusRefreshed` carries the
//! provider's factor list and re-derives the state from it.

use serde::Serialize;

use crate::domain::foundation::{FactorId, Timestamp};

use super::{normalize_code_input, MfaError, ProvisioningUri, TotpCode, TotpSecret, CODE_DIGITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MfaState {
    Unenrolled,
    GeneratingSecret,
    AwaitingCode,
    Enrolled,
    Unenrolling,
}

/// Secret issued for an in-progress enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaSecret {
    /// Opaque handle the provider uses to find the secret on verify.
    pub secret_ref: String,
    pub secret: TotpSecret,
    pub provisioning_uri: ProvisioningUri,
}

/// An enrolled second factor as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MfaFactor {
    pub id: FactorId,
    pub display_name: String,
    pub enrolled_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaEvent {
    BeginEnrollment,
    SecretIssued(MfaSecret),
    SecretFailed(MfaError),
    CodeInput(String),
    VerificationSucceeded,
    VerificationFailed(MfaError),
    StatusRefreshed(Vec<MfaFactor>),
    BeginUnenroll(FactorId),
    UnenrollSucceeded,
    UnenrollFailed(MfaError),
    DismissError,
}

#[derive(Debug, Clone)]
pub struct MfaEnrollment {
    state: MfaState,
    secret: Option<MfaSecret>,
    code: String,
    factors: Vec<MfaFactor>,
    unenrolling: Option<FactorId>,
    error: Option<MfaError>,
}

impl Default for MfaEnrollment {
    fn default() -> Self {
        Self::new()
    }
}

impl MfaEnrollment {
    pub fn new() -> Self {
        Self {
            state: MfaState::Unenrolled,
            secret: None,
            code: String::new(),
            factors: Vec::new(),
            unenrolling: None,
            error: None,
        }
    }

    /// Starts from the provider's current factor list.
    pub fn from_factors(factors: Vec<MfaFactor>) -> Self {
        let mut enrollment = Self::new();
        enrollment.refresh(factors);
        enrollment
    }

    pub fn state(&self) -> MfaState {
        self.state
    }

    pub fn secret(&self) -> Option<&MfaSecret> {
        self.secret.as_ref()
    }

    /// Code as typed so far, digits only.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn factors(&self) -> &[MfaFactor] {
        &self.factors
    }

    pub fn error(&self) -> Option<&MfaError> {
        self.error.as_ref()
    }

    pub fn is_enrolled(&self) -> bool {
        self.state == MfaState::Enrolled
    }

    /// Factor currently being removed.
    pub fn unenrolling(&self) -> Option<FactorId> {
        self.unenrolling
    }

    /// Verify is offered only with exactly six digits entered.
    pub fn can_verify(&self) -> bool {
        self.state == MfaState::AwaitingCode
            && self.secret.is_some()
            && self.code.len() == CODE_DIGITS
    }

    pub fn candidate_code(&self) -> Option<TotpCode> {
        if self.can_verify() {
            TotpCode::from_input(&self.code).ok()
        } else {
            None
        }
    }

    pub fn apply(&mut self, event: MfaEvent) -> Result<(), MfaError> {
        use MfaState::*;

        match event {
            MfaEvent::BeginEnrollment => {
                self.expect(&[Unenrolled, AwaitingCode], "start enrollment")?;
                self.secret = None;
                self.code.clear();
                self.error = None;
                self.state = GeneratingSecret;
            }

            MfaEvent::SecretIssued(secret) => {
                self.expect(&[GeneratingSecret], "accept a secret")?;
                self.secret = Some(secret);
                self.state = AwaitingCode;
            }

            MfaEvent::SecretFailed(error) => {
                self.expect(&[GeneratingSecret], "fail secret generation")?;
                self.error = Some(error);
                self.state = Unenrolled;
            }

            MfaEvent::CodeInput(raw) => {
                self.expect(&[AwaitingCode], "enter a code")?;
                self.code = normalize_code_input(&raw);
            }

            MfaEvent::VerificationSucceeded => {
                self.expect(&[AwaitingCode], "finish verification")?;
                self.secret = None;
                self.code.clear();
                self.error = None;
                self.state = Enrolled;
            }

            MfaEvent::VerificationFailed(error) => {
                self.expect(&[AwaitingCode], "fail verification")?;
                self.code.clear();
                self.error = Some(error);
            }

            MfaEvent::StatusRefreshed(factors) => {
                self.refresh(factors);
            }

            MfaEvent::BeginUnenroll(factor_id) => {
                self.expect(&[Enrolled], "remove a factor")?;
                if !self.factors.iter().any(|f| f.id == factor_id) {
                    return Err(MfaError::NotEnrolled);
                }
                self.unenrolling = Some(factor_id);
                self.error = None;
                self.state = Unenrolling;
            }

            MfaEvent::UnenrollSucceeded => {
                self.expect(&[Unenrolling], "finish removal")?;
                if let Some(removed) = self.unenrolling.take() {
                    self.factors.retain(|f| f.id != removed);
                }
                self.state = if self.factors.is_empty() {
                    Unenrolled
                } else {
                    Enrolled
                };
            }

            MfaEvent::UnenrollFailed(error) => {
                self.expect(&[Unenrolling], "fail removal")?;
                self.unenrolling = None;
                self.error = Some(error);
                self.state = Enrolled;
            }

            MfaEvent::DismissError => {
                self.error = None;
            }
        }
        Ok(())
    }

    /// Re-derives enrollment from the provider's list. In-flight states keep
    /// their step; only the list is updated.
    fn refresh(&mut self, factors: Vec<MfaFactor>) {
        self.factors = factors;
        match self.state {
            MfaState::GeneratingSecret | MfaState::Unenrolling => {}
            _ if !self.factors.is_empty() => {
                self.secret = None;
                self.code.clear();
                self.state = MfaState::Enrolled;
            }
            MfaState::Enrolled => self.state = MfaState::Unenrolled,
            _ => {}
        }
    }

    fn expect(&self, allowed: &[MfaState], action: &'static str) -> Result<(), MfaError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(MfaError::invalid_step(self.state, action))
        }
    }
}
