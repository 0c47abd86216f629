//! MfaEnrollmentSession - drives the enrollment state machine against the
//! MFA handlers.
//!
//! Every transition that depends on the provider waits for its answer; the
//! enrolled flag is only ever set from the provider's factor list.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, FactorId};
use crate::domain::mfa::{MfaEnrollment, MfaError, MfaEvent, MfaSecret};

use super::{
    GetMfaStatusHandler, GetMfaStatusQuery, StartMfaEnrollmentCommand, StartMfaEnrollmentHandler,
    UnenrollMfaCommand, UnenrollMfaHandler, VerifyMfaEnrollmentCommand,
    VerifyMfaEnrollmentHandler,
};

/// Handlers the session calls.
#[derive(Clone)]
pub struct MfaHandlers {
    pub start: Arc<StartMfaEnrollmentHandler>,
    pub verify: Arc<VerifyMfaEnrollmentHandler>,
    pub unenroll: Arc<UnenrollMfaHandler>,
    pub status: Arc<GetMfaStatusHandler>,
}

pub struct MfaEnrollmentSession {
    user: AuthenticatedUser,
    enrollment: MfaEnrollment,
    handlers: MfaHandlers,
}

impl MfaEnrollmentSession {
    pub fn new(user: AuthenticatedUser, handlers: MfaHandlers) -> Self {
        Self {
            user,
            enrollment: MfaEnrollment::new(),
            handlers,
        }
    }

    pub fn enrollment(&self) -> &MfaEnrollment {
        &self.enrollment
    }

    /// Loads the factor list from the provider.
    pub async fn refresh(&mut self) -> Result<(), MfaError> {
        let status = self
            .handlers
            .status
            .handle(GetMfaStatusQuery {
                user_id: self.user.id.clone(),
            })
            .await?;
        self.enrollment
            .apply(MfaEvent::StatusRefreshed(status.factors))
    }

    /// Requests a secret. Also used to regenerate while awaiting a code.
    pub async fn begin_enrollment(&mut self) -> Result<&MfaSecret, MfaError> {
        self.enrollment.apply(MfaEvent::BeginEnrollment)?;

        let issued = self
            .handlers
            .start
            .handle(StartMfaEnrollmentCommand {
                user: self.user.clone(),
            })
            .await;

        match issued {
            Ok(secret) => {
                self.enrollment.apply(MfaEvent::SecretIssued(secret))?;
                self.enrollment
                    .secret()
                    .ok_or_else(|| MfaError::invalid_step(self.enrollment.state(), "show a secret"))
            }
            Err(err) => {
                self.enrollment.apply(MfaEvent::SecretFailed(err.clone()))?;
                Err(err)
            }
        }
    }

    /// Records typed input; only digits are kept.
    pub fn input_code(&mut self, raw: &str) -> Result<(), MfaError> {
        self.enrollment.apply(MfaEvent::CodeInput(raw.to_string()))
    }

    /// Submits the entered code. Refused locally unless six digits are present.
    pub async fn verify(&mut self) -> Result<(), MfaError> {
        let code = self
            .enrollment
            .candidate_code()
            .ok_or(MfaError::InvalidCodeFormat)?;
        let secret_ref = self
            .enrollment
            .secret()
            .map(|secret| secret.secret_ref.clone())
            .ok_or(MfaError::UnknownSecret)?;

        let result = self
            .handlers
            .verify
            .handle(VerifyMfaEnrollmentCommand {
                user_id: self.user.id.clone(),
                secret_ref,
                code: code.as_str().to_string(),
            })
            .await;

        match result {
            Ok(verified) => {
                self.enrollment.apply(MfaEvent::VerificationSucceeded)?;
                self.enrollment
                    .apply(MfaEvent::StatusRefreshed(verified.factors))
            }
            Err(err) => {
                self.enrollment
                    .apply(MfaEvent::VerificationFailed(err.clone()))?;
                Err(err)
            }
        }
    }

    pub async fn unenroll(&mut self, factor_id: FactorId) -> Result<(), MfaError> {
        self.enrollment.apply(MfaEvent::BeginUnenroll(factor_id))?;

        let result = self
            .handlers
            .unenroll
            .handle(UnenrollMfaCommand {
                user_id: self.user.id.clone(),
                factor_id,
            })
            .await;

        match result {
            Ok(remaining) => {
                self.enrollment.apply(MfaEvent::UnenrollSucceeded)?;
                self.enrollment.apply(MfaEvent::StatusRefreshed(remaining))
            }
            Err(err) => {
                self.enrollment.apply(MfaEvent::UnenrollFailed(err.clone()))?;
                Err(err)
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        // Legal in every state.
        let _ = self.enrollment.apply(MfaEvent::DismissError);
    }
}
