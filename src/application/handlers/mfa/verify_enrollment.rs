//! VerifyMfaEnrollmentHandler - Command handler completing TOTP enrollment.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::foundation::UserId;
use crate::domain::mfa::{MfaError, MfaFactor, TotpCode};
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct VerifyMfaEnrollmentCommand {
    pub user_id: UserId,
    pub secret_ref: String,
    /// Raw input; non-digits are stripped.
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct VerifyMfaEnrollmentResult {
    pub factor: MfaFactor,
    /// Factor list re-read from the provider after enrolling.
    pub factors: Vec<MfaFactor>,
}

pub struct VerifyMfaEnrollmentHandler {
    identity: Arc<dyn IdentityProvider>,
    policy: CallPolicy,
}

impl VerifyMfaEnrollmentHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, policy: CallPolicy) -> Self {
        Self { identity, policy }
    }

    pub async fn handle(
        &self,
        cmd: VerifyMfaEnrollmentCommand,
    ) -> Result<VerifyMfaEnrollmentResult, MfaError> {
        let code = TotpCode::from_input(&cmd.code)?;

        let factor = self
            .policy
            .write(
                "verify_and_enroll",
                self.identity
                    .verify_and_enroll(&cmd.user_id, &cmd.secret_ref, &code),
            )
            .await?;

        let factors = self
            .policy
            .read("list_factors", || self.identity.list_factors(&cmd.user_id))
            .await?;

        tracing::info!(user_id = %cmd.user_id, factor_id = %factor.id, "MFA enrolled");
        Ok(VerifyMfaEnrollmentResult { factor, factors })
    }
}
