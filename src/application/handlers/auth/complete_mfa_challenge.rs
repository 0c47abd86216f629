//! CompleteMfaChallengeHandler - Command handler for the second factor.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::foundation::ChallengeId;
use crate::domain::mfa::TotpCode;
use crate::ports::IdentityProvider;

use super::sign_in::with_role;
use super::{AuthFlowError, ResolveRoleHandler, SignedIn};

#[derive(Debug, Clone)]
pub struct CompleteMfaChallengeCommand {
    pub challenge_id: ChallengeId,
    /// Raw input; non-digits are stripped.
    pub code: String,
}

/// Submits a TOTP code against an open challenge.
///
/// Malformed codes are rejected locally. A wrong code leaves the challenge
/// open so the client can try again with a fresh code.
pub struct CompleteMfaChallengeHandler {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<ResolveRoleHandler>,
    policy: CallPolicy,
}

impl CompleteMfaChallengeHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        roles: Arc<ResolveRoleHandler>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            identity,
            roles,
            policy,
        }
    }

    pub async fn handle(&self, cmd: CompleteMfaChallengeCommand) -> Result<SignedIn, AuthFlowError> {
        let code = TotpCode::from_input(&cmd.code)?;

        let session = self
            .policy
            .write(
                "resolve_mfa_challenge",
                self.identity.resolve_mfa_challenge(&cmd.challenge_id, &code),
            )
            .await
            .map_err(|err| {
                if err.is_code_rejection() {
                    tracing::info!(challenge_id = %cmd.challenge_id, "Second-factor code rejected");
                }
                err
            })?;

        with_role(&self.roles, session).await
    }
}
