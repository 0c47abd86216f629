//! SignInHandler - Command handler for the first factor.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::CallPolicy;
use crate::domain::account::Role;
use crate::domain::mfa::MfaChallenge;
use crate::ports::{IdentityProvider, Session, SignInOutcome};

use super::{AuthFlowError, ResolveRoleHandler, ResolveRoleQuery};

#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: SecretString,
}

/// A completed sign-in with the role used for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub session: Session,
    pub role: Role,
}

impl SignedIn {
    pub fn home_path(&self) -> &'static str {
        self.role.home_path()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    SignedIn(SignedIn),
    /// Submit a code with `CompleteMfaChallengeHandler`.
    ChallengeRequired(MfaChallenge),
}

pub struct SignInHandler {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<ResolveRoleHandler>,
    policy: CallPolicy,
}

impl SignInHandler {
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

    pub async fn handle(&self, cmd: SignInCommand) -> Result<SignInResult, AuthFlowError> {
        let outcome = self
            .policy
            .write("sign_in", self.identity.sign_in(&cmd.email, &cmd.password))
            .await?;

        match outcome {
            SignInOutcome::Authenticated(session) => {
                let signed_in = with_role(&self.roles, session).await?;
                Ok(SignInResult::SignedIn(signed_in))
            }
            SignInOutcome::ChallengeRequired(challenge) => {
                tracing::debug!(challenge_id = %challenge.id, "Awaiting second factor");
                Ok(SignInResult::ChallengeRequired(challenge))
            }
        }
    }
}

/// Resolves the role for a fresh session.
pub(super) async fn with_role(
    roles: &ResolveRoleHandler,
    session: Session,
) -> Result<SignedIn, AuthFlowError> {
    let resolved = roles
        .handle(ResolveRoleQuery {
            user_id: session.user.id.clone(),
        })
        .await?;
    Ok(SignedIn {
        session,
        role: resolved.role,
    })
}
