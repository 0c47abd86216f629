//! GetMfaStatusHandler - Query handler for a user's enrolled factors.

use std::sync::Arc;

use serde::Serialize;

use crate::application::CallPolicy;
use crate::domain::foundation::UserId;
use crate::domain::mfa::{MfaError, MfaFactor};
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct GetMfaStatusQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MfaStatus {
    pub enrolled: bool,
    pub factors: Vec<MfaFactor>,
}

/// Enrollment is always derived from the provider's list, never cached.
pub struct GetMfaStatusHandler {
    identity: Arc<dyn IdentityProvider>,
    policy: CallPolicy,
}

impl GetMfaStatusHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, policy: CallPolicy) -> Self {
        Self { identity, policy }
    }

    pub async fn handle(&self, query: GetMfaStatusQuery) -> Result<MfaStatus, MfaError> {
        let factors = self
            .policy
            .read("list_factors", || self.identity.list_factors(&query.user_id))
            .await?;
        Ok(MfaStatus {
            enrolled: !factors.is_empty(),
            factors,
        })
    }
}
