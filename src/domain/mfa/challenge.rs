//! Second-factor sign-in challenge.

use serde::Serialize;

use crate::domain::foundation::{ChallengeId, Timestamp, UserId};

use super::MfaError;

/// Wrong codes accepted before the challenge is discarded.
pub const MAX_CHALLENGE_ATTEMPTS: u32 = 5;

/// Seconds a challenge stays open.
pub const CHALLENGE_TTL_SECS: u64 = 300;

/// Issued when the first factor succeeds for an account with TOTP enrolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MfaChallenge {
    pub id: ChallengeId,
    #[serde(skip)]
    pub user_id: UserId,
    pub expires_at: Timestamp,
    #[serde(skip)]
    pub attempts: u32,
}

impl MfaChallenge {
    pub fn issue(user_id: UserId, now: Timestamp, ttl_secs: u64) -> Self {
        Self {
            id: ChallengeId::new(),
            user_id,
            expires_at: now.plus_secs(ttl_secs),
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Checks the challenge can still take a code.
    pub fn ensure_open(&self, now: Timestamp) -> Result<(), MfaError> {
        if self.is_expired(now) {
            Err(MfaError::ChallengeExpired)
        } else if self.attempts >= MAX_CHALLENGE_ATTEMPTS {
            Err(MfaError::TooManyAttempts)
        } else {
            Ok(())
        }
    }

    /// Counts a wrong code. Returns `TooManyAttempts` once the limit is hit.
    pub fn record_failure(&mut self) -> MfaError {
        self.attempts += 1;
        if self.attempts >= MAX_CHALLENGE_ATTEMPTS {
            MfaError::TooManyAttempts
        } else {
            MfaError::InvalidOrExpiredCode
        }
    }
}
