//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{ResolveRoleResult, SignInResult, SignedIn};
use crate::domain::account::{Account, Role};
use crate::domain::foundation::{ChallengeId, Timestamp, UserId};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MfaLoginRequest {
    pub challenge_id: ChallengeId,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub email_verified: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            uid: account.uid,
            email: account.email,
            display_name: account.display_name,
            role: account.role,
            email_verified: account.email_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub account: AccountResponse,
    pub verification_sent: bool,
}

/// Sign-in outcome. A challenge is a normal 200 response, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginResponse {
    SignedIn {
        access_token: String,
        expires_at: Timestamp,
        role: Role,
        home_path: &'static str,
    },
    MfaRequired {
        challenge_id: ChallengeId,
        expires_at: Timestamp,
    },
}

impl From<SignedIn> for LoginResponse {
    fn from(signed_in: SignedIn) -> Self {
        LoginResponse::SignedIn {
            home_path: signed_in.home_path(),
            role: signed_in.role,
            access_token: signed_in.session.access_token,
            expires_at: signed_in.session.expires_at,
        }
    }
}

impl From<SignInResult> for LoginResponse {
    fn from(result: SignInResult) -> Self {
        match result {
            SignInResult::SignedIn(signed_in) => signed_in.into(),
            SignInResult::ChallengeRequired(challenge) => LoginResponse::MfaRequired {
                challenge_id: challenge.id,
                expires_at: challenge.expires_at,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub role: Role,
    pub home_path: &'static str,
}

impl From<ResolveRoleResult> for RoleResponse {
    fn from(result: ResolveRoleResult) -> Self {
        Self {
            role: result.role,
            home_path: result.home_path,
        }
    }
}
