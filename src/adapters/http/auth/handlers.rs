//! Axum handlers for the auth endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::SecretString;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::{
    CompleteMfaChallengeCommand, ConfirmEmailCommand, RegisterCommand, ResendVerificationCommand,
    ResolveRoleQuery, SignInCommand,
};

use super::dto::{
    AccountResponse, LoginRequest, LoginResponse, MfaLoginRequest, RegisterRequest,
    RegisterResponse, ResendVerificationRequest, RoleResponse, VerifyEmailRequest,
};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .register_handler()
        .handle(RegisterCommand {
            email: request.email,
            password: SecretString::new(request.password),
            display_name: request.display_name,
            phone: request.phone,
        })
        .await?;

    let response = RegisterResponse {
        account: AccountResponse::from(result.account),
        verification_sent: result.verification_sent,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/auth/register
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .resend_verification_handler()
        .handle(ResendVerificationCommand {
            email: request.email,
        })
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .confirm_email_handler()
        .handle(ConfirmEmailCommand {
            token: request.token,
        })
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .sign_in_handler()
        .handle(SignInCommand {
            email: request.email,
            password: SecretString::new(request.password),
        })
        .await?;
    Ok(Json(LoginResponse::from(result)))
}

/// POST /api/auth/login/mfa
pub async fn login_mfa(
    State(state): State<AppState>,
    Json(request): Json<MfaLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signed_in = state
        .complete_mfa_challenge_handler()
        .handle(CompleteMfaChallengeCommand {
            challenge_id: request.challenge_id,
            code: request.code,
        })
        .await?;
    Ok(Json(LoginResponse::from(signed_in)))
}

/// GET /api/auth/role
pub async fn role(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .resolve_role_handler()
        .handle(ResolveRoleQuery { user_id: user.id })
        .await?;
    Ok(Json(RoleResponse::from(result)))
}
