//! Axum handlers for the MFA endpoints.

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::{
    GetMfaStatusQuery, StartMfaEnrollmentCommand, UnenrollMfaCommand, VerifyMfaEnrollmentCommand,
};
use crate::domain::foundation::FactorId;

use super::dto::{
    EnrollmentResponse, FactorsResponse, VerifyEnrollmentRequest, VerifyEnrollmentResponse,
};

/// POST /api/mfa/enrollment
pub async fn start_enrollment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let secret = state
        .start_mfa_enrollment_handler()
        .handle(StartMfaEnrollmentCommand { user })
        .await?;
    Ok(Json(EnrollmentResponse::from(secret)))
}

/// POST /api/mfa/enrollment/verify
pub async fn verify_enrollment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<VerifyEnrollmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .verify_mfa_enrollment_handler()
        .handle(VerifyMfaEnrollmentCommand {
            user_id: user.id,
            secret_ref: request.secret_ref,
            code: request.code,
        })
        .await?;
    Ok(Json(VerifyEnrollmentResponse {
        factor: result.factor,
        factors: result.factors,
    }))
}

/// GET /api/mfa/factors
pub async fn list_factors(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .mfa_status_handler()
        .handle(GetMfaStatusQuery { user_id: user.id })
        .await?;
    Ok(Json(FactorsResponse {
        enrolled: status.enrolled,
        factors: status.factors,
    }))
}

/// DELETE /api/mfa/factors/:id
pub async fn unenroll(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(factor_id): Path<FactorId>,
) -> Result<impl IntoResponse, ApiError> {
    let factors = state
        .unenroll_mfa_handler()
        .handle(UnenrollMfaCommand {
            user_id: user.id,
            factor_id,
        })
        .await?;
    Ok(Json(FactorsResponse {
        enrolled: !factors.is_empty(),
        factors,
    }))
}
