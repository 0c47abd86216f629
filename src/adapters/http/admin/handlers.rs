//! Axum handlers for the admin endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::{
    ConfirmPaymentCommand, CreateCoachCommand, ListCoachesQuery, ListPendingPaymentsQuery,
    RejectPaymentCommand, UpdateCoachStatusCommand,
};
use crate::domain::foundation::{AppointmentId, CoachId};

use super::dto::{
    CoachesResponse, CreateCoachRequest, PendingPaymentsResponse, UpdateCoachStatusRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/payments/pending
pub async fn pending_payments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let appointments = state
        .pending_payments_handler()
        .handle(ListPendingPaymentsQuery { actor_role })
        .await?;
    Ok(Json(PendingPaymentsResponse { appointments }))
}

/// POST /api/admin/payments/:id/confirm
pub async fn confirm_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let result = state
        .confirm_payment_handler()
        .handle(ConfirmPaymentCommand {
            appointment_id,
            actor_role,
        })
        .await?;
    tracing::info!(
        appointment_id = %appointment_id,
        actor = %user.id,
        "Payment confirmed"
    );
    Ok(Json(result.appointment))
}

/// POST /api/admin/payments/:id/reject
pub async fn reject_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let result = state
        .reject_payment_handler()
        .handle(RejectPaymentCommand {
            appointment_id,
            actor_role,
        })
        .await?;
    tracing::info!(
        appointment_id = %appointment_id,
        actor = %user.id,
        "Payment rejected"
    );
    Ok(Json(result.appointment))
}

// ════════════════════════════════════════════════════════════════════════════════
// Coaches
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/coaches
pub async fn list_coaches(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let coaches = state
        .list_coaches_handler()
        .handle(ListCoachesQuery { actor_role })
        .await?;
    Ok(Json(CoachesResponse { coaches }))
}

/// POST /api/admin/coaches
pub async fn create_coach(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateCoachRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let coach = state
        .create_coach_handler()
        .handle(CreateCoachCommand {
            name: request.name,
            email: request.email,
            phone: request.phone,
            specialty: request.specialty,
            experience: request.experience,
            actor_role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(coach)))
}

/// PATCH /api/admin/coaches/:id/status
pub async fn update_coach_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(coach_id): Path<CoachId>,
    Json(request): Json<UpdateCoachStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let coach = state
        .update_coach_status_handler()
        .handle(UpdateCoachStatusCommand {
            coach_id,
            status: request.status,
            actor_role,
        })
        .await?;
    Ok(Json(coach))
}
