//! Axum handlers for the booking endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::{
    GetBookedSlotsQuery, ListBookableCoachesQuery, ListMyAppointmentsQuery,
    SubmitBookingCommand, UpdateAppointmentStatusCommand,
};
use crate::domain::booking::BookingWindow;
use crate::domain::foundation::AppointmentId;
use crate::ports::Clock;

use super::dto::{
    AppointmentsResponse, BookingResponse, CatalogResponse, CoachSummary, CoachesQuery,
    CreateAppointmentRequest, SlotsQuery, SlotsResponse, UpdateStatusRequest,
};

/// GET /api/catalog
pub async fn catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(CatalogResponse::for_window(BookingWindow::starting(
        state.clock.today(),
    )))
}

/// GET /api/slots?date=YYYY-MM-DD
pub async fn slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let booked = state
        .booked_slots_handler()
        .handle(GetBookedSlotsQuery { date: query.date })
        .await?;
    Ok(Json(SlotsResponse::new(query.date, &booked)))
}

/// GET /api/coaches?service_type=gym
pub async fn coaches(
    State(state): State<AppState>,
    Query(query): Query<CoachesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let coaches = state
        .bookable_coaches_handler()
        .handle(ListBookableCoachesQuery {
            service_type: query.service_type,
        })
        .await?;
    let coaches: Vec<CoachSummary> = coaches.into_iter().map(CoachSummary::from).collect();
    Ok(Json(coaches))
}

/// POST /api/appointments
///
/// Anonymous callers reach the handler so the rejection carries the
/// booking error code.
pub async fn create_appointment(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .submit_booking_handler()
        .handle(SubmitBookingCommand {
            user_id: user.map(|u| u.id),
            request: request.into(),
        })
        .await?;

    let status = if result.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(BookingResponse {
            appointment: result.appointment,
            replayed: result.replayed,
        }),
    ))
}

/// GET /api/appointments/mine
pub async fn my_appointments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let appointments = state
        .my_appointments_handler()
        .handle(ListMyAppointmentsQuery { user_id: user.id })
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// PATCH /api/appointments/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(appointment_id): Path<AppointmentId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor_role = state.actor_role(&user).await?;
    let result = state
        .update_appointment_status_handler()
        .handle(UpdateAppointmentStatusCommand {
            appointment_id,
            status: request.status,
            actor_role,
        })
        .await?;
    Ok(Json(result.appointment))
}
