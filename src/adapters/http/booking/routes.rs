//! Router for the booking endpoints, mounted at `/api`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{
    catalog, coaches, create_appointment, my_appointments, slots, update_status,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog))
        .route("/slots", get(slots))
        .route("/coaches", get(coaches))
        .route("/appointments", post(create_appointment))
        .route("/appointments/mine", get(my_appointments))
        .route("/appointments/:id/status", patch(update_status))
}
