//! Router for the admin endpoints, mounted at `/api/admin`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{
    confirm_payment, create_coach, list_coaches, pending_payments, reject_payment,
    update_coach_status,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/payments/pending", get(pending_payments))
        .route("/payments/:id/confirm", post(confirm_payment))
        .route("/payments/:id/reject", post(reject_payment))
        .route("/coaches", get(list_coaches).post(create_coach))
        .route("/coaches/:id/status", patch(update_coach_status))
}
