//! Router for the MFA endpoints, mounted at `/api/mfa`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{list_factors, start_enrollment, unenroll, verify_enrollment};

pub fn mfa_routes() -> Router<AppState> {
    Router::new()
        .route("/enrollment", post(start_enrollment))
        .route("/enrollment/verify", post(verify_enrollment))
        .route("/factors", get(list_factors))
        .route("/factors/:id", delete(unenroll))
}
