//! Router for the auth endpoints, mounted at `/api/auth`.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{login, login_mfa, register, resend_verification, role, verify_email};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).put(resend_verification))
        .route("/verify-email", post(verify_email))
        .route("/login", post(login))
        .route("/login/mfa", post(login_mfa))
        .route("/role", get(role))
}
