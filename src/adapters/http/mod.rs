//! HTTP adapters - REST API over the application handlers.
//!
//! Each area has its own module with `dto`, `handlers`, and `routes`. All of
//! them share [`AppState`] and map errors through [`ApiError`].

pub mod admin;
pub mod auth;
pub mod booking;
pub mod error;
pub mod mfa;
pub mod middleware;
mod router;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::api_router;
pub use state::AppState;
