//! HTTP adapter for TOTP enrollment. Every route requires a signed-in user.
//!
//! - `POST /api/mfa/enrollment` - Issue a secret and provisioning URI
//! - `POST /api/mfa/enrollment/verify` - Verify a code and enroll the factor
//! - `GET /api/mfa/factors` - Enrollment status and factors
//! - `DELETE /api/mfa/factors/:id` - Remove a factor

pub mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::mfa_routes;
