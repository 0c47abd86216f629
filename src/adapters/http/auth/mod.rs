//! HTTP adapter for sign-up and sign-in.
//!
//! - `POST /api/auth/register` - Create a client account
//! - `PUT /api/auth/register` - Resend the verification email
//! - `POST /api/auth/verify-email` - Confirm an email address
//! - `POST /api/auth/login` - First factor
//! - `POST /api/auth/login/mfa` - Second factor against an open challenge
//! - `GET /api/auth/role` - Role and landing path of the caller

pub mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::auth_routes;
