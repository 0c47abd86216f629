//! HTTP adapter for staff operations. Role checks happen in the
//! application handlers against the caller's account role.
//!
//! - `GET /api/admin/payments/pending` - Payments awaiting a decision
//! - `POST /api/admin/payments/:id/confirm` - Confirm payment and appointment
//! - `POST /api/admin/payments/:id/reject` - Reject payment, cancel appointment
//! - `GET /api/admin/coaches` - All coaches
//! - `POST /api/admin/coaches` - Add a coach
//! - `PATCH /api/admin/coaches/:id/status` - Activate or deactivate a coach

pub mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::admin_routes;
