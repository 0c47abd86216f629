//! HTTP adapter for the client booking surface.
//!
//! - `GET /api/catalog` - Offerings, daily slots, and the booking window
//! - `GET /api/slots?date=YYYY-MM-DD` - Per-slot availability for a date
//! - `GET /api/coaches?service_type=gym` - Active coaches for a service type
//! - `POST /api/appointments` - Book (requires sign-in)
//! - `GET /api/appointments/mine` - The caller's appointments
//! - `PATCH /api/appointments/:id/status` - Staff status change

pub mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use routes::booking_routes;
