//! Booking handlers.
//!
//! ## Commands
//! - Submitting a booking
//!
//! ## Queries
//! - Booked slots for a date
//! - Coaches bookable for a service type
//! - A client's own appointments
//!
//! `BookingSession` drives the client booking workflow against these.

mod get_booked_slots;
mod list_bookable_coaches;
mod list_my_appointments;
mod session;
mod submit_booking;

// Commands
pub use submit_booking::{SubmitBookingCommand, SubmitBookingHandler, SubmitBookingResult};

// Queries
pub use get_booked_slots::{GetBookedSlotsHandler, GetBookedSlotsQuery};
pub use list_bookable_coaches::{ListBookableCoachesHandler, ListBookableCoachesQuery};
pub use list_my_appointments::{ListMyAppointmentsHandler, ListMyAppointmentsQuery};

pub use session::BookingSession;
