//! Booking domain - catalog, appointments, payment lifecycle, and the
//! client booking workflow.
//!
//! # Module Organization
//!
//! - `catalog` - Service offerings, the daily slot enumeration, booking window
//! - `status` - Appointment and payment status state machines
//! - `appointment` - Appointment aggregate and booking request validation
//! - `workflow` - Client booking state machine (step enum + event reducer)
//! - `errors` - Booking and appointment error types

mod appointment;
mod catalog;
mod errors;
mod status;
mod workflow;

pub use appointment::{Appointment, BookingRequest, CheckedBooking, ClientDetails};
pub use catalog::{BookingWindow, Offering, ServiceType, TimeSlot, CATALOG};
pub use errors::{AppointmentError, BookingError};
pub use status::{AppointmentStatus, PaymentMethod, PaymentStatus};
pub use workflow::{
    BookingDraft, BookingEvent, BookingStep, BookingWorkflow, SubmissionOutcome, BOOKED_NOTICE,
};
