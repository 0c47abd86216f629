//! Coach domain - coach records and their booking compatibility.

mod aggregate;
mod errors;

pub use aggregate::{Coach, CoachStatus, Specialty};
pub use errors::CoachError;
