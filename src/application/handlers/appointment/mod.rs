//! Appointment lifecycle handlers (staff).

mod update_appointment_status;

pub use update_appointment_status::{
    UpdateAppointmentStatusCommand, UpdateAppointmentStatusHandler, UpdateAppointmentStatusResult,
};
