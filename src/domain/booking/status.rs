//! Appointment and payment lifecycles.
//!
//! The two lifecycles are independent enums but causally linked by the
//! payment confirmation workflow: confirming payment confirms the
//! appointment, rejecting it cancels the appointment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Created by a booking, awaiting confirmation.
    Pending,
    /// Confirmed by an admin or coach, or by payment confirmation.
    Confirmed,
    /// Session took place.
    Completed,
    /// Cancelled by staff or by payment rejection.
    Cancelled,
}

impl AppointmentStatus {
    /// True for statuses that hold their (date, time) slot.
    pub fn holds_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for AppointmentStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use AppointmentStatus::*;
        match self {
            Pending => vec![Confirmed, Cancelled],
            Confirmed => vec![Completed, Cancelled],
            Completed => vec![],
            Cancelled => vec![],
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown appointment status '{}'", other),
            )),
        }
    }
}

/// How the client pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Settled at the venue.
    Cash,
    /// QR-based external payment, self-reported by the client.
    Gcash,
}

impl PaymentMethod {
    /// Payment status a fresh booking starts in.
    ///
    /// GCash starts as `Paid` on the client's word; only an admin moves it to
    /// `Confirmed`.
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Cash => PaymentStatus::Pending,
            PaymentMethod::Gcash => PaymentStatus::Paid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Gcash => "gcash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "gcash" => Ok(PaymentMethod::Gcash),
            other => Err(ValidationError::invalid_format(
                "payment_method",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

/// Payment settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing received yet (cash bookings).
    Pending,
    /// Client reports having paid; not yet reconciled.
    Paid,
    /// Admin confirmed receipt of funds.
    Confirmed,
    /// Admin rejected the payment.
    Rejected,
}

impl PaymentStatus {
    /// True while an admin still has to confirm or reject.
    pub fn awaiting_admin(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

impl StateMachine for PaymentStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending | Paid => vec![Confirmed, Rejected],
            Confirmed | Rejected => vec![],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(ValidationError::invalid_format(
                "payment_status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_appointment_can_be_confirmed_or_cancelled() {
        assert!(AppointmentStatus::Pending.can_transition_to(&AppointmentStatus::Confirmed));
        assert!(AppointmentStatus::Pending.can_transition_to(&AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Pending.can_transition_to(&AppointmentStatus::Completed));
    }

    #[test]
    fn completed_and_cancelled_are_terminal() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Confirmed.is_terminal());
    }

    #[test]
    fn only_pending_and_confirmed_hold_slots() {
        assert!(AppointmentStatus::Pending.holds_slot());
        assert!(AppointmentStatus::Confirmed.holds_slot());
        assert!(!AppointmentStatus::Completed.holds_slot());
        assert!(!AppointmentStatus::Cancelled.holds_slot());
    }

    #[test]
    fn payment_method_sets_initial_status() {
        assert_eq!(PaymentMethod::Cash.initial_status(), PaymentStatus::Pending);
        assert_eq!(PaymentMethod::Gcash.initial_status(), PaymentStatus::Paid);
    }

    #[test]
    fn self_reported_payment_still_needs_admin() {
        assert!(PaymentStatus::Paid.awaiting_admin());
        assert!(PaymentStatus::Paid.can_transition_to(&PaymentStatus::Confirmed));
        assert!(PaymentStatus::Paid.can_transition_to(&PaymentStatus::Rejected));
    }

    #[test]
    fn settled_payments_are_terminal() {
        assert!(PaymentStatus::Confirmed.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
        assert!(PaymentStatus::Rejected
            .transition_to(PaymentStatus::Confirmed)
            .is_err());
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert_eq!("gcash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Gcash);
        assert!("card".parse::<PaymentMethod>().is_err());
    }
}
