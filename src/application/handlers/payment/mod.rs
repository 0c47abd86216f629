//! Payment confirmation handlers (admin only).
//!
//! ## Commands
//! - Confirming a payment (payment + appointment confirmed)
//! - Rejecting a payment (payment rejected, appointment cancelled)
//!
//! ## Queries
//! - Payments awaiting a decision

mod confirm_payment;
mod list_pending_payments;
mod reject_payment;

// Commands
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use reject_payment::{RejectPaymentCommand, RejectPaymentHandler, RejectPaymentResult};

// Queries
pub use list_pending_payments::{ListPendingPaymentsHandler, ListPendingPaymentsQuery};
