//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations. Each takes
//! its ports as `Arc<dyn _>` plus a [`CallPolicy`](crate::application::CallPolicy)
//! applied to every port call.

pub mod appointment;
pub mod auth;
pub mod booking;
pub mod coach;
pub mod mfa;
pub mod payment;
