//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine trait)
//! - `booking` - Service catalog, appointments, payment lifecycle, booking workflow
//! - `coach` - Coach records and service compatibility
//! - `account` - Account profiles and role routing
//! - `mfa` - TOTP enrollment and sign-in challenges

pub mod account;
pub mod booking;
pub mod coach;
pub mod foundation;
pub mod mfa;
