//! GymSchedPro - gym and studio scheduling service
//!
//! This crate implements client booking of gym sessions and studio classes
//! with enforced slot uniqueness, admin payment confirmation, and TOTP
//! second-factor enrollment and sign-in.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
