//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Document Store Ports
//!
//! - `AppointmentRepository` - Appointments with slot uniqueness and conditional updates
//! - `CoachRepository` - Coach records
//! - `AccountRepository` - Account profiles and roles
//! - `IdentityStore` - Credentials and second factors behind the local provider
//!
//! ## Identity Ports
//!
//! - `IdentityProvider` - Credentials, sessions, and second factors
//! - `SessionValidator` - Bearer token validation for HTTP middleware
//! - `PasswordHasher` - Password hashing for the local provider
//! - `TotpGenerator` - Time-based code computation
//!
//! ## Infrastructure Ports
//!
//! - `Clock` - Current time

mod account_repository;
mod appointment_repository;
mod clock;
mod coach_repository;
mod identity_provider;
mod identity_store;
mod password_hasher;
mod session_validator;
mod totp_generator;

pub use account_repository::AccountRepository;
pub use appointment_repository::{
    appointment_not_found, slot_taken, version_conflict, AppointmentRepository, InsertOutcome,
};
pub use clock::Clock;
pub use coach_repository::CoachRepository;
pub use identity_provider::{IdentityProvider, Registration, Session, SignInOutcome};
pub use identity_store::{FactorRecord, IdentityRecord, IdentityStore, PendingSecret};
pub use password_hasher::PasswordHasher;
pub use session_validator::SessionValidator;
pub use totp_generator::TotpGenerator;
