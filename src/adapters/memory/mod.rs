//! In-memory document and identity store adapters.
//!
//! Used by tests and by the server when no database URL is configured.

mod account_repository;
mod appointment_repository;
mod coach_repository;
mod identity_store;

pub use account_repository::InMemoryAccountRepository;
pub use appointment_repository::InMemoryAppointmentRepository;
pub use coach_repository::InMemoryCoachRepository;
pub use identity_store::InMemoryIdentityStore;
