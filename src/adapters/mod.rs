//! Adapters - Implementations of port interfaces.
//!
//! - `clock` - System and fixed clocks
//! - `crypto` - Argon2 password hashing and HMAC-based TOTP
//! - `http` - Axum REST API
//! - `identity` - Local identity provider and test doubles
//! - `memory` - In-memory document store
//! - `postgres` - PostgreSQL document store

pub mod clock;
pub mod crypto;
pub mod http;
pub mod identity;
pub mod memory;
pub mod postgres;
