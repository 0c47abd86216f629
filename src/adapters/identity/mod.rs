//! Identity adapters - implementations of `IdentityProvider` and
//! `SessionValidator`.
//!
//! - `LocalIdentityProvider` - in-process provider over an `IdentityStore` (Argon2id, HS256 sessions, TOTP)
//! - `MockIdentityProvider` / `MockSessionValidator` - test doubles

mod local;
mod mock;

pub use local::{LocalIdentityConfig, LocalIdentityProvider};
pub use mock::{MockIdentityProvider, MockSessionValidator, MOCK_VALID_CODE};
