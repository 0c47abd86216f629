//! Crypto adapters - password hashing and TOTP computation.

mod argon2;
mod totp;

pub use self::argon2::Argon2PasswordHasher;
pub use self::totp::{generate_secret, HmacTotpGenerator, SECRET_BYTES};
