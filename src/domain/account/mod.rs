//! Account domain - profile records and role-based routing.

mod aggregate;
mod errors;
mod role;

pub use aggregate::Account;
pub use errors::AccountError;
pub use role::{Role, RoleAssignment};
