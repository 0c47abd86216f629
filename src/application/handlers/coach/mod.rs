//! Coach administration handlers (admin and owner only).
//!
//! ## Commands
//! - Creating a coach
//! - Activating / deactivating a coach
//!
//! ## Queries
//! - All coaches, any status

mod create_coach;
mod list_coaches;
mod update_coach_status;

// Commands
pub use create_coach::{CreateCoachCommand, CreateCoachHandler};
pub use update_coach_status::{UpdateCoachStatusCommand, UpdateCoachStatusHandler};

// Queries
pub use list_coaches::{ListCoachesHandler, ListCoachesQuery};
