//! Account roles and registration-time role assignment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Role stored on the account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Coach,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Coach => "coach",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Landing page after a completed sign-in.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin | Role::Owner => "/admin/dashboard",
            Role::Coach => "/coach/dashboard",
            Role::Client => "/client/booking",
        }
    }

    /// Confirm/reject payments, manage coaches.
    pub fn can_manage_payments(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }

    /// Move appointments through their status lifecycle.
    pub fn can_update_appointments(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner | Role::Coach)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "coach" => Ok(Role::Coach),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Privileged addresses that receive a staff role at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub admin_email: Option<String>,
    pub owner_email: Option<String>,
}

impl RoleAssignment {
    pub fn new(admin_email: Option<String>, owner_email: Option<String>) -> Self {
        Self {
            admin_email,
            owner_email,
        }
    }

    /// Role for a newly registered email. Comparison ignores case and
    /// surrounding whitespace.
    pub fn role_for(&self, email: &str) -> Role {
        let email = email.trim();
        let matches = |configured: &Option<String>| {
            configured
                .as_deref()
                .map(|c| c.trim().eq_ignore_ascii_case(email))
                .unwrap_or(false)
        };

        if matches(&self.admin_email) {
            Role::Admin
        } else if matches(&self.owner_email) {
            Role::Owner
        } else {
            Role::Client
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment() -> RoleAssignment {
        RoleAssignment::new(
            Some("admin@gymsched.test".into()),
            Some("owner@gymsched.test".into()),
        )
    }

    #[test]
    fn privileged_emails_get_staff_roles() {
        let roles = assignment();
        assert_eq!(roles.role_for("admin@gymsched.test"), Role::Admin);
        assert_eq!(roles.role_for(" Owner@GymSched.test "), Role::Owner);
        assert_eq!(roles.role_for("maria@example.com"), Role::Client);
    }

    #[test]
    fn unconfigured_assignment_makes_everyone_a_client() {
        assert_eq!(RoleAssignment::default().role_for("admin@gymsched.test"), Role::Client);
    }

    #[test]
    fn home_paths_follow_role() {
        assert_eq!(Role::Admin.home_path(), "/admin/dashboard");
        assert_eq!(Role::Owner.home_path(), "/admin/dashboard");
        assert_eq!(Role::Coach.home_path(), "/coach/dashboard");
        assert_eq!(Role::Client.home_path(), "/client/booking");
    }

    #[test]
    fn only_staff_manage_payments() {
        assert!(Role::Admin.can_manage_payments());
        assert!(Role::Owner.can_manage_payments());
        assert!(!Role::Coach.can_manage_payments());
        assert!(!Role::Client.can_manage_payments());
        assert!(Role::Coach.can_update_appointments());
        assert!(!Role::Client.can_update_appointments());
    }

    #[test]
    fn role_parses_from_str() {
        assert_eq!("coach".parse::<Role>().unwrap(), Role::Coach);
        assert!("superuser".parse::<Role>().is_err());
    }
}
