//! Account profile record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

use super::Role;

/// Profile stored alongside the identity record. Holds the role that drives
/// post-sign-in routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: Timestamp,
}

impl Account {
    pub fn register(
        uid: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        phone: Option<String>,
        role: Role,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_string();
        let display_name = display_name.into().trim().to_string();

        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        if display_name.is_empty() {
            return Err(ValidationError::empty_field("display_name"));
        }

        Ok(Self {
            uid,
            email,
            display_name,
            phone: phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            role,
            email_verified: false,
            created_at: now,
        })
    }

    pub fn mark_verified(&mut self) {
        self.email_verified = true;
    }

    pub fn promote(&mut self, role: Role) {
        self.role = role;
    }
}
