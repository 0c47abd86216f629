//! Coach record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::booking::ServiceType;
use crate::domain::foundation::{CoachId, Timestamp, ValidationError};

/// Discipline a coach teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialty {
    Gym,
    Karate,
    Boxing,
    Zumba,
}

impl Specialty {
    /// Service type this specialty is offered under.
    pub fn service_type(&self) -> ServiceType {
        match self {
            Specialty::Gym => ServiceType::Gym,
            Specialty::Karate | Specialty::Boxing | Specialty::Zumba => ServiceType::Studio,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Gym => "gym",
            Specialty::Karate => "karate",
            Specialty::Boxing => "boxing",
            Specialty::Zumba => "zumba",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gym" => Ok(Specialty::Gym),
            "karate" => Ok(Specialty::Karate),
            "boxing" => Ok(Specialty::Boxing),
            "zumba" => Ok(Specialty::Zumba),
            other => Err(ValidationError::invalid_format(
                "specialty",
                format!("unknown specialty '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachStatus {
    Active,
    Inactive,
}

impl CoachStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachStatus::Active => "active",
            CoachStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for CoachStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CoachStatus::Active),
            "inactive" => Ok(CoachStatus::Inactive),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown coach status '{}'", other),
            )),
        }
    }
}

/// A coach who can be assigned to bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    pub id: CoachId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: Specialty,
    /// Free-text summary of experience.
    pub experience: String,
    pub status: CoachStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Coach {
    /// Creates an active coach after checking the contact fields.
    pub fn create(
        id: CoachId,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        specialty: Specialty,
        experience: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();
        let phone = phone.into().trim().to_string();

        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        if phone.is_empty() {
            return Err(ValidationError::empty_field("phone"));
        }

        Ok(Self {
            id,
            name,
            email,
            phone,
            specialty,
            experience: experience.into(),
            status: CoachStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this coach may be picked for a booking of `service_type`.
    pub fn is_offerable_for(&self, service_type: ServiceType) -> bool {
        self.status == CoachStatus::Active && self.specialty.service_type() == service_type
    }

    pub fn set_status(&mut self, status: CoachStatus, now: Timestamp) {
        self.status = status;
        self.updated_at = now;
    }
}
