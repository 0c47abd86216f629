//! Request and response bodies for the admin endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::booking::Appointment;
use crate::domain::coach::{Coach, CoachStatus, Specialty};

#[derive(Debug, Clone, Serialize)]
pub struct PendingPaymentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCoachRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: Specialty,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCoachStatusRequest {
    pub status: CoachStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachesResponse {
    pub coaches: Vec<Coach>,
}
