//! GetBookedSlotsHandler - Query handler for slot availability.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::CallPolicy;
use crate::domain::booking::TimeSlot;
use crate::domain::foundation::DomainError;
use crate::ports::AppointmentRepository;

#[derive(Debug, Clone)]
pub struct GetBookedSlotsQuery {
    pub date: NaiveDate,
}

/// Times already held on a date.
///
/// A point-in-time read used to disable slots in the picker. The insert path
/// enforces uniqueness, so a stale answer here costs a retry, not a double
/// booking.
pub struct GetBookedSlotsHandler {
    repository: Arc<dyn AppointmentRepository>,
    policy: CallPolicy,
}

impl GetBookedSlotsHandler {
    pub fn new(repository: Arc<dyn AppointmentRepository>, policy: CallPolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn handle(&self, query: GetBookedSlotsQuery) -> Result<BTreeSet<TimeSlot>, DomainError> {
        self.policy
            .read("booked_slots", || self.repository.booked_slots(query.date))
            .await
    }
}
