//! Request and response bodies for the booking endpoints.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::booking::{
    Appointment, AppointmentStatus, BookingRequest, BookingWindow, ClientDetails, Offering,
    PaymentMethod, ServiceType, TimeSlot, CATALOG,
};
use crate::domain::coach::{Coach, Specialty};
use crate::domain::foundation::{CoachId, IdempotencyKey};

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub offerings: &'static [Offering],
    pub slots: Vec<TimeSlot>,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl CatalogResponse {
    pub fn for_window(window: BookingWindow) -> Self {
        Self {
            offerings: CATALOG,
            slots: TimeSlot::all(),
            first_day: window.first_day(),
            last_day: window.last_day(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub time: TimeSlot,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
}

impl SlotsResponse {
    /// Every slot of the day, marked unavailable when booked.
    pub fn new(date: NaiveDate, booked: &BTreeSet<TimeSlot>) -> Self {
        let slots = TimeSlot::all()
            .into_iter()
            .map(|time| SlotAvailability {
                time,
                available: !booked.contains(&time),
            })
            .collect();
        Self { date, slots }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoachesQuery {
    pub service_type: ServiceType,
}

/// Public view of a coach. Contact details stay with staff.
#[derive(Debug, Clone, Serialize)]
pub struct CoachSummary {
    pub id: CoachId,
    pub name: String,
    pub specialty: Specialty,
    pub experience: String,
}

impl From<Coach> for CoachSummary {
    fn from(coach: Coach) -> Self {
        Self {
            id: coach.id,
            name: coach.name,
            specialty: coach.specialty,
            experience: coach.experience,
        }
    }
}

/// Missing text fields decode as empty and are reported by validation with
/// their field name.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<TimeSlot>,
    #[serde(default)]
    pub coach_id: Option<CoachId>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub idempotency_key: Option<IdempotencyKey>,
}

impl From<CreateAppointmentRequest> for BookingRequest {
    fn from(request: CreateAppointmentRequest) -> Self {
        BookingRequest {
            details: ClientDetails::new(
                request.client_name,
                request.client_email,
                request.client_phone,
            ),
            service_type: request.service_type,
            service_name: request.service_name,
            date: request.date,
            time: request.time,
            coach_id: request.coach_id,
            payment_method: request.payment_method,
            idempotency_key: request.idempotency_key,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub appointment: Appointment,
    /// True when the idempotency key matched an earlier booking.
    pub replayed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booked_slot_is_marked_unavailable() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let booked: BTreeSet<TimeSlot> = [TimeSlot::new(9).unwrap()].into_iter().collect();

        let response = SlotsResponse::new(date, &booked);

        assert_eq!(response.slots.len(), TimeSlot::all().len());
        let nine = response
            .slots
            .iter()
            .find(|s| s.time == TimeSlot::new(9).unwrap())
            .unwrap();
        assert!(!nine.available);
        assert_eq!(
            response.slots.iter().filter(|s| !s.available).count(),
            1
        );
    }

    #[test]
    fn appointment_request_decodes_display_time() {
        let request: CreateAppointmentRequest = serde_json::from_str(
            r#"{
                "client_name": "Maria Santos",
                "client_email": "maria@example.com",
                "client_phone": "09171234567",
                "service_type": "studio",
                "service_name": "Zumba Class",
                "date": "2025-06-02",
                "time": "9:00 AM",
                "payment_method": "cash"
            }"#,
        )
        .unwrap();

        let booking = BookingRequest::from(request);
        assert_eq!(booking.time, Some(TimeSlot::new(9).unwrap()));
        assert_eq!(booking.payment_method, PaymentMethod::Cash);
        assert!(booking.idempotency_key.is_none());
    }

    #[test]
    fn missing_name_decodes_as_empty() {
        let request: CreateAppointmentRequest = serde_json::from_str(
            r#"{"service_type": "gym", "payment_method": "gcash"}"#,
        )
        .unwrap();
        assert!(request.client_name.is_empty());
        assert!(request.date.is_none());
    }
}
