//! Service catalog, daily slot enumeration, and the booking window.
//!
//! All three are fixed tables: the venue offers a closed set of services,
//! one-hour slots from 6:00 AM to 8:00 PM (no noon slot), and bookings only
//! for the seven days starting today.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Top-level kind of service a client books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Gym,
    Studio,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Gym => "gym",
            ServiceType::Studio => "studio",
        }
    }

    /// Catalog entries offered under this service type.
    pub fn offerings(&self) -> impl Iterator<Item = &'static Offering> {
        let service_type = *self;
        CATALOG.iter().filter(move |o| o.service_type == service_type)
    }

    /// Looks up an offering by its exact display name.
    pub fn offering(&self, name: &str) -> Option<&'static Offering> {
        self.offerings().find(|o| o.name == name)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gym" => Ok(ServiceType::Gym),
            "studio" => Ok(ServiceType::Studio),
            other => Err(ValidationError::invalid_format(
                "service_type",
                format!("unknown service type '{}'", other),
            )),
        }
    }
}

/// A bookable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offering {
    pub service_type: ServiceType,
    pub name: &'static str,
    pub description: &'static str,
    /// Booking must name a coach when set.
    pub requires_coach: bool,
}

pub const CATALOG: &[Offering] = &[
    Offering {
        service_type: ServiceType::Gym,
        name: "Gym Session",
        description: "Open floor access to weights and cardio equipment",
        requires_coach: false,
    },
    Offering {
        service_type: ServiceType::Gym,
        name: "Personal Training",
        description: "One-on-one session with a gym coach",
        requires_coach: true,
    },
    Offering {
        service_type: ServiceType::Studio,
        name: "Karate Class",
        description: "Group karate class",
        requires_coach: false,
    },
    Offering {
        service_type: ServiceType::Studio,
        name: "Boxing Class",
        description: "Group boxing class",
        requires_coach: false,
    },
    Offering {
        service_type: ServiceType::Studio,
        name: "Zumba Class",
        description: "Group zumba class",
        requires_coach: false,
    },
];

/// First and last bookable start hours (24h clock).
const OPENING_HOUR: u8 = 6;
const LAST_START_HOUR: u8 = 20;
const NOON: u8 = 12;

/// One-hour slot start time, displayed and serialized as `"9:00 AM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    hour: u8,
}

impl TimeSlot {
    /// Creates a slot for a 24h start hour, rejecting hours outside the enumeration.
    pub fn new(hour: u8) -> Result<Self, ValidationError> {
        if !(OPENING_HOUR..=LAST_START_HOUR).contains(&hour) || hour == NOON {
            return Err(ValidationError::out_of_range(
                "time",
                OPENING_HOUR as i64,
                LAST_START_HOUR as i64,
                hour as i64,
            ));
        }
        Ok(Self { hour })
    }

    /// Every bookable slot of a day, in order.
    pub fn all() -> Vec<TimeSlot> {
        (OPENING_HOUR..=LAST_START_HOUR)
            .filter(|h| *h != NOON)
            .map(|hour| TimeSlot { hour })
            .collect()
    }

    /// Start hour on a 24h clock.
    pub fn hour(&self) -> u8 {
        self.hour
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (display_hour, meridiem) = match self.hour {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        write!(f, "{}:00 {}", display_hour, meridiem)
    }
}

impl FromStr for TimeSlot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("time", format!("'{}' is not a slot like 9:00 AM", s));

        let (clock, meridiem) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let (hour, minutes) = clock.split_once(':').ok_or_else(invalid)?;
        if minutes != "00" {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&hour) {
            return Err(invalid());
        }

        let hour = match meridiem.to_ascii_uppercase().as_str() {
            "AM" if hour == 12 => 0,
            "AM" => hour,
            "PM" if hour == 12 => 12,
            "PM" => hour + 12,
            _ => return Err(invalid()),
        };
        TimeSlot::new(hour)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// The dates a client may book: today and the six days after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    first: NaiveDate,
}

impl BookingWindow {
    pub const DAYS: u64 = 7;

    pub fn starting(today: NaiveDate) -> Self {
        Self { first: today }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_days(Days::new(Self::DAYS - 1))
            .unwrap_or(self.first)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last_day()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.first.iter_days().take(Self::DAYS as usize).collect()
    }

    /// Rejects a date outside the window with a field-level error.
    pub fn check(&self, date: NaiveDate) -> Result<(), ValidationError> {
        if self.contains(date) {
            Ok(())
        } else {
            Err(ValidationError::invalid_format(
                "date",
                format!(
                    "{} is outside the booking window {} to {}",
                    date,
                    self.first,
                    self.last_day()
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn gym_offerings_include_personal_training_with_coach() {
        let pt = ServiceType::Gym.offering("Personal Training").unwrap();
        assert!(pt.requires_coach);
        assert!(!ServiceType::Gym.offering("Gym Session").unwrap().requires_coach);
    }

    #[test]
    fn offering_lookup_is_scoped_to_service_type() {
        assert!(ServiceType::Studio.offering("Zumba Class").is_some());
        assert!(ServiceType::Gym.offering("Zumba Class").is_none());
        assert_eq!(ServiceType::Studio.offerings().count(), 3);
    }

    #[test]
    fn service_type_parses_case_insensitively() {
        assert_eq!("Studio".parse::<ServiceType>().unwrap(), ServiceType::Studio);
        assert!("spa".parse::<ServiceType>().is_err());
    }

    #[test]
    fn slot_enumeration_skips_noon() {
        let slots = TimeSlot::all();
        assert_eq!(slots.len(), 14);
        assert_eq!(slots.first().unwrap().to_string(), "6:00 AM");
        assert_eq!(slots.last().unwrap().to_string(), "8:00 PM");
        assert!(slots.iter().all(|s| s.hour() != 12));
    }

    #[test]
    fn slot_display_and_parse_agree() {
        let slot: TimeSlot = "9:00 AM".parse().unwrap();
        assert_eq!(slot.hour(), 9);
        assert_eq!(slot.to_string(), "9:00 AM");

        let afternoon: TimeSlot = "1:00 pm".parse().unwrap();
        assert_eq!(afternoon.hour(), 13);
    }

    #[test]
    fn slot_rejects_values_off_the_enumeration() {
        assert!("12:00 PM".parse::<TimeSlot>().is_err());
        assert!("9:30 AM".parse::<TimeSlot>().is_err());
        assert!("5:00 AM".parse::<TimeSlot>().is_err());
        assert!("9:00".parse::<TimeSlot>().is_err());
        assert!(TimeSlot::new(21).is_err());
    }

    #[test]
    fn slot_serializes_as_display_string() {
        let slot = TimeSlot::new(15).unwrap();
        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"3:00 PM\"");
        let back: TimeSlot = serde_json::from_str("\"3:00 PM\"").unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn window_covers_seven_days_from_today() {
        let window = BookingWindow::starting(date(2025, 6, 1));
        assert_eq!(window.dates().len(), 7);
        assert!(window.contains(date(2025, 6, 1)));
        assert!(window.contains(date(2025, 6, 7)));
        assert!(!window.contains(date(2025, 6, 8)));
        assert!(!window.contains(date(2025, 5, 31)));
    }

    #[test]
    fn window_check_reports_date_field() {
        let window = BookingWindow::starting(date(2025, 6, 1));
        let err = window.check(date(2025, 7, 1)).unwrap_err();
        assert_eq!(err.field(), "date");
    }
}
