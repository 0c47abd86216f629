//! Clock port.

use chrono::NaiveDate;

use crate::domain::foundation::Timestamp;

/// Source of the current time. Handlers never call `Timestamp::now()`
/// directly so tests can pin the booking window and TOTP steps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// First day of the booking window.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
