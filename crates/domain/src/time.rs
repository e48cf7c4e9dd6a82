//! Time and timestamp helpers.

use chrono::{DateTime, Duration, Utc};

/// UTC timestamp used for `last_changed`, forecast bounds, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return `ts` shifted forward by a whole number of hours.
#[must_use]
pub fn plus_hours(ts: Timestamp, hours: u32) -> Timestamp {
    ts + Duration::hours(i64::from(hours))
}

/// Whether `ts` falls inside the inclusive window `[start, end]`.
#[must_use]
pub fn within(ts: Timestamp, start: Timestamp, end: Timestamp) -> bool {
    ts >= start && ts <= end
}
