//! Event: an immutable record of something that happened.
//!
//! Events are produced when the intensity is refreshed, the appliance
//! changes, points are awarded, notifications come and go, etc. They are
//! broadcast to observers (e.g. the SSE stream) and never stored.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    IntensityRefreshed,
    ApplianceChanged,
    PointsAwarded,
    PreferencesUpdated,
    NotificationRaised,
    NotificationExpired,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::IntensityRefreshed => "intensity_refreshed",
            Self::ApplianceChanged => "appliance_changed",
            Self::PointsAwarded => "points_awarded",
            Self::PreferencesUpdated => "preferences_updated",
            Self::NotificationRaised => "notification_raised",
            Self::NotificationExpired => "notification_expired",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            data,
            timestamp: now(),
        }
    }

    /// Create an event whose payload is the JSON form of `payload`.
    ///
    /// Falls back to `null` data if the payload cannot be serialised.
    #[must_use]
    pub fn with_payload<T: Serialize>(event_type: EventType, payload: &T) -> Self {
        Self::new(
            event_type,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }
}
