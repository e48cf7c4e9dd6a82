//! Notification: an ephemeral, user-visible message.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::id::NotificationId;
use crate::time::Timestamp;

/// How long a notification stays visible by default.
pub const DEFAULT_TTL_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast. Created by side-effecting operations, expires, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Notification {
    /// Create a notification visible for `ttl` starting at `created_at`.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        severity: Severity,
        created_at: Timestamp,
        ttl: std::time::Duration,
    ) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::milliseconds(
            i64::try_from(DEFAULT_TTL_MS).unwrap_or(i64::MAX),
        ));
        Self {
            id: NotificationId::new(),
            message: message.into(),
            severity,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}
