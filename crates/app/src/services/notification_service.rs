//! Notification centre: transient toasts raised by side-effecting use-cases.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use greenmachine_domain::error::{GreenMachineError, NotFoundError};
use greenmachine_domain::event::{Event, EventType};
use greenmachine_domain::id::NotificationId;
use greenmachine_domain::notification::{DEFAULT_TTL_MS, Notification, Severity};
use greenmachine_domain::time::{Timestamp, now};

use crate::ports::EventPublisher;

/// Holds the currently visible notifications.
///
/// Notifications are never persisted. Expired ones are dropped lazily by
/// [`active`](Self::active) and eagerly by [`prune_expired`](Self::prune_expired).
pub struct NotificationService<P> {
    publisher: P,
    ttl: Duration,
    active: Mutex<Vec<Notification>>,
}

impl<P: EventPublisher> NotificationService<P> {
    /// Create a notification centre with the default time-to-live.
    pub fn new(publisher: P) -> Self {
        Self::with_ttl(publisher, Duration::from_millis(DEFAULT_TTL_MS))
    }

    pub fn with_ttl(publisher: P, ttl: Duration) -> Self {
        Self {
            publisher,
            ttl,
            active: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raise a notification and announce it on the event bus.
    #[tracing::instrument(skip(self, message), fields(severity = ?severity))]
    pub async fn raise(&self, message: impl Into<String>, severity: Severity) -> Notification {
        let notification = Notification::new(message, severity, now(), self.ttl);
        tracing::debug!(message = %notification.message, "notification raised");
        self.lock().push(notification.clone());

        let event = Event::with_payload(EventType::NotificationRaised, &notification);
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(error = %err, "failed to publish notification event");
        }
        notification
    }

    /// Notifications that are still visible, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(now())
    }

    /// Notifications still visible at `at`. Expired entries are dropped.
    pub fn active_at(&self, at: Timestamp) -> Vec<Notification> {
        let mut active = self.lock();
        active.retain(|notification| !notification.is_expired(at));
        active.clone()
    }

    /// Dismiss a notification before it expires.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::NotFound`] when no visible notification
    /// has `id`.
    #[tracing::instrument(skip(self))]
    pub fn dismiss(&self, id: NotificationId) -> Result<(), GreenMachineError> {
        let mut active = self.lock();
        let before = active.len();
        active.retain(|notification| notification.id != id);
        if active.len() == before {
            return Err(NotFoundError {
                entity: "Notification",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Drop expired notifications and announce each expiry.
    ///
    /// Returns the number of notifications removed.
    pub async fn prune_expired(&self) -> usize {
        self.prune_expired_at(now()).await
    }

    pub async fn prune_expired_at(&self, at: Timestamp) -> usize {
        let expired: Vec<Notification> = {
            let mut active = self.lock();
            let (expired, kept): (Vec<_>, Vec<_>) = active
                .drain(..)
                .partition(|notification| notification.is_expired(at));
            *active = kept;
            expired
        };

        for notification in &expired {
            let event = Event::new(
                EventType::NotificationExpired,
                serde_json::json!({ "id": notification.id }),
            );
            if let Err(err) = self.publisher.publish(event).await {
                tracing::warn!(error = %err, "failed to publish expiry event");
            }
        }
        expired.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
