//! Shared state behind every mutating use-case.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use greenmachine_domain::appliance::ApplianceState;
use greenmachine_domain::decision::{AutomationDecisionEngine, Effect};
use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::event::{Event, EventType};
use greenmachine_domain::intensity::CarbonIntensitySample;
use greenmachine_domain::notification::{Notification, Severity};

use crate::ports::{Backend, EventPublisher};
use crate::services::notification_service::NotificationService;

/// What happened while applying a list of effects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedEffects {
    /// Appliance state after the transition, if one was applied.
    pub appliance: Option<ApplianceState>,
    /// Points balance after the award, if one was applied.
    pub points: Option<u64>,
    pub notifications: Vec<Notification>,
}

/// Backend, notification centre and caches shared by the services.
///
/// Cheap to clone; every clone sees the same state. The control lock makes
/// automation runs and manual toggles mutually exclusive, so neither acts
/// on a state the other is about to change.
pub struct ServiceContext<B, P> {
    backend: Arc<B>,
    notifications: Arc<NotificationService<P>>,
    publisher: P,
    latest_sample: Arc<RwLock<Option<CarbonIntensitySample>>>,
    control_lock: Arc<Mutex<()>>,
    engine: AutomationDecisionEngine,
}

impl<B, P: Clone> Clone for ServiceContext<B, P> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            notifications: Arc::clone(&self.notifications),
            publisher: self.publisher.clone(),
            latest_sample: Arc::clone(&self.latest_sample),
            control_lock: Arc::clone(&self.control_lock),
            engine: self.engine,
        }
    }
}

impl<B, P> ServiceContext<B, P>
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(
        backend: Arc<B>,
        notifications: Arc<NotificationService<P>>,
        publisher: P,
        engine: AutomationDecisionEngine,
    ) -> Self {
        Self {
            backend,
            notifications,
            publisher,
            latest_sample: Arc::new(RwLock::new(None)),
            control_lock: Arc::new(Mutex::new(())),
            engine,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifications(&self) -> &NotificationService<P> {
        &self.notifications
    }

    pub fn engine(&self) -> &AutomationDecisionEngine {
        &self.engine
    }

    /// The most recently fetched intensity sample.
    pub fn latest_sample(&self) -> Option<CarbonIntensitySample> {
        self.latest_sample
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store_sample(&self, sample: CarbonIntensitySample) {
        *self
            .latest_sample
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(sample);
    }

    /// Wait for exclusive control of the appliance.
    pub async fn lock_control(&self) -> MutexGuard<'_, ()> {
        self.control_lock.lock().await
    }

    /// Publish an event, logging instead of failing.
    pub async fn publish(&self, event: Event) {
        let event_type = event.event_type;
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(%event_type, error = %err, "failed to publish event");
        }
    }

    /// Surface a failed operation as an error toast.
    pub async fn report_failure(&self, err: &GreenMachineError) {
        tracing::warn!(error = %err, "operation failed");
        self.notifications
            .raise(err.user_message(), Severity::Error)
            .await;
    }

    /// Apply `effects` in order, stopping at the first failure.
    ///
    /// `before` is the appliance state the effects were planned against.
    /// Must be called with the control lock held.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the backend. Later effects are
    /// skipped. If the appliance was already switched, it is switched back to
    /// `before` so a failed plan never leaves a transition without its award.
    pub async fn apply_effects(
        &self,
        before: &ApplianceState,
        effects: &[Effect],
    ) -> Result<AppliedEffects, GreenMachineError> {
        let mut applied = AppliedEffects::default();
        for effect in effects {
            if let Err(err) = self.apply_effect(effect, &mut applied).await {
                if applied.appliance.is_some() {
                    self.roll_back(before).await;
                }
                return Err(err);
            }
        }
        Ok(applied)
    }

    async fn apply_effect(
        &self,
        effect: &Effect,
        applied: &mut AppliedEffects,
    ) -> Result<(), GreenMachineError> {
        match effect {
            Effect::Transition { is_on, actor } => {
                let state = self.backend.set_state(*is_on, *actor).await?;
                tracing::info!(
                    power = state.power_label(),
                    controlled_by = %state.controlled_by,
                    "appliance switched"
                );
                self.publish(Event::with_payload(EventType::ApplianceChanged, &state))
                    .await;
                applied.appliance = Some(state);
            }
            Effect::AwardPoints { points } => {
                let balance = self.backend.award_points(*points).await?;
                tracing::info!(awarded = points, balance, "green points awarded");
                self.publish(Event::new(
                    EventType::PointsAwarded,
                    serde_json::json!({ "awarded": points, "balance": balance }),
                ))
                .await;
                applied.points = Some(balance);
            }
            Effect::Notify { message, severity } => {
                let notification = self.notifications.raise(message.clone(), *severity).await;
                applied.notifications.push(notification);
            }
        }
        Ok(())
    }

    async fn roll_back(&self, before: &ApplianceState) {
        match self
            .backend
            .set_state(before.is_on, before.controlled_by)
            .await
        {
            Ok(state) => {
                tracing::warn!(
                    power = state.power_label(),
                    controlled_by = %state.controlled_by,
                    "appliance switched back after a failed effect"
                );
                self.publish(Event::with_payload(EventType::ApplianceChanged, &state))
                    .await;
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "failed to switch appliance back after a failed effect"
                );
            }
        }
    }
}

#[cfg(test)]
impl<B> ServiceContext<B, Arc<crate::services::testing::RecordingPublisher>> {
    pub(crate) fn publisher_types(&self) -> Vec<EventType> {
        self.publisher.types()
    }
}
