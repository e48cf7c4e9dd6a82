//! Automation service: applies the decision engine to the live backend.

use serde::Serialize;

use greenmachine_domain::appliance::ApplianceState;
use greenmachine_domain::decision::Decision;
use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::event::{Event, EventType};
use greenmachine_domain::intensity::CarbonIntensitySample;

use crate::ports::{Backend, EventPublisher};
use crate::services::context::{AppliedEffects, ServiceContext};

/// Result of one automation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomationOutcome {
    pub decision: Decision,
    /// Appliance state once the run completed.
    pub appliance: ApplianceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

/// Runs the automation rules against the latest intensity sample.
pub struct AutomationService<B, P> {
    ctx: ServiceContext<B, P>,
}

impl<B, P> AutomationService<B, P>
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(ctx: ServiceContext<B, P>) -> Self {
        Self { ctx }
    }

    /// Evaluate and apply the automation rules once.
    ///
    /// State and preferences are re-read after the control lock is taken. If
    /// no intensity sample has been fetched yet, one is fetched first.
    ///
    /// # Errors
    ///
    /// Returns the first backend error. The failure is also raised as an
    /// error notification.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<AutomationOutcome, GreenMachineError> {
        match self.try_run().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.ctx.report_failure(&err).await;
                Err(err)
            }
        }
    }

    async fn try_run(&self) -> Result<AutomationOutcome, GreenMachineError> {
        let _guard = self.ctx.lock_control().await;

        let backend = self.ctx.backend();
        let prefs = backend.get_preferences().await?;
        let state = backend.get_state().await?;
        let sample = match self.ctx.latest_sample() {
            Some(sample) => sample,
            None => self.fetch_sample(&prefs.region).await?,
        };

        let decision = self.ctx.engine().decide(sample.level, &state, &prefs);
        tracing::debug!(level = %sample.level, ?decision, "automation decision");

        if decision.is_no_action() {
            return Ok(AutomationOutcome {
                decision,
                appliance: state,
                points: None,
            });
        }

        let AppliedEffects {
            appliance, points, ..
        } = self.ctx.apply_effects(&state, decision.effects()).await?;
        Ok(AutomationOutcome {
            decision,
            appliance: appliance.unwrap_or(state),
            points,
        })
    }

    async fn fetch_sample(&self, region: &str) -> Result<CarbonIntensitySample, GreenMachineError> {
        let sample = self.ctx.backend().get_intensity(region).await?;
        self.ctx.store_sample(sample.clone());
        self.ctx
            .publish(Event::with_payload(EventType::IntensityRefreshed, &sample))
            .await;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification_service::NotificationService;
    use crate::services::testing::{FakeBackend, RecordingPublisher, sample};
    use greenmachine_domain::appliance::ControlMode;
    use greenmachine_domain::decision::{
        AUTO_OFF_MESSAGE, AUTO_ON_MESSAGE, AutomationDecisionEngine, NoActionReason,
    };
    use greenmachine_domain::intensity::CarbonIntensityLevel;
    use greenmachine_domain::notification::Severity;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    type Ctx = ServiceContext<FakeBackend, Arc<RecordingPublisher>>;

    fn service(
        backend: FakeBackend,
    ) -> (AutomationService<FakeBackend, Arc<RecordingPublisher>>, Ctx) {
        let publisher = Arc::new(RecordingPublisher::default());
        let notifications = Arc::new(NotificationService::new(Arc::clone(&publisher)));
        let ctx = ServiceContext::new(
            Arc::new(backend),
            notifications,
            publisher,
            AutomationDecisionEngine::default(),
        );
        (AutomationService::new(ctx.clone()), ctx)
    }

    #[tokio::test]
    async fn should_do_nothing_when_auto_control_disabled() {
        let (service, ctx) = service(FakeBackend::new());
        ctx.store_sample(sample(CarbonIntensityLevel::Low));

        let outcome = service.run().await.unwrap();

        assert_eq!(
            outcome.decision,
            Decision::NoAction {
                reason: NoActionReason::AutoControlDisabled
            }
        );
        assert!(!ctx.backend().state().is_on);
        assert_eq!(ctx.backend().set_state_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_turn_on_and_award_points_when_low() {
        let (service, ctx) = service(FakeBackend::new().with_auto_control(true));
        ctx.store_sample(sample(CarbonIntensityLevel::Low));

        let outcome = service.run().await.unwrap();

        assert!(outcome.appliance.is_on);
        assert_eq!(outcome.appliance.controlled_by, ControlMode::Auto);
        assert_eq!(outcome.points, Some(10));
        assert_eq!(ctx.backend().points(), 10);

        let active = ctx.notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, AUTO_ON_MESSAGE);
        assert_eq!(active[0].severity, Severity::Success);
    }

    #[tokio::test]
    async fn should_be_idempotent_for_unchanged_inputs() {
        let (service, ctx) = service(FakeBackend::new().with_auto_control(true));
        ctx.store_sample(sample(CarbonIntensityLevel::Low));

        service.run().await.unwrap();
        let second = service.run().await.unwrap();

        assert!(second.decision.is_no_action());
        assert_eq!(ctx.backend().points(), 10);
        assert_eq!(ctx.backend().set_state_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_turn_off_automation_run_when_intensity_rises() {
        let backend = FakeBackend::new()
            .with_auto_control(true)
            .with_state(true, ControlMode::Auto);
        let (service, ctx) = service(backend);
        ctx.store_sample(sample(CarbonIntensityLevel::High));

        let outcome = service.run().await.unwrap();

        assert!(!outcome.appliance.is_on);
        assert_eq!(outcome.points, None);
        assert_eq!(ctx.notifications().active()[0].message, AUTO_OFF_MESSAGE);
    }

    #[tokio::test]
    async fn should_never_turn_off_manual_run() {
        let backend = FakeBackend::new()
            .with_auto_control(true)
            .with_state(true, ControlMode::Manual);
        let (service, ctx) = service(backend);
        ctx.store_sample(sample(CarbonIntensityLevel::High));

        let outcome = service.run().await.unwrap();

        assert!(outcome.appliance.is_on);
        assert!(ctx.backend().state().is_on);
    }

    #[tokio::test]
    async fn should_fetch_sample_when_none_cached() {
        let backend = FakeBackend::new()
            .with_auto_control(true)
            .with_level(CarbonIntensityLevel::Low);
        let (service, ctx) = service(backend);

        service.run().await.unwrap();

        assert_eq!(ctx.backend().intensity_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            ctx.latest_sample().map(|sample| sample.level),
            Some(CarbonIntensityLevel::Low)
        );
        assert!(ctx.backend().state().is_on);
    }

    #[tokio::test]
    async fn should_leave_state_unchanged_and_notify_on_failure() {
        let backend = FakeBackend::new().with_auto_control(true);
        backend.fail_set_state.store(true, Ordering::SeqCst);
        let (service, ctx) = service(backend);
        ctx.store_sample(sample(CarbonIntensityLevel::Low));

        let result = service.run().await;

        assert!(matches!(result, Err(GreenMachineError::StateConflict(_))));
        assert!(!ctx.backend().state().is_on);
        assert_eq!(ctx.backend().points(), 0);
        let active = ctx.notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn should_report_fetch_failure() {
        let backend = FakeBackend::new().with_auto_control(true);
        backend.fail_intensity.store(true, Ordering::SeqCst);
        let (service, ctx) = service(backend);

        let result = service.run().await;

        assert!(matches!(result, Err(GreenMachineError::Fetch(_))));
        assert_eq!(
            ctx.notifications().active()[0].message,
            "Simulated error: failed to fetch carbon intensity."
        );
    }
}
