//! Appliance service: reads state and applies manual toggles.

use greenmachine_domain::appliance::ApplianceState;
use greenmachine_domain::error::GreenMachineError;

use crate::ports::{Backend, EventPublisher};
use crate::services::context::{AppliedEffects, ServiceContext};

pub struct ApplianceService<B, P> {
    ctx: ServiceContext<B, P>,
}

impl<B, P> ApplianceService<B, P>
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(ctx: ServiceContext<B, P>) -> Self {
        Self { ctx }
    }

    /// Current appliance state.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the state cannot be read.
    pub async fn state(&self) -> Result<ApplianceState, GreenMachineError> {
        self.ctx.backend().get_state().await
    }

    /// Flip the appliance on behalf of the user.
    ///
    /// Switching on while the latest sample is low-carbon earns the green-run
    /// bonus.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::StateConflict`] when automation currently
    /// holds the appliance, or the backend error if the switch fails. Either
    /// way an error notification is raised and the state is left unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self) -> Result<AppliedEffects, GreenMachineError> {
        match self.try_toggle().await {
            Ok(applied) => Ok(applied),
            Err(err) => {
                self.ctx.report_failure(&err).await;
                Err(err)
            }
        }
    }

    async fn try_toggle(&self) -> Result<AppliedEffects, GreenMachineError> {
        let _guard = self.ctx.lock_control().await;

        let backend = self.ctx.backend();
        let state = backend.get_state().await?;
        let prefs = backend.get_preferences().await?;
        let latest_level = self.ctx.latest_sample().map(|sample| sample.level);

        let effects = self
            .ctx
            .engine()
            .plan_manual_toggle(&state, &prefs, latest_level)?;
        self.ctx.apply_effects(&state, &effects).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification_service::NotificationService;
    use crate::services::testing::{FakeBackend, RecordingPublisher, sample};
    use greenmachine_domain::appliance::ControlMode;
    use greenmachine_domain::decision::{AutomationDecisionEngine, MANUAL_BONUS_MESSAGE};
    use greenmachine_domain::error::StateConflictError;
    use greenmachine_domain::intensity::CarbonIntensityLevel;
    use greenmachine_domain::notification::Severity;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    type Ctx = ServiceContext<FakeBackend, Arc<RecordingPublisher>>;

    fn service(
        backend: FakeBackend,
    ) -> (ApplianceService<FakeBackend, Arc<RecordingPublisher>>, Ctx) {
        let publisher = Arc::new(RecordingPublisher::default());
        let notifications = Arc::new(NotificationService::new(Arc::clone(&publisher)));
        let ctx = ServiceContext::new(
            Arc::new(backend),
            notifications,
            publisher,
            AutomationDecisionEngine::default(),
        );
        (ApplianceService::new(ctx.clone()), ctx)
    }

    fn messages(ctx: &Ctx) -> Vec<String> {
        ctx.notifications()
            .active()
            .into_iter()
            .map(|notification| notification.message)
            .collect()
    }

    #[tokio::test]
    async fn should_toggle_on_then_off() {
        let (service, ctx) = service(FakeBackend::new());

        let first = service.toggle().await.unwrap();
        assert!(first.appliance.unwrap().is_on);
        assert_eq!(ctx.backend().state().controlled_by, ControlMode::Manual);

        let second = service.toggle().await.unwrap();
        assert!(!second.appliance.unwrap().is_on);
        assert_eq!(
            messages(&ctx),
            vec![
                "Appliance manually turned ON.".to_string(),
                "Appliance manually turned OFF.".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn should_award_bonus_when_switched_on_during_low_carbon() {
        let (service, ctx) = service(FakeBackend::new());
        ctx.store_sample(sample(CarbonIntensityLevel::Low));

        let applied = service.toggle().await.unwrap();

        assert_eq!(applied.points, Some(10));
        assert_eq!(ctx.backend().points(), 10);
        assert_eq!(
            messages(&ctx),
            vec![
                "Appliance manually turned ON.".to_string(),
                MANUAL_BONUS_MESSAGE.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn should_not_award_bonus_without_low_sample() {
        let (service, ctx) = service(FakeBackend::new());
        ctx.store_sample(sample(CarbonIntensityLevel::High));

        let applied = service.toggle().await.unwrap();

        assert_eq!(applied.points, None);
        assert_eq!(ctx.backend().points(), 0);
    }

    #[tokio::test]
    async fn should_refuse_toggle_while_automation_holds_appliance() {
        let backend = FakeBackend::new()
            .with_auto_control(true)
            .with_state(true, ControlMode::Auto);
        let (service, ctx) = service(backend);

        let result = service.toggle().await;

        assert!(matches!(
            result,
            Err(GreenMachineError::StateConflict(
                StateConflictError::AutoControlActive
            ))
        ));
        assert!(ctx.backend().state().is_on);
        assert_eq!(ctx.backend().set_state_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.notifications().active()[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn should_allow_toggle_of_manual_run_with_auto_control_enabled() {
        let backend = FakeBackend::new()
            .with_auto_control(true)
            .with_state(true, ControlMode::Manual);
        let (service, ctx) = service(backend);

        service.toggle().await.unwrap();

        assert!(!ctx.backend().state().is_on);
    }

    #[tokio::test]
    async fn should_leave_state_unchanged_when_switch_fails() {
        let backend = FakeBackend::new();
        backend.fail_set_state.store(true, Ordering::SeqCst);
        let (service, ctx) = service(backend);
        ctx.store_sample(sample(CarbonIntensityLevel::Low));

        let result = service.toggle().await;

        assert!(result.is_err());
        assert!(!ctx.backend().state().is_on);
        assert_eq!(ctx.backend().points(), 0);
        assert_eq!(
            messages(&ctx),
            vec!["Simulated error: Appliance state conflict.".to_string()]
        );
    }
}
