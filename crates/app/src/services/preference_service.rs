//! Preference service: validated partial updates of user settings.

use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::event::{Event, EventType};
use greenmachine_domain::notification::Severity;
use greenmachine_domain::preferences::{PreferencesPatch, UserPreferences};

use crate::ports::{Backend, EventPublisher};
use crate::services::automation_service::AutomationService;
use crate::services::context::ServiceContext;

pub const PREFERENCES_UPDATED_MESSAGE: &str = "Preferences updated successfully!";

pub struct PreferenceService<B, P> {
    ctx: ServiceContext<B, P>,
    automation: AutomationService<B, P>,
}

impl<B, P> PreferenceService<B, P>
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(ctx: ServiceContext<B, P>) -> Self {
        let automation = AutomationService::new(ctx.clone());
        Self { ctx, automation }
    }

    /// # Errors
    ///
    /// Returns a backend error if the preferences cannot be read.
    pub async fn get(&self) -> Result<UserPreferences, GreenMachineError> {
        self.ctx.backend().get_preferences().await
    }

    /// Merge `patch` into the stored preferences.
    ///
    /// When the patch touches `auto_control_enabled`, automation is
    /// re-evaluated once the new preferences are saved. A failing automation
    /// run is reported but does not fail the update.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::Validation`] if the merged preferences
    /// are invalid (nothing is saved), or a backend error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        patch: PreferencesPatch,
    ) -> Result<UserPreferences, GreenMachineError> {
        let saved = match self.save(&patch).await {
            Ok(saved) => saved,
            Err(err) => {
                self.ctx.report_failure(&err).await;
                return Err(err);
            }
        };

        tracing::info!(
            auto_control_enabled = saved.auto_control_enabled,
            region = %saved.region,
            "preferences updated"
        );
        self.ctx
            .publish(Event::with_payload(EventType::PreferencesUpdated, &saved))
            .await;
        self.ctx
            .notifications()
            .raise(PREFERENCES_UPDATED_MESSAGE, Severity::Success)
            .await;

        if patch.touches_auto_control()
            && let Err(err) = self.automation.run().await
        {
            tracing::warn!(error = %err, "automation re-run after preference update failed");
        }
        Ok(saved)
    }

    /// Read, merge and save under the control lock so concurrent patches
    /// each start from the last saved value. The guard is released before
    /// any automation re-run, which takes the lock itself.
    async fn save(&self, patch: &PreferencesPatch) -> Result<UserPreferences, GreenMachineError> {
        let _guard = self.ctx.lock_control().await;
        let backend = self.ctx.backend();
        let current = backend.get_preferences().await?;
        let merged = current.merge(patch)?;
        backend.save_preferences(merged).await
    }
}
