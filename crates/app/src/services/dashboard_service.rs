//! Dashboard service: the aggregate view and the periodic refresh cycle.

use serde::Serialize;

use greenmachine_domain::appliance::ApplianceState;
use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::intensity::{CarbonIntensitySample, ForecastSlot};
use greenmachine_domain::notification::Notification;
use greenmachine_domain::preferences::UserPreferences;

use crate::ports::{Backend, EventPublisher};
use crate::services::automation_service::{AutomationOutcome, AutomationService};
use crate::services::context::ServiceContext;
use crate::services::intensity_service::IntensityService;

/// Everything the dashboard shows at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// `None` until the first successful fetch.
    pub intensity: Option<CarbonIntensitySample>,
    pub recommended_slots: Vec<ForecastSlot>,
    pub appliance: ApplianceState,
    pub preferences: UserPreferences,
    pub points: u64,
    pub notifications: Vec<Notification>,
}

pub struct DashboardService<B, P> {
    ctx: ServiceContext<B, P>,
    intensity: IntensityService<B, P>,
    automation: AutomationService<B, P>,
}

impl<B, P> DashboardService<B, P>
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(ctx: ServiceContext<B, P>) -> Self {
        Self {
            intensity: IntensityService::new(ctx.clone()),
            automation: AutomationService::new(ctx.clone()),
            ctx,
        }
    }

    /// Fetch everything, then let automation react to the new sample.
    ///
    /// Preferences are read first so the intensity fetch targets the stored
    /// region; intensity, appliance state and points are then fetched
    /// concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error, raised as an error notification.
    /// Nothing is cached in that case.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<Dashboard, GreenMachineError> {
        let prefs = match self.fetch_all().await {
            Ok(prefs) => prefs,
            Err(err) => {
                self.ctx.report_failure(&err).await;
                return Err(err);
            }
        };
        tracing::debug!(region = %prefs.region, "dashboard loaded");

        if let Err(err) = self.automation.run().await {
            tracing::warn!(error = %err, "automation after dashboard load failed");
        }
        self.snapshot().await
    }

    async fn fetch_all(&self) -> Result<UserPreferences, GreenMachineError> {
        let backend = self.ctx.backend();
        let prefs = backend.get_preferences().await?;
        let (sample, _state, _points) = tokio::try_join!(
            backend.get_intensity(&prefs.region),
            backend.get_state(),
            backend.get_points(),
        )?;
        self.intensity
            .accept(&sample, prefs.notifications.best_time_alerts)
            .await;
        Ok(prefs)
    }

    /// One timer tick: refresh intensity, then run automation.
    ///
    /// # Errors
    ///
    /// Returns the refresh or automation error. Both are already surfaced as
    /// notifications.
    pub async fn refresh_cycle(&self) -> Result<AutomationOutcome, GreenMachineError> {
        self.intensity.refresh().await?;
        self.automation.run().await
    }

    /// Current view from cached intensity and live backend reads.
    ///
    /// # Errors
    ///
    /// Returns a backend error if state, preferences or points cannot be read.
    pub async fn snapshot(&self) -> Result<Dashboard, GreenMachineError> {
        let backend = self.ctx.backend();
        let (appliance, preferences, points) = tokio::try_join!(
            backend.get_state(),
            backend.get_preferences(),
            backend.get_points(),
        )?;
        Ok(Dashboard {
            intensity: self.intensity.latest(),
            recommended_slots: self.intensity.recommended_slots(),
            appliance,
            preferences,
            points,
            notifications: self.ctx.notifications().active(),
        })
    }
}
