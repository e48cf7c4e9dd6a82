//! Intensity service: fetches and caches carbon-intensity samples.

use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::event::{Event, EventType};
use greenmachine_domain::intensity::{CarbonIntensitySample, ForecastSlot};
use greenmachine_domain::notification::Severity;
use greenmachine_domain::time::now;

use crate::ports::{Backend, EventPublisher};
use crate::services::context::ServiceContext;

pub const BEST_TIME_MESSAGE: &str = "Optimal time to run appliance now: Low carbon intensity!";

/// Number of low-carbon slots shown as recommended run windows.
pub const RECOMMENDED_SLOT_LIMIT: usize = 3;

pub struct IntensityService<B, P> {
    ctx: ServiceContext<B, P>,
}

impl<B, P> IntensityService<B, P>
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(ctx: ServiceContext<B, P>) -> Self {
        Self { ctx }
    }

    /// Fetch a fresh sample for the configured region and cache it.
    ///
    /// Raises the best-time alert when a low-carbon forecast slot covers the
    /// current instant and the user asked for such alerts.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the cached sample is kept and an error
    /// notification is raised.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CarbonIntensitySample, GreenMachineError> {
        match self.try_refresh().await {
            Ok(sample) => Ok(sample),
            Err(err) => {
                self.ctx.report_failure(&err).await;
                Err(err)
            }
        }
    }

    async fn try_refresh(&self) -> Result<CarbonIntensitySample, GreenMachineError> {
        let backend = self.ctx.backend();
        let prefs = backend.get_preferences().await?;
        let sample = backend.get_intensity(&prefs.region).await?;
        self.accept(&sample, prefs.notifications.best_time_alerts).await;
        Ok(sample)
    }

    /// Cache `sample`, announce it and raise the best-time alert if due.
    pub(crate) async fn accept(&self, sample: &CarbonIntensitySample, best_time_alerts: bool) {
        tracing::debug!(level = %sample.level, value = sample.value, "intensity refreshed");
        self.ctx.store_sample(sample.clone());
        self.ctx
            .publish(Event::with_payload(EventType::IntensityRefreshed, sample))
            .await;

        if best_time_alerts && sample.optimal_slot_at(now()).is_some() {
            self.ctx
                .notifications()
                .raise(BEST_TIME_MESSAGE, Severity::Info)
                .await;
        }
    }

    /// The most recently fetched sample, if any.
    pub fn latest(&self) -> Option<CarbonIntensitySample> {
        self.ctx.latest_sample()
    }

    /// Upcoming low-carbon windows from the latest forecast.
    pub fn recommended_slots(&self) -> Vec<ForecastSlot> {
        self.latest()
            .map(|sample| {
                sample
                    .recommended_slots(RECOMMENDED_SLOT_LIMIT)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
