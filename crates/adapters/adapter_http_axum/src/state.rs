//! Shared application state for axum handlers.

use std::sync::Arc;

use greenmachine_app::event_bus::InProcessEventBus;
use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_app::services::ServiceContext;
use greenmachine_app::services::appliance_service::ApplianceService;
use greenmachine_app::services::automation_service::AutomationService;
use greenmachine_app::services::dashboard_service::DashboardService;
use greenmachine_app::services::intensity_service::IntensityService;
use greenmachine_app::services::preference_service::PreferenceService;
use greenmachine_app::services::tip_service::TipService;

/// Publisher used by every service behind the HTTP adapter.
///
/// Fixed to the in-process bus so the SSE endpoint can subscribe to it.
pub type Publisher = Arc<InProcessEventBus>;

/// Application state shared across all axum handlers.
///
/// Generic over the backend and the tip generator to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<B, T> {
    /// Shared context; gives access to the backend and notification centre.
    pub ctx: ServiceContext<B, Publisher>,
    pub dashboard: Arc<DashboardService<B, Publisher>>,
    pub intensity: Arc<IntensityService<B, Publisher>>,
    pub appliance: Arc<ApplianceService<B, Publisher>>,
    pub automation: Arc<AutomationService<B, Publisher>>,
    pub preferences: Arc<PreferenceService<B, Publisher>>,
    pub tips: Arc<TipService<T>>,
    /// Event bus for SSE subscriptions.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<B, T> Clone for AppState<B, T> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            dashboard: Arc::clone(&self.dashboard),
            intensity: Arc::clone(&self.intensity),
            appliance: Arc::clone(&self.appliance),
            automation: Arc::clone(&self.automation),
            preferences: Arc::clone(&self.preferences),
            tips: Arc::clone(&self.tips),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<B, T> AppState<B, T>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    /// Build every service on top of one shared context.
    pub fn new(
        ctx: ServiceContext<B, Publisher>,
        event_bus: Arc<InProcessEventBus>,
        tips: TipService<T>,
    ) -> Self {
        Self {
            dashboard: Arc::new(DashboardService::new(ctx.clone())),
            intensity: Arc::new(IntensityService::new(ctx.clone())),
            appliance: Arc::new(ApplianceService::new(ctx.clone())),
            automation: Arc::new(AutomationService::new(ctx.clone())),
            preferences: Arc::new(PreferenceService::new(ctx.clone())),
            tips: Arc::new(tips),
            event_bus,
            ctx,
        }
    }
}
