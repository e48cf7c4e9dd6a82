//! Background refresh loop.
//!
//! On every refresh tick the loop fetches a new intensity sample and lets
//! automation react to it. A faster sweep tick drops expired notifications.
//! The loop lives as long as its [`RefreshLoopHandle`].

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::ports::{Backend, EventPublisher};
use crate::services::ServiceContext;
use crate::services::dashboard_service::DashboardService;

/// Default period between two intensity refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default period between two notification sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshLoopConfig {
    pub refresh_interval: Duration,
    pub sweep_interval: Duration,
}

impl Default for RefreshLoopConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Owns the spawned loop. Dropping it stops the loop.
pub struct RefreshLoopHandle {
    handle: Option<JoinHandle<()>>,
}

impl RefreshLoopHandle {
    /// Stop the loop and wait for the task to wind down.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
        tracing::debug!("refresh loop stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshLoopHandle {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Spawn the refresh loop on the current tokio runtime.
///
/// The first refresh happens one full interval after spawning; callers load
/// the dashboard themselves at startup.
pub fn spawn<B, P>(ctx: ServiceContext<B, P>, config: RefreshLoopConfig) -> RefreshLoopHandle
where
    B: Backend,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    let dashboard = DashboardService::new(ctx.clone());
    let handle = tokio::spawn(async move {
        let mut refresh = tokio::time::interval_at(
            Instant::now() + config.refresh_interval,
            config.refresh_interval,
        );
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sweep = tokio::time::interval(config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            refresh_secs = config.refresh_interval.as_secs(),
            "refresh loop started"
        );
        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    match dashboard.refresh_cycle().await {
                        Ok(outcome) => tracing::debug!(
                            is_on = outcome.appliance.is_on,
                            "refresh cycle completed"
                        ),
                        Err(err) => tracing::warn!(error = %err, "refresh cycle failed"),
                    }
                }
                _ = sweep.tick() => {
                    let removed = ctx.notifications().prune_expired().await;
                    if removed > 0 {
                        tracing::trace!(removed, "expired notifications swept");
                    }
                }
            }
        }
    });
    RefreshLoopHandle {
        handle: Some(handle),
    }
}
