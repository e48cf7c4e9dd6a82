//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod appliance;
#[allow(clippy::missing_errors_doc)]
pub mod automation;
#[allow(clippy::missing_errors_doc)]
pub mod dashboard;
#[allow(clippy::missing_errors_doc)]
pub mod intensity;
#[allow(clippy::missing_errors_doc)]
pub mod notifications;
#[allow(clippy::missing_errors_doc)]
pub mod points;
#[allow(clippy::missing_errors_doc)]
pub mod preferences;
pub mod sse;
pub mod tips;

use axum::Router;
use axum::routing::{delete, get, post};

use greenmachine_app::ports::{Backend, TipGenerator};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<B, T>() -> Router<AppState<B, T>>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    Router::new()
        // Dashboard
        .route("/dashboard", get(dashboard::get::<B, T>))
        .route("/dashboard/refresh", post(dashboard::refresh::<B, T>))
        // Intensity
        .route("/intensity", get(intensity::get::<B, T>))
        .route(
            "/intensity/recommended",
            get(intensity::recommended::<B, T>),
        )
        // Appliance
        .route("/appliance", get(appliance::get::<B, T>))
        .route("/appliance/toggle", post(appliance::toggle::<B, T>))
        .route("/automation/run", post(automation::run::<B, T>))
        // Preferences
        .route(
            "/preferences",
            get(preferences::get::<B, T>).patch(preferences::update::<B, T>),
        )
        .route("/points", get(points::get::<B, T>))
        // Notifications
        .route("/notifications", get(notifications::list::<B, T>))
        .route(
            "/notifications/{id}",
            delete(notifications::dismiss::<B, T>),
        )
        .route("/tip", get(tips::get::<B, T>))
        .route("/events/stream", get(sse::stream::<B, T>))
}
