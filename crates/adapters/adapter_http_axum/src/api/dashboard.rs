//! Dashboard handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_app::services::dashboard_service::Dashboard;

use crate::error::ApiError;
use crate::state::AppState;

pub enum DashboardResponse {
    Ok(Json<Dashboard>),
}

impl IntoResponse for DashboardResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/dashboard`: current view, without touching the provider's
/// intensity feed.
pub async fn get<B, T>(State(state): State<AppState<B, T>>) -> Result<DashboardResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let dashboard = state.dashboard.snapshot().await?;
    Ok(DashboardResponse::Ok(Json(dashboard)))
}

/// `POST /api/dashboard/refresh`: fetch everything and let automation react.
pub async fn refresh<B, T>(
    State(state): State<AppState<B, T>>,
) -> Result<DashboardResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let dashboard = state.dashboard.load().await?;
    Ok(DashboardResponse::Ok(Json(dashboard)))
}
