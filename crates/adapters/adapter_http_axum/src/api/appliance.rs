//! Appliance handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_app::services::context::AppliedEffects;
use greenmachine_domain::appliance::ApplianceState;

use crate::error::ApiError;
use crate::state::AppState;

pub enum GetResponse {
    Ok(Json<ApplianceState>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum ToggleResponse {
    Ok(Json<AppliedEffects>),
}

impl IntoResponse for ToggleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/appliance`
pub async fn get<B, T>(State(state): State<AppState<B, T>>) -> Result<GetResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let appliance = state.appliance.state().await?;
    Ok(GetResponse::Ok(Json(appliance)))
}

/// `POST /api/appliance/toggle`: flip the appliance by hand.
///
/// Answers `409 Conflict` while automation holds the appliance or when the
/// switch fails.
pub async fn toggle<B, T>(State(state): State<AppState<B, T>>) -> Result<ToggleResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let applied = state.appliance.toggle().await?;
    Ok(ToggleResponse::Ok(Json(applied)))
}
