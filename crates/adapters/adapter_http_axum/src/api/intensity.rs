//! Carbon intensity handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_domain::intensity::{CarbonIntensitySample, ForecastSlot};

use crate::error::ApiError;
use crate::state::AppState;

pub enum GetResponse {
    Ok(Json<CarbonIntensitySample>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum RecommendedResponse {
    Ok(Json<Vec<ForecastSlot>>),
}

impl IntoResponse for RecommendedResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/intensity`
///
/// Returns the cached sample, fetching one first if nothing was loaded yet.
pub async fn get<B, T>(State(state): State<AppState<B, T>>) -> Result<GetResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let sample = match state.intensity.latest() {
        Some(sample) => sample,
        None => state.intensity.refresh().await?,
    };
    Ok(GetResponse::Ok(Json(sample)))
}

/// `GET /api/intensity/recommended`: low-intensity slots of the cached forecast.
pub async fn recommended<B, T>(State(state): State<AppState<B, T>>) -> RecommendedResponse
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    RecommendedResponse::Ok(Json(state.intensity.recommended_slots()))
}
