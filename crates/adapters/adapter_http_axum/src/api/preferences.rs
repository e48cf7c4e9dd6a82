//! Preference handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_domain::preferences::{PreferencesPatch, UserPreferences};

use crate::error::ApiError;
use crate::state::AppState;

pub enum PreferencesResponse {
    Ok(Json<UserPreferences>),
}

impl IntoResponse for PreferencesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/preferences`
pub async fn get<B, T>(
    State(state): State<AppState<B, T>>,
) -> Result<PreferencesResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let preferences = state.preferences.get().await?;
    Ok(PreferencesResponse::Ok(Json(preferences)))
}

/// `PATCH /api/preferences`: merge the given fields into the stored preferences.
///
/// Unknown fields are rejected by the JSON extractor before reaching the
/// service.
pub async fn update<B, T>(
    State(state): State<AppState<B, T>>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<PreferencesResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let preferences = state.preferences.update(patch).await?;
    Ok(PreferencesResponse::Ok(Json(preferences)))
}
