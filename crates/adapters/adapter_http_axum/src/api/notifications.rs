//! Notification handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_domain::id::NotificationId;
use greenmachine_domain::notification::Notification;

use crate::error::ApiError;
use crate::state::AppState;

pub enum ListResponse {
    Ok(Json<Vec<Notification>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum DismissResponse {
    NoContent,
}

impl IntoResponse for DismissResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/notifications`: unexpired notifications, oldest first.
pub async fn list<B, T>(State(state): State<AppState<B, T>>) -> ListResponse
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.ctx.notifications().active()))
}

/// `DELETE /api/notifications/{id}`
pub async fn dismiss<B, T>(
    State(state): State<AppState<B, T>>,
    Path(id): Path<String>,
) -> Result<DismissResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let notification_id =
        NotificationId::from_str(&id).map_err(|_| ApiError::unknown("Notification", id))?;
    state.ctx.notifications().dismiss(notification_id)?;
    Ok(DismissResponse::NoContent)
}
