//! Automation handler.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use greenmachine_app::ports::{Backend, TipGenerator};
use greenmachine_app::services::automation_service::AutomationOutcome;

use crate::error::ApiError;
use crate::state::AppState;

pub enum RunResponse {
    Ok(Json<AutomationOutcome>),
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/automation/run`: evaluate the rule once against the latest sample.
pub async fn run<B, T>(State(state): State<AppState<B, T>>) -> Result<RunResponse, ApiError>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let outcome = state.automation.run().await?;
    Ok(RunResponse::Ok(Json(outcome)))
}
