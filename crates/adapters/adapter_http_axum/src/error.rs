//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use greenmachine_domain::error::{GreenMachineError, NotFoundError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GreenMachineError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(GreenMachineError);

impl ApiError {
    /// 404 for an id that could not even be parsed.
    pub(crate) fn unknown(entity: &'static str, id: impl Into<String>) -> Self {
        Self(GreenMachineError::NotFound(NotFoundError {
            entity,
            id: id.into(),
        }))
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            GreenMachineError::Validation(_) => StatusCode::BAD_REQUEST,
            GreenMachineError::StateConflict(_) => StatusCode::CONFLICT,
            GreenMachineError::Fetch(_) => StatusCode::BAD_GATEWAY,
            GreenMachineError::NotFound(_) => StatusCode::NOT_FOUND,
            GreenMachineError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GreenMachineError> for ApiError {
    fn from(err: GreenMachineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            GreenMachineError::Upstream(err) => {
                tracing::error!(error = %err, "upstream error");
                "internal server error".to_string()
            }
            other => other.user_message(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
