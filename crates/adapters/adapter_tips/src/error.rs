//! Tip-client error type wrapping HTTP and decoding failures.

use greenmachine_domain::error::{FetchError, GreenMachineError};

/// Errors originating from the text-generation client.
#[derive(Debug, thiserror::Error)]
pub enum TipError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<TipError> for GreenMachineError {
    fn from(err: TipError) -> Self {
        match err {
            TipError::Status { .. } => FetchError::Unavailable {
                resource: "tip",
                reason: err.to_string(),
            }
            .into(),
            other => Self::Upstream(Box::new(other)),
        }
    }
}
