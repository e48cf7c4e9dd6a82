//! # greenmachine-adapter-tips
//!
//! [`TipGenerator`] implementation talking to a `generateContent`-style
//! text-generation API over HTTP.
//!
//! The client is only built when an API key is configured;
//! [`GenerativeTipClient::from_config`] returns `None` otherwise and the tip
//! service falls back to a canned tip.
//!
//! ## Dependency rule
//!
//! Depends on `greenmachine-app` (port traits) and `greenmachine-domain` only.

mod error;
mod response;

use std::time::Duration;

use greenmachine_app::ports::TipGenerator;
use greenmachine_domain::error::GreenMachineError;

pub use error::TipError;
use response::{GenerateRequest, GenerateResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach the text-generation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipClientConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for TipClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the `generateContent` endpoint.
pub struct GenerativeTipClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GenerativeTipClient {
    /// Build a client, or `None` when no (non-blank) API key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`TipError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &TipClientConfig) -> Result<Option<Self>, TipError> {
        let Some(api_key) = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        else {
            return Ok(None);
        };

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Some(Self {
            http,
            endpoint: endpoint(&config.base_url, &config.model),
            api_key: api_key.to_string(),
        }))
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, prompt: &str) -> Result<Option<String>, TipError> {
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TipError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parsed.first_text())
    }
}

impl TipGenerator for GenerativeTipClient {
    async fn generate_tip(&self, prompt: &str) -> Result<Option<String>, GreenMachineError> {
        tracing::debug!(endpoint = %self.endpoint, "requesting energy-saving tip");
        let tip = self.request(prompt).await?;
        if tip.is_none() {
            tracing::debug!("tip response carried no text");
        }
        Ok(tip)
    }
}

fn endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{model}:generateContent",
        base_url.trim_end_matches('/')
    )
}

/// Pull `error.message` out of an API error body, or fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
