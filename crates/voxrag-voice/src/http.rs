//! Shared plumbing for the hosted provider clients.

use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use std::time::Duration;

pub(crate) fn build_http_client(config: &OpenAiConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .user_agent(concat!("voxrag/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "http client builder failed, using default client");
            reqwest::Client::new()
        })
}

/// Turns a non-2xx response into [`VoiceError::Provider`], passing
/// successful responses through.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, VoiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(VoiceError::Provider {
        status: status.as_u16(),
        message,
    })
}
