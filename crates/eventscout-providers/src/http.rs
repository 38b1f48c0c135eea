//! HTTP plumbing shared by the provider adapters.
//!
//! Every adapter uses one `reqwest::Client` with a per-call timeout and maps
//! HTTP failures onto [`ProviderError`] the same way.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{ProviderError, ProviderResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent sent to every provider.
const USER_AGENT: &str = concat!("eventscout/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client used by an adapter.
pub fn build_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| {
            ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                .with_source(e)
        })
}

/// Sends a request and decodes a JSON body.
///
/// Non-2xx statuses, transport failures, and undecodable bodies all become
/// a [`ProviderError`].
pub async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> ProviderResult<T> {
    let response = request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            "request timeout".to_string()
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            format!("request failed: {}", e)
        };
        ProviderError::network(message).with_source(e)
    })?;

    let status = response.status();
    trace!(url = %response.url(), status = %status, "provider response");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), &body));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
    })
}
