//! Shared HTTP plumbing for the external clients
//!
//! Both the Gemini client and the Sheets store are plain request/response
//! REST consumers. They share one pooled client configuration, a bounded
//! per-request timeout, and a single retry on transient failures.

use reqwest::Client;
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Build a connection-pooled client with a bounded request timeout.
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8)
        .build()
}

/// Send a request, retrying once on connect/timeout failures.
///
/// Requests with streaming bodies cannot be cloned; those fail through
/// without a retry.
pub async fn send_with_retry(
    request: reqwest::RequestBuilder,
) -> reqwest::Result<reqwest::Response> {
    let retry = request.try_clone();

    match request.send().await {
        Err(e) if e.is_timeout() || e.is_connect() => match retry {
            Some(second) => {
                warn!("Transient HTTP failure, retrying once: {}", e);
                second.send().await
            }
            None => Err(e),
        },
        other => other,
    }
}
