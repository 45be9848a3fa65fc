//! HTTP retry helpers for transient errors.
//!
//! Requests go through [`send_text`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so connection failures,
//! timeouts, HTTP 429 and 5xx are retried with exponential backoff. Other
//! 4xx are returned immediately. A cancelled token cuts the backoff short.
//!
//! The `build_request` closure is called on every attempt because a
//! `RequestBuilder` is consumed by `send()`.

use kickscout_core::{KicksError, Result};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::RetryPolicy;

pub async fn send_text<F>(build_request: F, policy: &RetryPolicy, cancel: &CancellationToken) -> Result<String>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, policy, cancel).await?;
    response.text().await.map_err(KicksError::from_send_error)
}

async fn send_inner<F>(
    build_request: &F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<reqwest::Response>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    with_retry(policy, cancel, || {
        let request = build_request();
        async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => Ok(response),
                Ok(response) => Err(KicksError::HttpStatus(response.status().as_u16())),
                Err(e) => Err(KicksError::from_send_error(e)),
            }
        }
    })
    .await
}

/// Retry an arbitrary fallible async operation under the same policy.
/// Returns [`KicksError::Cancelled`] if `cancel` fires while waiting.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, cancel: &CancellationToken, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                warn!(
                    "Operation failed ({}), retry {}/{} in {:?}",
                    err, attempt, policy.max_retries, delay
                );
                tokio::select! {
                    _ = cancel.cancelled() => {
                        warn!("Retry abandoned after cancellation: {}", err);
                        return Err(KicksError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(err) => return Err(err),
        }
    }
}
