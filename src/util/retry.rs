//! Bounded exponential-backoff retry for provider calls

use backoff::{future::retry, ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::Result;

/// Retry bounds for one provider call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_elapsed: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            max_elapsed: Duration::from_millis(config.max_elapsed_ms),
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.initial_interval * 4,
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        }
    }
}

/// Run `operation`, retrying with exponential backoff while it fails with a
/// retryable error. Permanent errors and exhausted backoff windows surface
/// as-is.
pub async fn with_retry<T, F, Fut>(provider: &'static str, policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry(policy.backoff(), || async {
        match operation().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_retryable() => {
                warn!(provider, error = %e, "retryable provider error");
                Err(backoff::Error::transient(e))
            }
            Err(e) => Err(backoff::Error::permanent(e)),
        }
    })
    .await
}
