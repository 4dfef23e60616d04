//! Retry Controller: runs {invoke model → parse response} up to N times with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

use super::LlmError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait applied after failed attempt `attempt` (1-indexed): base, 2×base, 3×base, …
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Calls `invoke` and feeds its text to `parse` until one attempt succeeds or
/// `policy.max_attempts` are spent.
///
/// Every per-attempt failure is logged and swallowed. Only two errors escape:
/// `LlmError::Configuration` (returned at once, never retried) and
/// `LlmError::ExhaustedRetries` carrying the last failure's message.
pub async fn with_retries<T, F, Fut, P>(
    policy: &RetryPolicy,
    mut invoke: F,
    parse: P,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
    P: Fn(&str) -> Result<T, LlmError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<LlmError> = None;

    for attempt in 1..=max_attempts {
        let outcome = match invoke().await {
            Ok(text) => parse(&text),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e @ LlmError::Configuration(_)) => return Err(e),
            Err(e) => {
                warn!("Attempt {} of {} failed: {}", attempt, max_attempts, e);
                last_error = Some(e);
            }
        }

        if attempt < max_attempts {
            let delay = policy.delay_after(attempt);
            info!("Retrying in {}ms...", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    error!("All {} retry attempts failed", max_attempts);
    Err(LlmError::ExhaustedRetries {
        attempts: max_attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string()),
    })
}
