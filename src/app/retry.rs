//! Bounded retry policy for per-item pipeline steps
//!
//! Both catalog lookups and downloads get at most `1 + max_retries` attempts
//! per run. The default of zero retries means a failed item is skipped after a
//! single attempt and never revisited.

use std::future::Future;
use std::time::Duration;

use crate::constants::limits;

/// Retry settings for one pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: limits::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(limits::RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy making exactly one attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(limits::MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(2_u32.pow(exponent))
    }

    /// Runs `operation` until it succeeds or the retry budget is spent
    ///
    /// `label` only feeds log messages. The last error is returned on failure.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    let delay = self.delay_for(retries);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                        label,
                        retries,
                        self.max_retries + 1,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
