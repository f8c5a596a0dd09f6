//! Bounded exponential-backoff retry around a [`CompletionProvider`].
//!
//! Attempt `n` (1-indexed) that fails transiently sleeps `2^n` backoff units
//! before attempt `n + 1`: 2, 4, 8, ... with no jitter and no cap. HTTP status
//! errors and configuration errors are returned immediately. Whether a transient
//! 429/503 should be retried is an open question; it is not retried here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::client::{CompletionProvider, CompletionRequest, CompletionResult};

/// Default number of attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff unit.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Waits between attempts. Swapped out in tests to record delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay after the failed attempt `attempt` (1-indexed): `unit * 2^attempt`.
pub fn backoff_delay(unit: Duration, attempt: u32) -> Duration {
    unit.saturating_mul(2u32.saturating_pow(attempt))
}

/// Completion client that retries transient failures.
pub struct RetryingClient {
    inner: Arc<dyn CompletionProvider>,
    backoff_unit: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingClient {
    /// Wrap a provider with the default one-second backoff unit.
    pub fn new(inner: Arc<dyn CompletionProvider>) -> Self {
        Self {
            inner,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Set the duration of one backoff unit.
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Replace the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Get the backoff unit.
    pub fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    /// Run the request, retrying transient failures up to `max_attempts` attempts in total.
    ///
    /// A `max_attempts` of zero is treated as one. After the last attempt fails the
    /// error is returned unchanged.
    pub async fn complete_with_retry(
        &self,
        request: &CompletionRequest,
        max_attempts: u32,
    ) -> CompletionResult {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match self.inner.complete(request).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            if !err.is_transient() {
                tracing::warn!(
                    attempt,
                    kind = %err.kind(),
                    error = %err,
                    "Non-retryable completion failure"
                );
                return Err(err);
            }

            if attempt >= max_attempts {
                tracing::warn!(
                    attempt,
                    kind = %err.kind(),
                    error = %err,
                    "Final attempt failed"
                );
                return Err(err);
            }

            let delay = backoff_delay(self.backoff_unit, attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                kind = %err.kind(),
                error = %err,
                delay_secs = delay.as_secs_f64(),
                "Attempt failed, retrying"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}
