//! Retry logic for engine calls

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of invocations, including the first
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `(n - 1) * retry_delay`
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Wait before the given 1-based attempt
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt.saturating_sub(1))
    }

    /// Attempt count actually used; zero still means one invocation
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Retry executor with linear backoff
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new retry executor with configuration
    pub fn with_config(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `op` until it succeeds or the attempts are exhausted.
    ///
    /// The error of the last attempt is returned unchanged.
    pub async fn execute<F, Fut, T, E>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.config.effective_attempts();
        let mut attempt = 1;

        loop {
            let delay = self.config.delay_before(attempt);
            if !delay.is_zero() {
                info!(
                    "Retrying {} (attempt {}/{}) in {:.1}s",
                    label,
                    attempt,
                    attempts,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!("{} failed (attempt {}/{}): {}", label, attempt, attempts, error);
                    if attempt >= attempts {
                        return Err(error);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Retry configuration builder
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    /// Create a new retry configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Set backoff unit
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    /// Build the retry configuration
    pub fn build(self) -> RetryConfig {
        self.config
    }
}
