use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::errors::{ClientError, RetryClass};

/// Source of delays between attempts; swapped out in tests
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry around one logical operation (request plus parse step).
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { config, sleeper }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Pause before retry number `retry` (1-based), or `None` when the failure
    /// class must not be retried.
    pub fn delay_before_retry(&self, retry: u32, class: RetryClass) -> Option<Duration> {
        match class {
            RetryClass::Transient => Some(Duration::from_millis(
                self.config.transient_delay_ms.saturating_mul(u64::from(retry)),
            )),
            RetryClass::Unauthorized if retry == 1 => Some(Duration::from_millis(self.config.unauthorized_delay_ms)),
            RetryClass::Unauthorized => Some(Duration::ZERO),
            RetryClass::Fatal => None,
        }
    }

    pub async fn execute<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            let err = match attempt_fn().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", operation, attempt);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let class = err.retry_class();
            if attempt >= max_attempts {
                if class != RetryClass::Fatal {
                    warn!("{} failed after {} attempts: {}", operation, attempt, err);
                }
                return Err(err);
            }

            let Some(delay) = self.delay_before_retry(attempt, class) else {
                return Err(err);
            };

            warn!(
                "{} failed ({:?}): {}, retrying in {}ms (attempt {}/{})",
                operation,
                class,
                err,
                delay.as_millis(),
                attempt + 1,
                max_attempts
            );

            if !delay.is_zero() {
                self.sleeper.sleep(delay).await;
            }
            attempt += 1;
        }
    }
}
