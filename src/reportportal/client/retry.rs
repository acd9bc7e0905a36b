use std::future::Future;
use std::time::Duration;

use log::warn;
use tokio::time::sleep;

/// Retry with exponential backoff: 500ms → 1s → 2s, capped at `max_backoff`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }

    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails with an error
    /// `should_retry` rejects, or the retry budget is spent.
    pub async fn execute<F, Fut, T, E, P>(&self, mut operation: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries && should_retry(&e) => {
                    let backoff = self.backoff_for(retry);
                    warn!(
                        "Transient failure (retry {}/{}), retrying in {backoff:?}: {e}",
                        retry + 1,
                        self.max_retries
                    );
                    sleep(backoff).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
