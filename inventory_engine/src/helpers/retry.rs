use std::{future::Future, time::Duration};

use log::{debug, warn};
use rand::Rng;

use crate::traits::InventoryError;

/// How often, and how patiently, a unit of work is re-run when it loses a write race in the storage layer.
///
/// Only [`InventoryError::StorageBusy`] is retried. Business rule violations are returned straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The total number of attempts, including the first one.
    pub max_attempts: u32,
    /// The back-off before the second attempt. It grows linearly with each attempt, plus some random jitter.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, base_delay: Duration::from_millis(10) }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1), ..Default::default() }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay * attempt;
        let jitter_ms = self.base_delay.as_millis() as u64;
        let jitter = if jitter_ms > 0 { rand::thread_rng().gen_range(0..=jitter_ms) } else { 0 };
        base + Duration::from_millis(jitter)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the attempts run out. In the last case the
    /// result is [`InventoryError::ContentionExhausted`].
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, InventoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, InventoryError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(e) if e.is_retryable() => {
                    if attempt >= self.max_attempts {
                        warn!("🗃️ {label} gave up after {attempt} attempts. Last error: {e}");
                        return Err(InventoryError::ContentionExhausted(attempt));
                    }
                    let delay = self.delay_for(attempt);
                    debug!("🗃️ {label} hit a write conflict on attempt {attempt}. Retrying in {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                result => return result,
            }
        }
    }
}
