use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

/// Backoff schedule for provider requests.
///
/// One attempt per entry of `base_delays_secs`, followed by `final_retries`
/// attempts spaced `final_delay_secs` apart. At least one attempt is always
/// made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "RetryPolicy::default_base_delays")]
    pub base_delays_secs: Vec<u64>,
    #[serde(default = "RetryPolicy::default_final_retries")]
    pub final_retries: usize,
    #[serde(default = "RetryPolicy::default_final_delay")]
    pub final_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delays_secs: Self::default_base_delays(),
            final_retries: Self::default_final_retries(),
            final_delay_secs: Self::default_final_delay(),
        }
    }
}

impl RetryPolicy {
    fn default_base_delays() -> Vec<u64> {
        vec![1, 2]
    }

    const fn default_final_retries() -> usize {
        1
    }

    const fn default_final_delay() -> u64 {
        2
    }

    /// A single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            base_delays_secs: Vec::new(),
            final_retries: 0,
            final_delay_secs: 0,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        (self.base_delays_secs.len() + self.final_retries).max(1)
    }

    /// Delay after the failed attempt number `attempt` (1-based).
    fn delay_after(&self, attempt: usize) -> u64 {
        self.base_delays_secs
            .get(attempt - 1)
            .copied()
            .unwrap_or(self.final_delay_secs)
    }
}

/// Retry an async operation with backoff.
///
/// # Returns
/// The result of the first successful attempt, or the last error once the
/// policy is exhausted.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < attempts => {
                let delay = policy.delay_after(attempt);
                warn!("Request failed (attempt {attempt}/{attempts}): {e}. Retrying after {delay}s...");
                sleep(Duration::from_secs(delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
