use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for rate-limited calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

/// Rate-limit signal: an HTTP 429 code or any mention of a quota
pub fn is_rate_limited(message: &str) -> bool {
    message.contains("429") || message.to_lowercase().contains("quota")
}

/// Run `operation`, retrying only rate-limited failures with exponential
/// backoff. Any other error, or the last rate-limited one, is returned as is.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_when(policy, |e: &E| is_rate_limited(&e.to_string()), operation).await
}

/// Like [`with_retry`], with the caller deciding which errors are retryable
pub async fn with_retry_when<T, E, P, F, Fut>(
    policy: &RetryPolicy,
    retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    P: Fn(&E) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !retryable(&e) || attempt + 1 >= attempts {
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Rate limited (attempt {}/{}), retrying in {:?}: {}",
                    attempt + 1,
                    attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
