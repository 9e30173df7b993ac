use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use trendsift_core::{CoreError, ErrorExt, SourceError, SourceSettings};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&SourceSettings::default())
    }
}

impl From<&SourceSettings> for RetryConfig {
    fn from(settings: &SourceSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay_ms: settings.base_delay_ms,
            max_delay_ms: settings.max_delay_ms,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2, // spread simultaneous source retries apart
        }
    }
}

impl RetryConfig {
    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }
}

/// Retry strategy based on error type
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff
    Retry,
    /// Retry after the delay the source asked for
    RetryWithDelay(Duration),
    /// Don't retry (for permanent failures)
    NoRetry,
}

pub fn get_retry_strategy(error: &CoreError) -> RetryStrategy {
    match error {
        CoreError::Source(SourceError::RateLimitExceeded { retry_after, .. }) => {
            RetryStrategy::RetryWithDelay(Duration::from_secs(*retry_after))
        }
        e if e.is_retryable() => RetryStrategy::Retry,
        _ => RetryStrategy::NoRetry,
    }
}

/// Calculate delay with exponential backoff and jitter
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let max_delay = Duration::from_millis(config.max_delay_ms);

    let multiplier = config.backoff_multiplier.powi(attempt as i32);
    let delay_ms = (config.base_delay_ms as f64 * multiplier) as u64;
    let exponential_delay = Duration::from_millis(delay_ms.min(config.max_delay_ms));

    // Add jitter to prevent thundering herd
    let jitter_range = (exponential_delay.as_millis() as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);
    let final_delay = exponential_delay + Duration::from_millis(jitter);

    final_delay.min(max_delay)
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// The last error is returned unchanged.
pub async fn execute_with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(error) => {
                let has_attempts_left = attempt + 1 < max_attempts;
                let delay = match get_retry_strategy(&error) {
                    RetryStrategy::NoRetry => {
                        debug!("Not retrying {}: {}", operation_name, error);
                        return Err(error);
                    }
                    _ if !has_attempts_left => {
                        warn!(
                            "{} failed after {} attempts: {}",
                            operation_name, max_attempts, error
                        );
                        return Err(error);
                    }
                    RetryStrategy::Retry => calculate_delay(attempt, config),
                    RetryStrategy::RetryWithDelay(delay) => delay,
                };

                info!("Retrying {} in {:?} due to: {}", operation_name, delay, error);
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
