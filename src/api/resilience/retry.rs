//! Bounded retry with exponential backoff
//!
//! Timeouts and connection failures back off exponentially. Body read
//! failures wait a fixed delay. Either way the number of attempts is capped
//! and the last error is surfaced once it is reached.

use crate::api::transport::TransportError;
use anyhow::anyhow;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(with = "millis")]
    pub base_delay: Duration,
    #[serde(with = "millis")]
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
    /// Fixed wait before retrying after a body read failure
    #[serde(with = "millis")]
    pub body_error_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
            body_error_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// A single attempt, no waiting
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
            body_error_delay: Duration::ZERO,
        }
    }
}

/// Retry policy that implements exponential backoff with jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error or
    /// runs out of attempts. `label` names the request in log lines and in
    /// the terminal error.
    pub async fn execute<F, Fut, T>(&self, label: &str, operation: F) -> anyhow::Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("{} succeeded after {} attempts", label, attempt);
                    }
                    return Ok(result);
                }
                Err(error) if !error.is_retryable() => {
                    warn!("{} failed permanently: {}", label, error);
                    return Err(anyhow!(error).context(format!("request to {} failed", label)));
                }
                Err(error) if attempt >= max_attempts => {
                    warn!("{} failed after {} attempts: {}", label, attempt, error);
                    return Err(anyhow!(error).context(format!(
                        "request to {} failed after {} attempts",
                        label, attempt
                    )));
                }
                Err(error) => {
                    let delay = self.delay_for(&error, attempt);
                    warn!(
                        "{} failed on attempt {}/{} (retrying in {:?}): {}",
                        label, attempt, max_attempts, delay, error
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    fn delay_for(&self, error: &TransportError, attempt: u32) -> Duration {
        match error {
            TransportError::Body(_) => self.config.body_error_delay,
            _ => self.calculate_delay(attempt),
        }
    }

    /// Calculate exponential backoff delay with optional jitter
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = (self.config.base_delay.as_millis() as f64)
            * self.config.backoff_multiplier.powi(attempt as i32 - 1);

        let mut delay = Duration::from_millis(delay_ms as u64).min(self.config.max_delay);

        if self.config.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.5..=1.5);
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        debug!("Backoff for attempt {} is {:?}", attempt, delay);
        delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            backoff_multiplier: 2.0,
            jitter: false,
            body_error_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_default_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::new(RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        });

        let delays: Vec<u128> = (1..=8).map(|n| policy.calculate_delay(n).as_millis()).collect();
        assert_eq!(delays, vec![500, 1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
    }

    #[test]
    fn test_connect_errors_use_backoff() {
        let policy = RetryPolicy::new(RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        });
        let error = TransportError::Connect("refused".into());
        assert_eq!(policy.delay_for(&error, 2), Duration::from_secs(1));
    }

    #[test]
    fn test_body_errors_use_fixed_delay() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(&TransportError::Body("eof".into()), 3);
        assert_eq!(delay, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_retry_success_on_third_attempt() {
        let policy = RetryPolicy::new(fast_config(5));
        let attempts = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute("deals", || {
                let count = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    match count {
                        0 => Err(TransportError::Timeout("slow".into())),
                        1 => Err(TransportError::Body("truncated".into())),
                        _ => Ok("done"),
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let policy = RetryPolicy::new(fast_config(3));
        let attempts = Arc::new(AtomicU32::new(0));

        let err = policy
            .execute("deals", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(TransportError::Timeout("slow".into())) }
            })
            .await
            .unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("failed after 3 attempts"));
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let policy = RetryPolicy::new(fast_config(5));
        let attempts = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute("deals", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(TransportError::Other("bad url".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_config_deserializes_millis() {
        let config: RetryConfig = toml::from_str("max_attempts = 2\nbase_delay = 250").unwrap();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.base_delay, Duration::from_millis(250));
        assert_eq!(config.max_delay, Duration::from_secs(30));
    }
}
