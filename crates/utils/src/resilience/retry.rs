//! Retry configuration and backoff calculation.

use std::time::Duration;
use surfside_core::Error;

/// Default maximum number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (200ms)
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Default maximum delay for exponential backoff (5s)
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Default jitter factor (0.1 = 10% randomization)
const DEFAULT_JITTER_FACTOR: f64 = 0.1;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first failure
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Jitter factor for randomization (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryConfig {
    /// Retry policy with no waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_factor: 0.0,
        }
    }

    /// Network failures, timeouts and 5xx/408/429 responses are retried
    pub fn should_retry(&self, error: &Error) -> bool {
        error.is_retryable()
    }

    /// Calculate delay for a given attempt with exponential backoff and jitter
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        let exponential_delay = self.base_delay.saturating_mul(factor);
        let capped_delay = exponential_delay.min(self.max_delay);

        if self.jitter_factor > 0.0 && !capped_delay.is_zero() {
            let jitter_range = capped_delay.as_millis() as f64 * self.jitter_factor;
            let normalized = fastrand::f64() * 2.0 - 1.0;
            let jitter = normalized * jitter_range;
            let final_millis = (capped_delay.as_millis() as f64 + jitter).max(0.0) as u64;
            Duration::from_millis(final_millis)
        } else {
            capped_delay
        }
    }

    /// Start counting attempts for one unit of work
    pub fn backoff(&self) -> Backoff<'_> {
        Backoff {
            config: self,
            failures: 0,
        }
    }
}

/// Attempt counter for one unit of work under a [`RetryConfig`]
#[derive(Debug)]
pub struct Backoff<'a> {
    config: &'a RetryConfig,
    failures: u32,
}

impl Backoff<'_> {
    /// Record a failure. Returns the delay before the next attempt, or `None`
    /// when the error is permanent or the retry budget is spent.
    pub fn next_delay(&mut self, error: &Error) -> Option<Duration> {
        let attempt = self.failures;
        self.failures += 1;
        if attempt < self.config.max_retries && self.config.should_retry(error) {
            let delay = self.config.calculate_delay(attempt);
            log::warn!(
                "Attempt {}/{} failed, retrying in {:?}: {}",
                attempt + 1,
                self.config.max_retries + 1,
                delay,
                error
            );
            Some(delay)
        } else {
            None
        }
    }

    /// Number of failed attempts recorded so far
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_calculate_delay_with_jitter() {
        let config = RetryConfig {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter_factor: 0.5,
            ..Default::default()
        };

        let delays: Vec<_> = (0..20).map(|_| config.calculate_delay(2)).collect();

        let unique_delays: HashSet<_> = delays.iter().collect();
        assert!(unique_delays.len() > 1);

        // 400ms +/- 50%
        for delay in delays {
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(600));
        }
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            jitter_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(5), Duration::from_millis(250));
        assert_eq!(config.calculate_delay(40), Duration::from_millis(250));
    }

    #[test]
    fn test_transient_classification() {
        let config = RetryConfig::default();
        assert!(config.should_retry(&Error::network("c", "connection refused")));
        assert!(config.should_retry(&Error::delivery("c", 503, "")));
        assert!(config.should_retry(&Error::delivery("c", 429, "")));
        assert!(!config.should_retry(&Error::delivery("c", 400, "")));
        assert!(!config.should_retry(&Error::validation("schema", "empty")));
        assert!(config.should_retry(&Error::timeout("POST c", Duration::from_secs(1))));
    }

    #[test]
    fn test_backoff_budget() {
        let config = RetryConfig::immediate(2);
        let mut backoff = config.backoff();
        let err = Error::network("c", "down");
        assert!(backoff.next_delay(&err).is_some());
        assert!(backoff.next_delay(&err).is_some());
        assert!(backoff.next_delay(&err).is_none());
        assert_eq!(backoff.failures(), 3);
    }

    #[test]
    fn test_backoff_stops_on_permanent_error() {
        let config = RetryConfig::immediate(5);
        let mut backoff = config.backoff();
        assert!(backoff
            .next_delay(&Error::delivery("c", 400, "bad request"))
            .is_none());
    }
}
