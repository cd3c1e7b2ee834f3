//! HTTP fetcher with rate limiting, jitter, and exponential backoff
//!
//! One concern only: getting page bytes for a task. Every outcome is
//! represented as a value ([`FetchError`] on failure); content parsing lives
//! in the parser module. All retry behavior across the pipeline goes through
//! the single [`RetryPolicy`] here rather than ad hoc loops at call sites.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::Rng;
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::FetchError;

/// Retry behavior for a fetch: attempts, backoff shape, and jitter range
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first
    pub max_attempts: u32,

    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,

    /// Cap on a single backoff sleep in milliseconds
    pub max_delay_ms: u64,

    /// Upper bound of the randomized pre-request delay in milliseconds
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            jitter_ms: 400,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry attempt `attempt` (1-based), exponential and
    /// capped at `max_delay_ms`
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        Duration::from_millis(exp.min(self.max_delay_ms))
    }

    /// Randomized pre-request delay to avoid synchronized bursts across
    /// concurrent workers
    fn jitter(&self) -> Duration {
        if self.jitter_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=self.jitter_ms))
    }
}

/// Manual page fetcher shared by all workers
///
/// The governor rate limiter is held inside the fetcher, so cloning the
/// surrounding `Arc` shares one request budget across the whole pool.
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter controlling request frequency across workers
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Retry and backoff configuration
    policy: RetryPolicy,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl PageFetcher {
    /// Create a fetcher from the fetch configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .user_agent(concat!("manualflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second)
            .unwrap_or_else(|| NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            policy: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay_ms: config.base_delay_ms,
                max_delay_ms: config.max_delay_ms,
                jitter_ms: config.jitter_ms,
            },
            base_url: None,
        })
    }

    /// Create a fetcher pointed at a mock server base URL
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(config: &FetchConfig, base_url: &str) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(config)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Fetch page content with jitter, rate limiting, and retries
    ///
    /// Classification per response:
    /// - 2xx: body returned immediately
    /// - 429 / 5xx: exponential backoff, then retry
    /// - timeout / connection error: exponential backoff, then retry
    /// - other 4xx: terminal, no further attempts
    ///
    /// # Errors
    ///
    /// Returns `FetchError::RetriesExhausted` after `max_attempts` retryable
    /// failures, or the terminal error for non-retryable responses.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let full_url = match &self.base_url {
            Some(base) => format!("{base}{url}"),
            None => url.to_string(),
        };

        let mut last_error: Option<FetchError> = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                let delay = self.policy.backoff(attempt - 1);
                tracing::debug!(
                    url = %full_url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            tokio::time::sleep(self.policy.jitter()).await;
            self.rate_limiter.until_ready().await;

            match self.client.get(&full_url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if (200..300).contains(&status) {
                        return response.text().await.map_err(FetchError::Http);
                    }

                    let err = classify_status(status);
                    if !err.is_retryable() {
                        tracing::warn!(url = %full_url, status, "Terminal fetch failure");
                        return Err(err);
                    }

                    tracing::debug!(url = %full_url, status, attempt, "Retryable status");
                    last_error = Some(err);
                }
                Err(e) => {
                    if !(e.is_timeout() || e.is_connect()) {
                        return Err(FetchError::Http(e));
                    }

                    tracing::debug!(url = %full_url, attempt, error = %e, "Transient network error");
                    last_error = Some(if e.is_timeout() {
                        FetchError::Timeout
                    } else {
                        FetchError::Http(e)
                    });
                }
            }
        }

        tracing::warn!(
            url = %full_url,
            attempts = self.policy.max_attempts,
            last_error = ?last_error,
            "Retries exhausted"
        );
        Err(FetchError::RetriesExhausted)
    }
}

/// Map a non-success status code onto a fetch error
fn classify_status(status: u16) -> FetchError {
    match status {
        429 => FetchError::RateLimited(status),
        500..=599 => FetchError::ServerError(status),
        _ => FetchError::ClientError(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 1000,
            jitter_ms: 0,
        }
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let policy = quick_policy();
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        // Capped at max_delay_ms
        assert_eq!(policy.backoff(10), Duration::from_millis(1000));
    }

    #[test]
    fn test_jitter_within_range() {
        let policy = RetryPolicy {
            jitter_ms: 50,
            ..quick_policy()
        };
        for _ in 0..100 {
            assert!(policy.jitter() <= Duration::from_millis(50));
        }
    }

    #[test]
    fn test_zero_jitter() {
        let policy = quick_policy();
        assert_eq!(policy.jitter(), Duration::ZERO);
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(classify_status(429), FetchError::RateLimited(429)));
        assert!(matches!(classify_status(500), FetchError::ServerError(500)));
        assert!(matches!(classify_status(503), FetchError::ServerError(503)));
        assert!(matches!(classify_status(404), FetchError::ClientError(404)));
        assert!(matches!(classify_status(403), FetchError::ClientError(403)));
    }

    #[test]
    fn test_fetcher_creation() {
        let config = FetchConfig::default();
        assert!(PageFetcher::new(&config).is_ok());
        assert!(PageFetcher::with_base_url(&config, "http://localhost:8080").is_ok());
    }
}
