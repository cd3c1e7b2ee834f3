//! Configuration management for the manualflow pipeline
//!
//! Configuration is loaded from environment variables (`MANUALFLOW_*`) with
//! sensible defaults; the CLI overrides the handful of values an operator
//! changes per run (paths, start offset, concurrency, flush cadence).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fetch layer configuration
    pub fetch: FetchConfig,

    /// Scheduler / worker pool configuration
    pub pipeline: PipelineConfig,

    /// Origin tag stamped on every output record
    pub source_tag: String,
}

/// Fetch layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum attempts per URL, including the first
    pub max_attempts: u32,

    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff sleep in milliseconds
    pub max_delay_ms: u64,

    /// Upper bound of the randomized pre-request delay in milliseconds
    pub jitter_ms: u64,

    /// Requests per second shared across all workers
    pub requests_per_second: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Scheduler / worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent task executions
    pub concurrency: usize,

    /// Flush the checkpoint after this many completed tasks
    pub flush_every: usize,

    /// Record tasks that yielded zero steps so they are never refetched.
    /// Set to false to leave them unrecorded for retry under improved
    /// extraction heuristics.
    pub record_empty: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            jitter_ms: 400,
            requests_per_second: 3,
            request_timeout_secs: 30,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            flush_every: 10,
            record_empty: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            pipeline: PipelineConfig::default(),
            source_tag: "ManualsLib".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            fetch: FetchConfig {
                max_attempts: env_parse("MANUALFLOW_MAX_ATTEMPTS", defaults.fetch.max_attempts),
                base_delay_ms: env_parse("MANUALFLOW_BASE_DELAY_MS", defaults.fetch.base_delay_ms),
                max_delay_ms: env_parse("MANUALFLOW_MAX_DELAY_MS", defaults.fetch.max_delay_ms),
                jitter_ms: env_parse("MANUALFLOW_JITTER_MS", defaults.fetch.jitter_ms),
                requests_per_second: env_parse(
                    "MANUALFLOW_REQUESTS_PER_SECOND",
                    defaults.fetch.requests_per_second,
                ),
                request_timeout_secs: env_parse(
                    "MANUALFLOW_REQUEST_TIMEOUT",
                    defaults.fetch.request_timeout_secs,
                ),
            },
            pipeline: PipelineConfig {
                concurrency: env_parse("MANUALFLOW_CONCURRENCY", defaults.pipeline.concurrency),
                flush_every: env_parse("MANUALFLOW_FLUSH_EVERY", defaults.pipeline.flush_every),
                record_empty: env_parse("MANUALFLOW_RECORD_EMPTY", defaults.pipeline.record_empty),
            },
            source_tag: std::env::var("MANUALFLOW_SOURCE_TAG").unwrap_or(defaults.source_tag),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        if self.pipeline.flush_every == 0 {
            return Err(Error::config("flush_every must be at least 1"));
        }
        if self.fetch.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }
        if self.fetch.requests_per_second == 0 {
            return Err(Error::config("requests_per_second must be at least 1"));
        }
        if self.fetch.max_delay_ms < self.fetch.base_delay_ms {
            return Err(Error::config("max_delay_ms must be >= base_delay_ms"));
        }
        Ok(())
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.request_timeout_secs)
    }
}
