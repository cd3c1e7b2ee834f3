//! Fetching and scheduling for the extraction pipeline
//!
//! - [`fetcher`] retrieves page content with rate limiting and backoff
//! - [`pipeline`] runs the bounded worker pool and owns checkpointing
//! - [`progress`] derives human-readable progress from the run counters

pub mod fetcher;
pub mod pipeline;
pub mod progress;

pub use fetcher::{PageFetcher, RetryPolicy};
pub use pipeline::{ExtractionPipeline, RunSummary, TaskOutcome};
pub use progress::ProgressReporter;
