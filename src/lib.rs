//! manualflow - Resumable workflow extractor for product manual pages
//!
//! Walks a previously harvested catalog of manual sections, fetches each
//! rendered page, reconstructs the reading order of its absolutely-positioned
//! text fragments, and persists step-like content incrementally so a
//! multi-hour crawl can be interrupted and resumed at any point.
//!
//! # Architecture
//!
//! - [`catalog`] - Task enumeration from the catalog snapshot
//! - [`crawler`] - Fetch layer, worker pool, and progress reporting
//! - [`parser`] - Positional block extraction and filtering
//! - [`storage`] - Checkpoint store with atomic flushes
//! - [`config`] - Configuration management
//! - [`models`] - Core data structures
//! - [`error`] - Unified error types
//!
//! # Example
//!
//! ```no_run
//! use manualflow::catalog;
//! use manualflow::config::Config;
//! use manualflow::crawler::pipeline::{shutdown_on_ctrl_c, ExtractionPipeline};
//! use manualflow::storage::CheckpointStore;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tasks = catalog::load_tasks(Path::new("toc_sections.json"))?;
//!     let store = CheckpointStore::load(Path::new("workflows.json"))?;
//!     let pipeline = ExtractionPipeline::new(Config::from_env())?;
//!     let (_store, summary) = pipeline.run(tasks, store, shutdown_on_ctrl_c()).await?;
//!     println!("recorded {} workflows", summary.recorded);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{ExtractionPipeline, PageFetcher, ProgressReporter, RunSummary};
    pub use crate::error::{Error, FetchError, Result};
    pub use crate::models::{Task, TextBlock, WorkflowRecord};
    pub use crate::parser::BlockExtractor;
    pub use crate::storage::CheckpointStore;
}

// Direct re-exports for convenience
pub use models::{Task, TextBlock, WorkflowRecord};
