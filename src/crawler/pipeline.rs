//! Bounded worker pool driving fetch, extraction, and checkpointing
//!
//! Workers pull tasks from a shared channel, fetch and extract without
//! holding any locks, and hand their outcome to a single collector task.
//! The collector is the only writer to the checkpoint store and the
//! counters, so no mutation of shared state ever races.
//!
//! ```text
//! tasks ──▶ dispatch ──▶ worker 1..N (fetch ▶ extract) ──▶ collector
//!              │                                              │
//!          shutdown watch                      checkpoint append + flush
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::progress::ProgressReporter;
use crate::error::Result;
use crate::models::{Task, WorkflowRecord};
use crate::parser::BlockExtractor;
use crate::storage::CheckpointStore;

// ============================================================================
// Outcomes and Summary
// ============================================================================

/// Terminal state of one task execution
#[derive(Debug)]
pub enum TaskOutcome {
    /// Fetch and extraction succeeded with at least one step
    Recorded(WorkflowRecord),

    /// Fetch succeeded but nothing survived extraction (soft failure)
    Empty { task: Task },

    /// Fetch failed terminally (hard failure)
    Failed { url: String, reason: String },
}

/// Final counters for a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks pending after the checkpoint skip filter
    pub dispatched: usize,

    /// Tasks skipped because their URL was already checkpointed
    pub skipped: usize,

    /// Tasks that produced a record with steps
    pub recorded: u64,

    /// Tasks that produced zero steps
    pub empty: u64,

    /// Tasks whose fetch failed terminally
    pub failed: u64,

    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Tasks that reached a terminal state
    pub fn completed(&self) -> u64 {
        self.recorded + self.empty + self.failed
    }

    /// Soft plus hard failures, as shown in the progress line
    pub fn failures(&self) -> u64 {
        self.empty + self.failed
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Resumable concurrent extraction pipeline
pub struct ExtractionPipeline {
    config: Config,
    fetcher: Arc<PageFetcher>,
}

impl ExtractionPipeline {
    /// Create a pipeline from validated configuration
    ///
    /// # Errors
    ///
    /// Returns a config error for invalid settings, or a fetch error if the
    /// HTTP client cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Arc::new(PageFetcher::new(&config.fetch)?);
        Ok(Self { config, fetcher })
    }

    /// Create a pipeline around an existing fetcher (mock-server tests)
    pub fn with_fetcher(config: Config, fetcher: PageFetcher) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Run the pipeline over `tasks`, resuming from `store`
    ///
    /// Tasks already present in the checkpoint are skipped. The store is
    /// consumed and returned so callers can inspect the final set; a final
    /// flush always runs, including after a graceful shutdown signal.
    ///
    /// # Errors
    ///
    /// Only checkpoint flush failures propagate; every per-task error is
    /// contained in its [`TaskOutcome`].
    pub async fn run(
        &self,
        tasks: Vec<Task>,
        store: CheckpointStore,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(CheckpointStore, RunSummary)> {
        let started = Instant::now();

        let total = tasks.len();
        let pending: Vec<Task> = tasks
            .into_iter()
            .filter(|t| !store.contains(&t.source_url))
            .collect();
        let skipped = total - pending.len();

        tracing::info!(
            total,
            pending = pending.len(),
            skipped,
            concurrency = self.config.pipeline.concurrency,
            "Starting extraction run"
        );

        let mut summary = RunSummary {
            dispatched: pending.len(),
            skipped,
            ..Default::default()
        };

        // Small buffer keeps the queue shallow so a shutdown signal leaves
        // few tasks stranded in flight.
        let (task_tx, task_rx) = mpsc::channel::<Task>(self.config.pipeline.concurrency);
        let (outcome_tx, outcome_rx) = mpsc::channel::<TaskOutcome>(64);

        let workers = self.spawn_workers(task_rx, outcome_tx, shutdown.clone());
        let dispatcher = spawn_dispatcher(pending, task_tx, shutdown);

        // Collector: single writer for the store and counters
        let store = self
            .collect_outcomes(outcome_rx, store, &mut summary)
            .await?;

        let _ = dispatcher.await;
        for handle in workers {
            let _ = handle.await;
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            recorded = summary.recorded,
            empty = summary.empty,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed_ms,
            "Extraction run finished"
        );

        Ok((store, summary))
    }

    /// Spawn the bounded worker pool
    fn spawn_workers(
        &self,
        task_rx: mpsc::Receiver<Task>,
        outcome_tx: mpsc::Sender<TaskOutcome>,
        shutdown: watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let task_rx = Arc::new(Mutex::new(task_rx));
        let mut handles = Vec::with_capacity(self.config.pipeline.concurrency);

        for worker_id in 0..self.config.pipeline.concurrency {
            let task_rx = Arc::clone(&task_rx);
            let outcome_tx = outcome_tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let shutdown = shutdown.clone();
            let source_tag = self.config.source_tag.clone();

            handles.push(tokio::spawn(async move {
                let extractor = BlockExtractor::new();

                loop {
                    if *shutdown.borrow() {
                        break;
                    }

                    let task = {
                        let mut rx = task_rx.lock().await;
                        rx.recv().await
                    };

                    let Some(task) = task else {
                        break; // Channel closed, dispatch finished
                    };

                    let outcome = execute_task(&fetcher, &extractor, task, &source_tag).await;

                    if outcome_tx.send(outcome).await.is_err() {
                        break; // Collector gone
                    }
                }

                tracing::debug!(worker_id, "Worker shutting down");
            }));
        }

        handles
    }

    /// Drain task outcomes, owning the checkpoint store and all counters
    async fn collect_outcomes(
        &self,
        mut outcome_rx: mpsc::Receiver<TaskOutcome>,
        mut store: CheckpointStore,
        summary: &mut RunSummary,
    ) -> Result<CheckpointStore> {
        let reporter = ProgressReporter::new(summary.dispatched);
        let flush_every = self.config.pipeline.flush_every as u64;
        let mut since_flush = 0u64;

        while let Some(outcome) = outcome_rx.recv().await {
            match outcome {
                TaskOutcome::Recorded(record) => {
                    summary.recorded += 1;
                    tracing::debug!(url = %record.source_url, steps = record.steps.len(), "Recorded");
                    store.append(record);
                }
                TaskOutcome::Empty { task } => {
                    summary.empty += 1;
                    tracing::debug!(url = %task.source_url, "No steps extracted");
                    if self.config.pipeline.record_empty {
                        store.append(WorkflowRecord::new(
                            &task,
                            Vec::new(),
                            &self.config.source_tag,
                        ));
                    }
                }
                TaskOutcome::Failed { url, reason } => {
                    summary.failed += 1;
                    tracing::warn!(url = %url, reason = %reason, "Task failed");
                }
            }

            since_flush += 1;
            if since_flush >= flush_every {
                store.flush()?;
                since_flush = 0;
                tracing::info!(progress = %reporter.line(summary.completed(), summary.failures()));
            }
        }

        // Unconditional final flush, also on graceful interruption
        store.flush()?;
        tracing::info!(progress = %reporter.line(summary.completed(), summary.failures()));

        Ok(store)
    }
}

/// Run one task to a terminal state; every error becomes a value
async fn execute_task(
    fetcher: &PageFetcher,
    extractor: &BlockExtractor,
    task: Task,
    source_tag: &str,
) -> TaskOutcome {
    let html = match fetcher.fetch(&task.source_url).await {
        Ok(html) => html,
        Err(e) => {
            return TaskOutcome::Failed {
                url: task.source_url,
                reason: e.to_string(),
            }
        }
    };

    let steps = extractor.extract_steps(&html);

    if steps.is_empty() {
        TaskOutcome::Empty { task }
    } else {
        TaskOutcome::Recorded(WorkflowRecord::new(&task, steps, source_tag))
    }
}

/// Feed pending tasks into the worker channel until done or shut down
fn spawn_dispatcher(
    pending: Vec<Task>,
    task_tx: mpsc::Sender<Task>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for task in pending {
            if *shutdown.borrow() {
                tracing::info!("Shutdown requested, stopping dispatch");
                break;
            }
            if task_tx.send(task).await.is_err() {
                break;
            }
        }
    })
}

/// Convenience handle that flips the shutdown watch on Ctrl-C
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight tasks");
            let _ = tx.send(true);
            // Keep the sender alive so the receiver observes the flag
            // until the run winds down.
            tx.closed().await;
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counters() {
        let summary = RunSummary {
            dispatched: 10,
            skipped: 2,
            recorded: 6,
            empty: 2,
            failed: 1,
            elapsed_ms: 1234,
        };

        assert_eq!(summary.completed(), 9);
        assert_eq!(summary.failures(), 3);
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let mut config = Config::default();
        config.pipeline.concurrency = 0;
        assert!(ExtractionPipeline::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_with_no_tasks_flushes_and_returns() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("workflows.json");
        let store = CheckpointStore::load(&path).unwrap();

        let pipeline = ExtractionPipeline::new(Config::default()).unwrap();
        let (_, shutdown) = watch::channel(false);

        let (store, summary) = pipeline.run(Vec::new(), store, shutdown.clone()).await.unwrap();

        assert_eq!(summary.dispatched, 0);
        assert_eq!(summary.completed(), 0);
        assert!(store.is_empty());
        // Final flush ran even for an empty run
        assert!(path.exists());
    }
}
