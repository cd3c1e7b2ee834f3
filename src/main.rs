use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manualflow::catalog;
use manualflow::config::Config;
use manualflow::crawler::pipeline::{shutdown_on_ctrl_c, ExtractionPipeline};
use manualflow::storage::CheckpointStore;

#[derive(Parser)]
#[command(
    name = "manualflow",
    version,
    about = "Resumable workflow extractor for product manual pages",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the extraction pipeline over a catalog snapshot
    Run {
        /// Catalog snapshot file (table-of-contents sections)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Checkpoint/output file
        #[arg(short = 'o', long, default_value = "workflows.json")]
        checkpoint: PathBuf,

        /// Skip the first N catalog entries (coarse resume; per-URL dedup
        /// stays active regardless)
        #[arg(long, default_value = "0")]
        start: usize,

        /// Number of concurrent task executions
        #[arg(long)]
        concurrency: Option<usize>,

        /// Flush the checkpoint after this many completed tasks
        #[arg(long)]
        flush_every: Option<usize>,
    },

    /// Summarize an existing checkpoint file
    Stats {
        /// Checkpoint file to inspect
        #[arg(short = 'o', long, default_value = "workflows.json")]
        checkpoint: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Run {
            catalog,
            checkpoint,
            start,
            concurrency,
            flush_every,
        } => {
            run(catalog, checkpoint, start, concurrency, flush_every).await?;
        }

        Commands::Stats { checkpoint } => {
            stats(checkpoint)?;
        }
    }

    Ok(())
}

async fn run(
    catalog_path: PathBuf,
    checkpoint_path: PathBuf,
    start: usize,
    concurrency: Option<usize>,
    flush_every: Option<usize>,
) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(concurrency) = concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Some(flush_every) = flush_every {
        config.pipeline.flush_every = flush_every;
    }

    let tasks = catalog::load_tasks(&catalog_path)?;
    let total = tasks.len();
    let tasks: Vec<_> = tasks.into_iter().skip(start).collect();
    if start > 0 {
        tracing::info!(start, remaining = tasks.len(), total, "Applying start offset");
    }

    let store = CheckpointStore::load(&checkpoint_path)?;
    let pipeline = ExtractionPipeline::new(config).context("Failed to build pipeline")?;

    let (_store, summary) = pipeline.run(tasks, store, shutdown_on_ctrl_c()).await?;

    println!(
        "Done: {} recorded, {} empty, {} failed, {} skipped, {:.1}s elapsed",
        summary.recorded,
        summary.empty,
        summary.failed,
        summary.skipped,
        summary.elapsed_ms as f64 / 1000.0,
    );

    Ok(())
}

fn stats(checkpoint_path: PathBuf) -> Result<()> {
    let store = CheckpointStore::load(&checkpoint_path)?;

    let with_steps = store.records().iter().filter(|r| !r.is_empty()).count();
    let total_steps: usize = store.records().iter().map(|r| r.steps.len()).sum();

    println!("Checkpoint: {}", checkpoint_path.display());
    println!("  records:      {}", store.len());
    println!("  with steps:   {with_steps}");
    println!("  empty:        {}", store.len() - with_steps);
    println!("  total steps:  {total_steps}");

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("manualflow=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("manualflow=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
