//! Batch engine for concurrent downloads with live row-addressed progress.
//!
//! The engine drives one manifest batch: every descriptor is dispatched to a
//! semaphore-bounded pool of Tokio tasks, each worker streams its file to
//! disk while painting a progress bar on its own pair of console rows, and
//! per-task failures never disturb sibling tasks.
//!
//! # Concurrency model
//!
//! - Each download runs in its own Tokio task
//! - A semaphore permit is acquired before dispatching each download
//! - Permits are released automatically when downloads complete (RAII)
//! - Visual rows are assigned at dispatch time from one shared atomic
//!   counter, so row order reflects scheduling order even when completion
//!   order differs
//! - The only cross-task state is the row counter and the console lock;
//!   the console lock is held per write call, never across I/O waits

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tokio::io::BufWriter;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{DEFAULT_CHUNK_SIZE, DownloadError, HttpClient, copy_stream};
use crate::console::{Console, ProgressBarRow, RowAllocator, TaskRows};
use crate::manifest::DownloadSpec;

/// Default parallelism when neither the CLI nor the manifest sets one.
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 4;

/// First console row of the progress area; rows above hold the preamble.
const PROGRESS_BASE_ROW: usize = 3;

/// Column of the "| 100 %" end-of-bar marker.
const BAR_END_COLUMN: usize = 101;

/// Column of the elapsed-time report.
const TIMING_COLUMN: usize = 111;

/// Error type for batch engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid parallelism value provided.
    #[error("invalid parallelism value {value}: must be at least 1")]
    InvalidParallelism {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The download directory could not be created.
    #[error("cannot create download directory {path}: {source}")]
    CreateDir {
        /// The directory that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Statistics from one batch run.
///
/// Uses atomic counters for thread-safe updates from concurrent download
/// tasks.
#[derive(Debug, Default)]
pub struct BatchStats {
    completed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of downloads that completed successfully.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of tasks skipped because the destination already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Number of downloads that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Total number of tasks processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.skipped() + self.failed()
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// How a single task ended, short of failure.
enum TaskOutcome {
    /// File fetched and written.
    Completed { bytes: u64 },
    /// Destination existed and overwrite was not requested.
    Skipped,
}

/// Batch download engine with bounded concurrency.
#[derive(Debug)]
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured parallelism.
    parallelism: usize,
}

impl DownloadEngine {
    /// Creates a new engine bounded to `parallelism` in-flight downloads.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParallelism`] if `parallelism` is 0.
    pub fn new(parallelism: usize) -> Result<Self, EngineError> {
        if parallelism == 0 {
            return Err(EngineError::InvalidParallelism { value: parallelism });
        }

        debug!(parallelism, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(parallelism)),
            parallelism,
        })
    }

    /// Returns the configured parallelism.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Runs every descriptor in `tasks` against `target_dir`.
    ///
    /// Renders a preamble and one row pair per task on `console`, bounded by
    /// the engine's parallelism. When this returns, the console cursor is
    /// parked below the last progress row.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CreateDir`] if the download directory cannot
    /// be created, and [`EngineError::SemaphoreClosed`] if the semaphore is
    /// closed. Individual task failures do NOT cause this method to error;
    /// they are rendered on the failing task's row and counted in the stats.
    pub async fn run<W>(
        &self,
        tasks: &[DownloadSpec],
        client: &HttpClient,
        target_dir: &Path,
        console: &Arc<Console<W>>,
    ) -> Result<BatchStats, EngineError>
    where
        W: Write + Send + 'static,
    {
        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|source| EngineError::CreateDir {
                path: target_dir.to_path_buf(),
                source,
            })?;

        console.write_at(1, 0, &format!("Download folder: {}", target_dir.display()));
        console.write_at(2, 0, &format!("Parallel downloads: {}", self.parallelism));

        let rows = Arc::new(RowAllocator::new(PROGRESS_BASE_ROW));
        let stats = Arc::new(BatchStats::new());
        let mut handles = Vec::new();

        info!(tasks = tasks.len(), dir = %target_dir.display(), "starting batch");

        for spec in tasks {
            // Acquire the permit before dispatch so row assignment order
            // matches scheduling order.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let task_rows = rows.allocate();
            let spec = spec.clone();
            let client = client.clone();
            let console = Arc::clone(console);
            let stats = Arc::clone(&stats);
            let target_dir = target_dir.to_path_buf();

            handles.push(tokio::spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let _permit = permit;

                let result = run_one(&client, &spec, &target_dir, &console, task_rows).await;

                match result {
                    Ok(TaskOutcome::Completed { bytes }) => {
                        info!(file = %spec.file, bytes, "download completed");
                        stats.increment_completed();
                    }
                    Ok(TaskOutcome::Skipped) => {
                        info!(file = %spec.file, "destination exists, skipped");
                        stats.increment_skipped();
                    }
                    Err(e) => {
                        warn!(file = %spec.file, url = %spec.url, error = %e, "download failed");
                        console.write_at(task_rows.body, 0, &format!("FAILED: {e}"));
                        stats.increment_failed();
                    }
                }
            }));
        }

        debug!(
            task_count = handles.len(),
            "waiting for downloads to complete"
        );

        for handle in handles {
            // Task panics are logged but don't fail the batch.
            if let Err(e) = handle.await {
                warn!(error = %e, "download task panicked");
            }
        }

        // Park the cursor below the last assigned row pair, not below the
        // last task to finish; otherwise later completions would be painted
        // over by the shell prompt.
        console.park_at(rows.end_row());

        info!(
            completed = stats.completed(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            "batch complete"
        );

        // All tasks are done, so we should have sole ownership of the Arc.
        match Arc::try_unwrap(stats) {
            Ok(stats) => Ok(stats),
            Err(arc_stats) => {
                let fallback = BatchStats::new();
                fallback
                    .completed
                    .store(arc_stats.completed(), Ordering::SeqCst);
                fallback
                    .skipped
                    .store(arc_stats.skipped(), Ordering::SeqCst);
                fallback.failed.store(arc_stats.failed(), Ordering::SeqCst);
                Ok(fallback)
            }
        }
    }
}

/// Runs one download: header row, overwrite check, fetch, streamed copy
/// with bar rendering, timing report.
async fn run_one<W>(
    client: &HttpClient,
    spec: &DownloadSpec,
    target_dir: &Path,
    console: &Arc<Console<W>>,
    rows: TaskRows,
) -> Result<TaskOutcome, DownloadError>
where
    W: Write + Send + 'static,
{
    console.write_at(
        rows.header,
        0,
        &format!("{} - Overwrite: {}", spec.file, spec.overwrite_requested()),
    );

    let destination = spec.destination(target_dir);

    if !spec.overwrite_requested()
        && tokio::fs::try_exists(&destination).await.unwrap_or(false)
    {
        console.write_at(rows.body, 0, "File exists !");
        return Ok(TaskOutcome::Skipped);
    }

    console.write_at(rows.body, BAR_END_COLUMN, "| 100 %");

    let mut remote = client.open(&spec.url).await?;
    let total_size = remote.total_size();

    let file = tokio::fs::File::create(&destination)
        .await
        .map_err(|e| DownloadError::io(destination.clone(), e))?;
    let mut writer = BufWriter::new(file);

    let mut bar = ProgressBarRow::new(Arc::clone(console), rows.body);
    let started = Instant::now();

    let bytes = copy_stream(
        &mut remote,
        &mut writer,
        total_size,
        |percent| bar.advance(percent),
        DEFAULT_CHUNK_SIZE,
    )
    .await
    .map_err(|source| DownloadError::transfer(&spec.url, source))?;

    let elapsed = started.elapsed();
    console.write_at(
        rows.body,
        TIMING_COLUMN,
        &format!("({:.2} s)", elapsed.as_secs_f64()),
    );

    debug!(
        file = %spec.file,
        bytes,
        elapsed_ms = elapsed.as_millis(),
        "transfer finished"
    );

    Ok(TaskOutcome::Completed { bytes })
}
