//! HTTP streaming, chunked copy, and the concurrent batch engine.
//!
//! # Overview
//!
//! - [`HttpClient`] opens a URL as a readable byte stream plus the size the
//!   server advertised
//! - [`copy_stream`] moves bytes in fixed-size chunks and reports integer
//!   percent progress
//! - [`DownloadEngine`] dispatches a whole manifest batch through a
//!   semaphore-bounded pool, painting per-task progress rows
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use parfetch_core::{Console, DownloadEngine, HttpClient};
//!
//! # async fn example(tasks: Vec<parfetch_core::DownloadSpec>) -> Result<(), Box<dyn std::error::Error>> {
//! let console = Arc::new(Console::stdout());
//! let engine = DownloadEngine::new(4)?;
//! let client = HttpClient::new();
//! let stats = engine.run(&tasks, &client, Path::new("./downloads"), &console).await?;
//! println!("{} completed, {} skipped, {} failed", stats.completed(), stats.skipped(), stats.failed());
//! # Ok(())
//! # }
//! ```

mod client;
mod copy;
mod engine;
mod error;

pub use client::{HttpClient, RemoteStream};
pub use copy::{DEFAULT_CHUNK_SIZE, copy_stream};
pub use engine::{BatchStats, DEFAULT_PARALLEL_DOWNLOADS, DownloadEngine, EngineError};
pub use error::{DownloadError, TransferError};
