//! Parfetch Core Library
//!
//! This library provides the core functionality for the parfetch tool,
//! which downloads batches of files in parallel with live per-file
//! progress and validates the results against configured checksums.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`manifest`] - YAML manifest loading and descriptor validation
//! - [`console`] - Serialized cursor-addressed progress rendering
//! - [`download`] - HTTP streaming, chunked copy, and the batch engine
//! - [`validate`] - Checksum recomputation and match reporting

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod console;
pub mod download;
pub mod manifest;
pub mod validate;

// Re-export commonly used types
pub use console::{Console, ProgressBarRow, RowAllocator};
pub use download::{
    BatchStats, DEFAULT_CHUNK_SIZE, DEFAULT_PARALLEL_DOWNLOADS, DownloadEngine, DownloadError,
    EngineError, HttpClient, RemoteStream, TransferError, copy_stream,
};
pub use manifest::{DownloadSpec, Manifest, ManifestError, Settings};
pub use validate::{HashAlgorithm, HashOutcome, ValidationResult, validate};
