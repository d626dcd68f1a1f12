//! Error types for the download module.
//!
//! This module defines structured errors for all download operations,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`copy_stream`](super::copy_stream) when either side of
/// the transfer fails mid-copy.
///
/// A failed copy leaves whatever was already written in the destination;
/// cleanup is the caller's decision.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Reading from the source stream failed.
    #[error("read from source failed: {0}")]
    Read(#[source] std::io::Error),

    /// Writing to the destination stream failed.
    #[error("write to destination failed: {0}")]
    Write(#[source] std::io::Error),
}

/// Errors that can occur while downloading one file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Either stream failed while the body was being copied.
    #[error("transfer failed for {url}: {source}")]
    Transfer {
        /// The URL whose transfer failed.
        url: String,
        /// The underlying stream error.
        #[source]
        source: TransferError,
    },
}

impl DownloadError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error with path context.
    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }

    /// Creates a transfer error with URL context.
    pub fn transfer(url: impl Into<String>, source: TransferError) -> Self {
        Self::Transfer {
            url: url.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_includes_status_and_url() {
        let error = DownloadError::http_status("https://example.com/f.bin", 503);
        let msg = error.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("https://example.com/f.bin"));
    }

    #[test]
    fn test_transfer_error_display_names_failing_side() {
        let read = TransferError::Read(std::io::Error::other("boom"));
        assert!(read.to_string().contains("read from source"));

        let write = TransferError::Write(std::io::Error::other("boom"));
        assert!(write.to_string().contains("write to destination"));
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let error = DownloadError::io(
            PathBuf::from("/tmp/out/a.bin"),
            std::io::Error::other("disk full"),
        );
        assert!(error.to_string().contains("/tmp/out/a.bin"));
    }
}
