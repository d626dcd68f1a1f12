//! HTTP client for opening remote resources as byte streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::StreamReader;
use tracing::debug;
use url::Url;

use super::DownloadError;

/// Default connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default read timeout in seconds (5 minutes, for large files).
const READ_TIMEOUT_SECS: u64 = 300;

/// HTTP client for streaming downloads.
///
/// Designed to be created once and shared across all workers of a batch,
/// taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes (for large files)
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .read_timeout(std::time::Duration::from_secs(read_timeout_secs))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Opens `url` for reading and returns the response body as a stream
    /// plus the advertised total size.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    pub async fn open(&self, url: &str) -> Result<RemoteStream, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        // Content-Length may be absent (chunked transfer, compressed body);
        // zero means "unknown" downstream.
        let total_size = response.content_length().unwrap_or(0);
        debug!(url, total_size, "opened remote stream");

        let stream: BoxStream<'static, std::io::Result<Bytes>> = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        Ok(RemoteStream {
            total_size,
            reader: StreamReader::new(stream),
        })
    }
}

/// An open remote resource: a readable byte stream plus the size the server
/// declared, 0 when unknown.
pub struct RemoteStream {
    total_size: u64,
    reader: StreamReader<BoxStream<'static, std::io::Result<Bytes>>, Bytes>,
}

impl RemoteStream {
    /// Declared body size in bytes, or 0 when the server did not say.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

impl std::fmt::Debug for RemoteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStream")
            .field("total_size", &self.total_size)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for RemoteStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}
