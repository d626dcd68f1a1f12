//! Chunked stream copy with coarse-grained progress reporting.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::TransferError;

/// Default copy chunk size (also the file write granularity).
pub const DEFAULT_CHUNK_SIZE: usize = 128 * 1024;

/// Copies `source` to `destination` in fixed-size chunks, reporting integer
/// percent progress along the way.
///
/// Each chunk is fully written before the next read; there are never two
/// in-flight writes to the same destination. Progress percent is
/// `bytes_so_far * 100 / total_size`, rounded down. `on_progress` fires once
/// per read that raises that value, so values arrive strictly increasing and
/// each value is reported at most once. The first report may be 0 when a
/// chunk is smaller than one percent of the total.
///
/// When `total_size` is 0 the length is unknown: no intermediate percents
/// are reported, and a single terminal 100 fires once the stream is
/// exhausted.
///
/// Progress ordering is only meaningful within one copy. Concurrent copies
/// interleave their callbacks arbitrarily.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns [`TransferError`] if either stream fails mid-copy. Bytes already
/// written stay in the destination.
///
/// # Panics
///
/// Panics if `chunk_size` is 0.
pub async fn copy_stream<R, W, F>(
    source: &mut R,
    destination: &mut W,
    total_size: u64,
    mut on_progress: F,
    chunk_size: usize,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
    F: FnMut(u8),
{
    assert!(chunk_size > 0, "chunk_size must be positive");

    let mut buffer = vec![0u8; chunk_size];
    let mut copied: u64 = 0;
    let mut last_percent: Option<u64> = None;

    loop {
        let read = source
            .read(&mut buffer)
            .await
            .map_err(TransferError::Read)?;
        if read == 0 {
            break;
        }

        destination
            .write_all(&buffer[..read])
            .await
            .map_err(TransferError::Write)?;
        copied += read as u64;

        if total_size > 0 {
            // Capped so a server sending more than it advertised cannot push
            // the bar past 100.
            let percent = copied.min(total_size).saturating_mul(100) / total_size;
            if last_percent.is_none_or(|last| percent > last) {
                last_percent = Some(percent);
                on_progress(u8::try_from(percent).unwrap_or(100));
            }
        }
    }

    destination.flush().await.map_err(TransferError::Write)?;

    if total_size == 0 {
        on_progress(100);
    }

    Ok(copied)
}
