//! Checksum validation of downloaded files.
//!
//! Runs as a separate pass over the same descriptors the download batch
//! used: for each configured digest the whole file is re-read from the
//! start, hashed in fixed-size chunks, and compared case-insensitively
//! against the expected hex string. Algorithms are evaluated independently;
//! a SHA-256 mismatch says nothing about the SHA-1 outcome.

use std::fmt;
use std::io::Read;
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::manifest::DownloadSpec;

/// Hash read chunk size.
const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithm configured for a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-1 (40 hex chars).
    Sha1,
    /// SHA-256 (64 hex chars).
    Sha256,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA-1"),
            Self::Sha256 => write!(f, "SHA-256"),
        }
    }
}

/// Result of comparing one recomputed digest against its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOutcome {
    /// Which algorithm was checked.
    pub algorithm: HashAlgorithm,
    /// The digest the manifest expects, as configured.
    pub expected: String,
    /// The digest computed from the file, lowercase hex.
    pub computed: String,
    /// Whether the two are equal, ignoring case.
    pub matched: bool,
}

/// Validation outcome for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Destination file name from the descriptor.
    pub file: String,
    /// Whether the destination file exists and is readable.
    pub file_exists: bool,
    /// One outcome per configured algorithm, SHA-1 first. Empty when no
    /// hash is configured or the file is missing.
    pub outcomes: Vec<HashOutcome>,
}

/// Validates every descriptor in `tasks` against the files in `target_dir`.
///
/// Never fails: missing files and mismatched digests are reported outcomes,
/// not errors. An unreadable file counts as missing.
#[must_use]
pub fn validate(tasks: &[DownloadSpec], target_dir: &Path) -> Vec<ValidationResult> {
    tasks
        .iter()
        .map(|spec| validate_one(spec, target_dir))
        .collect()
}

fn validate_one(spec: &DownloadSpec, target_dir: &Path) -> ValidationResult {
    debug!(file = %spec.file, "validating file");
    let path = spec.destination(target_dir);

    let configured: Vec<(HashAlgorithm, &String)> = [
        (HashAlgorithm::Sha1, spec.sha1.as_ref()),
        (HashAlgorithm::Sha256, spec.sha256.as_ref()),
    ]
    .into_iter()
    .filter_map(|(algorithm, expected)| expected.map(|e| (algorithm, e)))
    .collect();

    if !path.is_file() {
        return ValidationResult {
            file: spec.file.clone(),
            file_exists: false,
            outcomes: Vec::new(),
        };
    }

    let mut outcomes = Vec::with_capacity(configured.len());
    for (algorithm, expected) in configured {
        let computed = match algorithm {
            HashAlgorithm::Sha1 => hash_file::<Sha1>(&path),
            HashAlgorithm::Sha256 => hash_file::<Sha256>(&path),
        };
        let Ok(computed) = computed else {
            // A file that cannot be read end to end is as good as absent.
            return ValidationResult {
                file: spec.file.clone(),
                file_exists: false,
                outcomes: Vec::new(),
            };
        };

        let matched = expected.eq_ignore_ascii_case(&computed);
        debug!(file = %spec.file, %algorithm, matched, "hash checked");
        outcomes.push(HashOutcome {
            algorithm,
            expected: expected.clone(),
            computed,
            matched,
        });
    }

    ValidationResult {
        file: spec.file.clone(),
        file_exists: true,
        outcomes,
    }
}

/// Computes the digest of a whole file as lowercase hex, reading in chunks
/// to keep memory use bounded.
fn hash_file<D: Digest>(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Renders a validation report as plain lines.
///
/// # Errors
///
/// Returns the underlying IO error if writing to `out` fails.
pub fn render_report(
    results: &[ValidationResult],
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    for result in results {
        writeln!(out)?;
        writeln!(out, "{}", result.file)?;
        if !result.file_exists {
            writeln!(out, "  File does not exist!")?;
            continue;
        }
        if result.outcomes.is_empty() {
            writeln!(out, "  No hash configured")?;
            continue;
        }
        for outcome in &result.outcomes {
            if outcome.matched {
                writeln!(out, "  Valid {}", outcome.algorithm)?;
            } else {
                writeln!(
                    out,
                    "  Invalid {} (expected {}, computed {})",
                    outcome.algorithm, outcome.expected, outcome.computed
                )?;
            }
        }
    }
    Ok(())
}
