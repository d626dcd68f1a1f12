//! YAML manifest loading and descriptor validation.
//!
//! A manifest describes one batch job: a settings block (download directory,
//! default parallelism) and a list of download descriptors. Descriptors are
//! validated once at load time; everything after that point can assume they
//! are well formed. Descriptors are immutable and shared read-only across
//! worker tasks.
//!
//! # Manifest format
//!
//! ```yaml
//! config:
//!   parallel_downloads: 3
//!   download_dir: ./downloads
//! downloads:
//!   - url: https://example.com/a.bin
//!     file: a.bin
//!     sha256: "deadbeef..."
//!     overwrite: true
//! ```

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::download::DEFAULT_PARALLEL_DOWNLOADS;

/// Errors raised while loading or validating a manifest.
///
/// All of these are fatal: the batch never starts with a bad manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid YAML or is missing required fields.
    #[error("cannot parse manifest {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A descriptor has an empty or unparseable URL.
    #[error("download #{index}: invalid url {url:?}")]
    InvalidUrl {
        /// Zero-based descriptor index in the manifest.
        index: usize,
        /// The offending URL string.
        url: String,
    },

    /// A descriptor has an empty destination file name.
    #[error("download #{index}: empty file name")]
    EmptyFileName {
        /// Zero-based descriptor index in the manifest.
        index: usize,
    },

    /// A destination file name is absolute or escapes the download directory.
    #[error("download #{index}: file name {file:?} escapes the download directory")]
    UnsafeFileName {
        /// Zero-based descriptor index in the manifest.
        index: usize,
        /// The offending file name.
        file: String,
    },

    /// A configured digest has the wrong length or non-hex characters.
    #[error("download #{index}: malformed {algorithm} digest {digest:?}")]
    InvalidDigest {
        /// Zero-based descriptor index in the manifest.
        index: usize,
        /// Algorithm name ("sha1" or "sha256").
        algorithm: &'static str,
        /// The offending digest string.
        digest: String,
    },

    /// Two descriptors target the same destination file.
    #[error("duplicate destination file {file:?}")]
    DuplicateDestination {
        /// The file name configured more than once.
        file: String,
    },
}

/// One file to fetch and validate.
///
/// Field names match the manifest keys one to one.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DownloadSpec {
    /// Source URL.
    pub url: String,
    /// Destination file name, relative to the download directory.
    pub file: String,
    /// Expected SHA-1 digest (40 hex chars), if configured.
    #[serde(default)]
    pub sha1: Option<String>,
    /// Expected SHA-256 digest (64 hex chars), if configured.
    #[serde(default)]
    pub sha256: Option<String>,
    /// Whether an existing destination file may be replaced.
    /// Absent counts as `false`.
    #[serde(default)]
    pub overwrite: Option<bool>,
}

impl DownloadSpec {
    /// Returns true only when overwrite was explicitly requested.
    #[must_use]
    pub fn overwrite_requested(&self) -> bool {
        self.overwrite == Some(true)
    }

    /// Destination path for this descriptor under `target_dir`.
    #[must_use]
    pub fn destination(&self, target_dir: &Path) -> PathBuf {
        target_dir.join(&self.file)
    }
}

/// The `config:` block of a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Default parallelism for the batch. Zero or absent defers to the
    /// built-in default.
    #[serde(default)]
    pub parallel_downloads: Option<usize>,
    /// Directory the batch downloads into.
    pub download_dir: PathBuf,
}

/// A fully loaded and validated batch manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Batch-wide settings.
    pub config: Settings,
    /// Download descriptors, in manifest order.
    #[serde(default)]
    pub downloads: Vec<DownloadSpec>,
}

impl Manifest {
    /// Loads and validates a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] if the file cannot be read, is not valid
    /// YAML, or any descriptor fails validation.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parses and validates manifest text. `path` is used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] on YAML or descriptor validation failure.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ManifestError> {
        let manifest: Self =
            serde_yaml::from_str(text).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Resolves the batch parallelism.
    ///
    /// Precedence: CLI override (when positive), then the manifest value
    /// (when positive), then [`DEFAULT_PARALLEL_DOWNLOADS`].
    #[must_use]
    pub fn resolve_parallelism(&self, cli_override: Option<usize>) -> usize {
        cli_override
            .filter(|&n| n > 0)
            .or_else(|| self.config.parallel_downloads.filter(|&n| n > 0))
            .unwrap_or(DEFAULT_PARALLEL_DOWNLOADS)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        for (index, spec) in self.downloads.iter().enumerate() {
            if spec.url.is_empty() || Url::parse(&spec.url).is_err() {
                return Err(ManifestError::InvalidUrl {
                    index,
                    url: spec.url.clone(),
                });
            }
            if spec.file.is_empty() {
                return Err(ManifestError::EmptyFileName { index });
            }
            if !is_safe_relative(&spec.file) {
                return Err(ManifestError::UnsafeFileName {
                    index,
                    file: spec.file.clone(),
                });
            }
            if let Some(digest) = &spec.sha1 {
                if !is_hex_digest(digest, 40) {
                    return Err(ManifestError::InvalidDigest {
                        index,
                        algorithm: "sha1",
                        digest: digest.clone(),
                    });
                }
            }
            if let Some(digest) = &spec.sha256 {
                if !is_hex_digest(digest, 64) {
                    return Err(ManifestError::InvalidDigest {
                        index,
                        algorithm: "sha256",
                        digest: digest.clone(),
                    });
                }
            }
        }

        // Two descriptors writing the same file would race on the same path.
        let mut seen = std::collections::HashSet::new();
        for spec in &self.downloads {
            if !seen.insert(spec.file.as_str()) {
                return Err(ManifestError::DuplicateDestination {
                    file: spec.file.clone(),
                });
            }
        }

        Ok(())
    }
}

/// A destination name must stay inside the download directory: relative,
/// and free of `..` components.
fn is_safe_relative(file: &str) -> bool {
    let path = Path::new(file);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn is_hex_digest(digest: &str, expected_len: usize) -> bool {
    digest.len() == expected_len && digest.chars().all(|c| c.is_ascii_hexdigit())
}
