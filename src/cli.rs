//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Downloads multiple files from various sources in parallel.
#[derive(Parser, Debug)]
#[command(name = "parfetch")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Downloads files from urls
    Download {
        /// Increase output verbosity (-v for debug, -vv for trace)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Print the resolved plan without performing any download
        #[arg(long)]
        dry_run: bool,

        /// Maximum concurrent downloads; overrides the manifest value
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=100))]
        parallel_downloads: Option<u16>,

        /// Manifest file (.yaml) describing the download job
        config: PathBuf,
    },

    /// Validates downloaded files integrity against their respective checksums if available
    Validate {
        /// Increase output verbosity (-v for debug, -vv for trace)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Manifest file (.yaml) describing the download job
        config: PathBuf,
    },
}
