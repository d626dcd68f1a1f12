//! CLI entry point for the parfetch tool.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parfetch_core::{Console, DownloadEngine, HttpClient, Manifest, validate};
use tracing::{debug, info};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    match cli.command {
        Command::Download {
            verbose,
            dry_run,
            parallel_downloads,
            config,
        } => {
            init_tracing(verbose);
            run_download(dry_run, parallel_downloads.map(usize::from), &config).await
        }
        Command::Validate { verbose, config } => {
            init_tracing(verbose);
            run_validate(&config)
        }
    }
}

/// Installs the tracing subscriber.
///
/// Priority: RUST_LOG env var > verbose flag > default (info). Logs go to
/// stderr so they never land inside the progress area on stdout.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_download(
    dry_run: bool,
    parallel_override: Option<usize>,
    config: &Path,
) -> Result<()> {
    let manifest = Manifest::load(config)
        .with_context(|| format!("loading manifest {}", config.display()))?;
    let parallelism = manifest.resolve_parallelism(parallel_override);
    let target_dir = manifest.config.download_dir.clone();

    debug!(
        downloads = manifest.downloads.len(),
        parallelism,
        dir = %target_dir.display(),
        "manifest loaded"
    );

    if dry_run {
        println!("Download folder: {}", target_dir.display());
        println!("Parallel downloads: {parallelism}");
        for spec in &manifest.downloads {
            let hashes = match (&spec.sha1, &spec.sha256) {
                (Some(_), Some(_)) => "sha1+sha256",
                (Some(_), None) => "sha1",
                (None, Some(_)) => "sha256",
                (None, None) => "none",
            };
            println!(
                "  {} <- {} (overwrite: {}, hashes: {})",
                spec.file,
                spec.url,
                spec.overwrite_requested(),
                hashes
            );
        }
        return Ok(());
    }

    let console = Arc::new(Console::stdout());
    let client = HttpClient::new();
    let engine = DownloadEngine::new(parallelism)?;

    let stats = engine
        .run(&manifest.downloads, &client, &target_dir, &console)
        .await?;

    println!(
        "\n{} completed, {} skipped, {} failed",
        stats.completed(),
        stats.skipped(),
        stats.failed()
    );

    // Per-task failures are reported outcomes, not process errors.
    Ok(())
}

fn run_validate(config: &Path) -> Result<()> {
    let manifest = Manifest::load(config)
        .with_context(|| format!("loading manifest {}", config.display()))?;

    info!(downloads = manifest.downloads.len(), "validating");
    let results = validate::validate(&manifest.downloads, &manifest.config.download_dir);

    let mut stdout = std::io::stdout().lock();
    validate::render_report(&results, &mut stdout).context("writing validation report")?;
    Ok(())
}
