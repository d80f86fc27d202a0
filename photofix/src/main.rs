//! photofix - backfill photo metadata from export sidecars
//!
//! Walks a library exported with one JSON sidecar per asset, writes the
//! capture date, location and (optionally) people into each asset with
//! exiftool, fixes JPEGs saved under another extension, and can move
//! orphaned live-photo videos to `_trash`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use photofix::services::{preflight, reporter, ExifTool, TracingReporter};
use photofix::{BatchOrchestrator, CliOverrides, RunConfig};
use photofix_common::config::load_config;
use photofix_common::logging::init_logging;

/// Command-line arguments for photofix
#[derive(Parser, Debug)]
#[command(name = "photofix")]
#[command(about = "Restore embedded metadata of an exported photo library from its JSON sidecars")]
#[command(version)]
struct Args {
    /// Library root
    directory: PathBuf,

    /// Add tagged people as keywords
    #[arg(short, long)]
    people: bool,

    /// Move live-photo videos without a sidecar to <directory>/_trash
    #[arg(short = 'l', long)]
    remove_live_video: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Inspect and plan only; change nothing on disk
    #[arg(short, long)]
    dry_run: bool,

    /// Files processed concurrently [default: 15]
    #[arg(short, long, env = "PHOTOFIX_THREADS")]
    threads: Option<usize>,

    /// exiftool executable
    #[arg(long, env = "PHOTOFIX_EXIFTOOL")]
    exiftool: Option<PathBuf>,

    /// Config file (default: <config dir>/photofix/config.toml)
    #[arg(long, env = "PHOTOFIX_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(args.verbose, toml.logging.level.as_deref());

    let mut config = RunConfig::resolve(
        CliOverrides {
            root: args.directory,
            people: args.people,
            remove_live_video: args.remove_live_video,
            verbose: args.verbose,
            dry_run: args.dry_run,
            threads: args.threads,
            exiftool: args.exiftool,
        },
        &toml,
    )
    .context("Invalid configuration")?;

    let tool = ExifTool::new(&config.exiftool);
    let checked = preflight::check(&config.root, config.dry_run, &tool)
        .context("Pre-flight check failed")?;
    config.root = checked.root;

    tracing::info!(
        root = %config.root.display(),
        people = config.people,
        remove_live_video = config.quarantine_live_videos,
        dry_run = config.dry_run,
        threads = config.concurrency,
        "Starting photofix {}",
        env!("CARGO_PKG_VERSION")
    );

    let start = Instant::now();
    let orchestrator = BatchOrchestrator::new(config, Arc::new(tool));
    let report = orchestrator
        .run(&TracingReporter)
        .await
        .context("Run aborted")?;

    print!("{}", reporter::render(&report, start.elapsed()));
    Ok(())
}
