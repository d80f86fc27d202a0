//! photofix-restore - undo live-video quarantine
//!
//! By default restores only files a sidecar claims (assets moved to `_trash`
//! by mistake). `--all` moves everything in `_trash` back to its mirrored
//! location.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use photofix::services::preflight;
use photofix::QuarantineManager;
use photofix_common::config::load_config;
use photofix_common::logging::init_logging;

/// Command-line arguments for photofix-restore
#[derive(Parser, Debug)]
#[command(name = "photofix-restore")]
#[command(about = "Move quarantined files from <directory>/_trash back into the library")]
#[command(version)]
struct Args {
    /// Library root
    directory: PathBuf,

    /// Restore every quarantined file, not only those with a sidecar
    #[arg(short, long)]
    all: bool,

    /// Report what would move without moving
    #[arg(short, long)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: <config dir>/photofix/config.toml)
    #[arg(long, env = "PHOTOFIX_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(args.verbose, toml.logging.level.as_deref());

    let root = preflight::check_root(&args.directory, args.dry_run)
        .context("Pre-flight check failed")?;

    let manager = QuarantineManager::new(root, args.dry_run);
    tracing::info!(trash = %manager.trash_dir().display(), all = args.all, "Restoring");

    let report = if args.all {
        manager.restore_all().await
    } else {
        manager.restore_from_sidecars().await
    }
    .context("Restore failed")?;

    let verb = if args.dry_run { "Would restore" } else { "Restored" };
    for entry in &report.restored {
        println!(
            "{} {} -> {}",
            verb,
            entry.trashed_path.display(),
            entry.original_path.display()
        );
    }
    for entry in &report.conflicts {
        println!(
            "Kept {} ({} already exists)",
            entry.trashed_path.display(),
            entry.original_path.display()
        );
    }
    for failed in &report.failed {
        println!(
            "Failed {} -> {}",
            failed.entry.trashed_path.display(),
            failed.error
        );
    }
    println!(
        "{} {} files, {} conflicts, {} failed",
        verb,
        report.restored.len(),
        report.conflicts.len(),
        report.failed.len()
    );

    Ok(())
}
