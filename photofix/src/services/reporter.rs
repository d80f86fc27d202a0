//! Progress and final report
//!
//! The orchestrator hands each finished outcome to a caller-owned
//! [`Reporter`]. The end-of-run summary is rendered as plain text for stdout.

use crate::models::{
    BatchResult, OrphanRecord, ProcessingOutcome, ProcessingStatus, QuarantineReport,
};
use crate::services::file_scanner::TempCleanup;
use photofix_common::human_time::format_elapsed;
use std::fmt::Write as _;
use std::time::Duration;

/// Consumer of per-sidecar outcomes
///
/// Called from the single aggregation loop, in completion order.
pub trait Reporter: Send + Sync {
    fn on_start(&self, _total: usize) {}

    fn on_outcome(&self, outcome: &ProcessingOutcome, completed: usize, total: usize);
}

/// Logs progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_start(&self, total: usize) {
        tracing::info!(total, "Processing sidecars");
    }

    fn on_outcome(&self, outcome: &ProcessingOutcome, completed: usize, total: usize) {
        let file = outcome.display_path().display();
        match outcome.status {
            ProcessingStatus::Updated => tracing::info!(
                %file,
                updates = outcome.updates.len(),
                renamed = outcome.renamed_to.is_some(),
                progress = %format!("{}/{}", completed, total),
                "Updated"
            ),
            ProcessingStatus::NoChangeNeeded => tracing::debug!(
                %file,
                progress = %format!("{}/{}", completed, total),
                "Already complete"
            ),
            ProcessingStatus::NoMatch => tracing::debug!(
                sidecar = %outcome.sidecar_path.display(),
                progress = %format!("{}/{}", completed, total),
                "No asset for sidecar"
            ),
            ProcessingStatus::Errored => tracing::warn!(
                %file,
                stage = ?outcome.failed_stage,
                error = outcome.error.as_deref().unwrap_or(""),
                progress = %format!("{}/{}", completed, total),
                "Failed"
            ),
        }
    }
}

/// Everything a run produced, for the final report
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub batch: BatchResult,
    pub temp_cleanup: TempCleanup,
    pub orphans: Vec<OrphanRecord>,
    /// `None` when quarantine was not requested
    pub quarantine: Option<QuarantineReport>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.batch.errored > 0
    }
}

/// Render the end-of-run summary
///
/// Order: counts, errors, orphans, quarantine summary, elapsed time.
pub fn render(report: &RunReport, elapsed: Duration) -> String {
    let batch = &report.batch;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}{} sidecars: {} updated, {} already complete, {} without asset, {} errors ({} tag writes)",
        if batch.dry_run { "[dry run] " } else { "" },
        batch.total,
        batch.updated,
        batch.no_change,
        batch.no_match,
        batch.errored,
        batch.update_count(),
    );

    if !report.temp_cleanup.removed.is_empty() {
        let _ = writeln!(
            out,
            "Removed {} stray exiftool temp files",
            report.temp_cleanup.removed.len()
        );
    }

    let mut errors: Vec<&ProcessingOutcome> = batch.errors().collect();
    if !errors.is_empty() {
        errors.sort_by(|a, b| a.display_path().cmp(b.display_path()));
        let _ = writeln!(out, "\nErrors:");
        for outcome in errors {
            let _ = writeln!(
                out,
                "{} -> {}",
                outcome.display_path().display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if !report.orphans.is_empty() {
        let _ = writeln!(
            out,
            "\n{} files have no associated sidecar:",
            report.orphans.len()
        );
        for orphan in &report.orphans {
            let _ = writeln!(out, "{}", orphan.path.display());
        }
    }

    if let Some(quarantine) = &report.quarantine {
        let verb = if batch.dry_run { "Would move" } else { "Moved" };
        let _ = writeln!(
            out,
            "\n{} {} live videos to the trash ({} skipped, destination exists)",
            verb,
            quarantine.moved.len(),
            quarantine.skipped.len()
        );
        for failed in &quarantine.failed {
            let _ = writeln!(
                out,
                "Could not quarantine {} -> {}",
                failed.entry.original_path.display(),
                failed.error
            );
        }
    }

    let _ = writeln!(out, "\nDone in {}", format_elapsed(elapsed));
    out
}
