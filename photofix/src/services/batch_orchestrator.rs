//! Batch orchestration
//!
//! Each sidecar runs through one pipeline:
//! Match → Parse → Inspect → Plan → Rename → Write → Sync file time
//!
//! Pipelines run as spawned tasks, at most `concurrency` at a time, via
//! `futures::stream::buffer_unordered`. The driving loop is the only writer
//! of the [`BatchResult`]. A failing (or panicking) pipeline becomes an
//! `Errored` outcome and never stops the batch.

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::models::{BatchResult, OrphanRecord, PipelineStage, ProcessingOutcome, QuarantineReport};
use crate::services::asset_inspector::AssetInspector;
use crate::services::exiftool::MetadataTool;
use crate::services::file_matcher::{self, MatchError};
use crate::services::file_scanner::{remove_temp_files, FileScanner, TempCleanup};
use crate::services::metadata_writer::MetadataWriter;
use crate::services::planner::{self, PlannerOptions};
use crate::services::quarantine::QuarantineManager;
use crate::services::reporter::{Reporter, RunReport};
use crate::services::sidecar_parser::read_sidecar;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-sidecar pipeline; cheap to clone into tasks
#[derive(Debug, Clone)]
struct Pipeline {
    inspector: AssetInspector,
    writer: MetadataWriter,
    planner_options: PlannerOptions,
    dry_run: bool,
}

/// Where a pipeline got to, for error reporting
#[derive(Debug)]
struct Progress {
    stage: PipelineStage,
    asset: Option<PathBuf>,
}

impl Pipeline {
    async fn process(&self, sidecar: &Path) -> ProcessingOutcome {
        let mut progress = Progress {
            stage: PipelineStage::Pending,
            asset: None,
        };

        match self.run_stages(sidecar, &mut progress).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(
                    sidecar = %sidecar.display(),
                    stage = %progress.stage,
                    error = %e,
                    "Pipeline failed"
                );
                ProcessingOutcome::errored(
                    sidecar.to_path_buf(),
                    progress.asset,
                    progress.stage,
                    e.to_string(),
                )
            }
        }
    }

    async fn run_stages(
        &self,
        sidecar: &Path,
        progress: &mut Progress,
    ) -> std::result::Result<ProcessingOutcome, PipelineError> {
        let asset_path = match file_matcher::resolve_asset(sidecar).await {
            Ok(path) => path,
            Err(MatchError::NotFound { expected }) => {
                tracing::debug!(
                    sidecar = %sidecar.display(),
                    expected = %expected.display(),
                    "No matching asset"
                );
                return Ok(ProcessingOutcome::no_match(sidecar.to_path_buf()));
            }
            Err(e) => {
                // The sidecar still claims its asset, so it is never an orphan
                progress.asset = Some(file_matcher::expected_asset_path(sidecar));
                return Err(e.into());
            }
        };
        progress.asset = Some(asset_path.clone());
        progress.stage = PipelineStage::Matched;

        let record = read_sidecar(sidecar).await?;
        let asset = self.inspector.inspect(&asset_path).await?;
        progress.stage = PipelineStage::Inspected;

        let plan = planner::plan(&record, &asset, &self.planner_options)?;
        progress.stage = PipelineStage::Planned;

        let mut target = asset_path.clone();
        if let Some(rename) = &plan.rename {
            self.writer.rename(rename).await?;
            if !self.dry_run {
                target = plan.target_path(&asset_path).to_path_buf();
                progress.asset = Some(target.clone());
            }
        }
        progress.stage = PipelineStage::Renamed;

        self.writer.write(&target, &plan.updates).await?;
        progress.stage = PipelineStage::Written;

        if let Some(captured_at) = plan.captured_at {
            // Tags are already on disk; the outcome stays Updated
            if let Err(e) = self.writer.sync_file_time(&target, captured_at).await {
                tracing::warn!(file = %target.display(), error = %e, "Could not sync file time");
            }
        }

        Ok(ProcessingOutcome::completed(
            sidecar.to_path_buf(),
            target,
            plan.updates,
            plan.rename.map(|r| r.to),
        ))
    }
}

/// Drives a whole library through the pipeline
pub struct BatchOrchestrator {
    config: RunConfig,
    scanner: FileScanner,
    pipeline: Pipeline,
}

impl BatchOrchestrator {
    pub fn new(config: RunConfig, tool: Arc<dyn MetadataTool>) -> Self {
        let pipeline = Pipeline {
            inspector: AssetInspector::new(tool.clone()),
            writer: MetadataWriter::new(tool, config.writer_options()),
            planner_options: config.planner_options(),
            dry_run: config.dry_run,
        };

        Self {
            config,
            scanner: FileScanner::new(),
            pipeline,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Remove `*_exiftool_tmp` leftovers (report only in dry-run)
    pub async fn cleanup_temp_files(&self) -> Result<TempCleanup> {
        let scanner = self.scanner.clone();
        let root = self.config.root.clone();
        let found = tokio::task::spawn_blocking(move || scanner.scan_temp_files(&root)).await??;

        Ok(remove_temp_files(found, self.config.dry_run).await)
    }

    /// Process every sidecar under the root
    pub async fn process_all(&self, reporter: &dyn Reporter) -> Result<BatchResult> {
        let scanner = self.scanner.clone();
        let root = self.config.root.clone();
        let sidecars = tokio::task::spawn_blocking(move || scanner.scan_sidecars(&root)).await??;

        Ok(self.process_sidecars(sidecars, reporter).await)
    }

    /// Process an explicit list of sidecars
    pub async fn process_sidecars(
        &self,
        sidecars: Vec<PathBuf>,
        reporter: &dyn Reporter,
    ) -> BatchResult {
        let total = sidecars.len();
        let mut result = BatchResult::new(total, self.config.dry_run);
        reporter.on_start(total);

        tracing::info!(
            total,
            workers = self.config.concurrency,
            dry_run = self.config.dry_run,
            "Starting batch"
        );

        let mut outcomes = stream::iter(sidecars)
            .map(|sidecar| {
                let pipeline = self.pipeline.clone();
                async move {
                    let task_sidecar = sidecar.clone();
                    let handle =
                        tokio::spawn(async move { pipeline.process(&task_sidecar).await });

                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            let asset = file_matcher::expected_asset_path(&sidecar);
                            ProcessingOutcome::errored(
                                sidecar,
                                Some(asset),
                                PipelineStage::Pending,
                                format!("Task failed: {}", e),
                            )
                        }
                    }
                }
            })
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            result.record(outcome);
            if let Some(last) = result.outcomes.last() {
                reporter.on_outcome(last, result.completed(), total);
            }
        }

        tracing::info!(
            updated = result.updated,
            no_change = result.no_change,
            no_match = result.no_match,
            errored = result.errored,
            "Batch complete"
        );

        result
    }

    /// Files under the root that no sidecar claimed
    pub async fn find_orphans(&self, matched: &HashSet<PathBuf>) -> Result<Vec<OrphanRecord>> {
        let scanner = self.scanner.clone();
        let root = self.config.root.clone();
        let matched = matched.clone();
        let orphans =
            tokio::task::spawn_blocking(move || scanner.scan_orphans(&root, &matched)).await??;
        Ok(orphans)
    }

    /// Quarantine live-video orphans
    ///
    /// Per-file failures land in the report; only a bad orphan path errors.
    pub async fn quarantine(&self, orphans: &[OrphanRecord]) -> Result<QuarantineReport> {
        let manager = QuarantineManager::new(&self.config.root, self.config.dry_run);
        Ok(manager.quarantine(orphans).await?)
    }

    /// Full run: temp cleanup, batch, orphan scan, optional quarantine
    pub async fn run(&self, reporter: &dyn Reporter) -> Result<RunReport> {
        let temp_cleanup = self.cleanup_temp_files().await?;
        let batch = self.process_all(reporter).await?;
        let orphans = self.find_orphans(&batch.matched_paths).await?;

        let quarantine = if self.config.quarantine_live_videos {
            Some(self.quarantine(&orphans).await?)
        } else {
            None
        };

        Ok(RunReport {
            batch,
            temp_cleanup,
            orphans,
            quarantine,
        })
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
