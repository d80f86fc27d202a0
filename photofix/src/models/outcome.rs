//! Per-sidecar outcomes and the batch aggregate

use crate::models::plan::FieldUpdate;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Per-sidecar pipeline stage
///
/// `Pending → Matched → Inspected → Planned → Renamed → Written → Done`.
/// A failure ends the sidecar as `Errored`, recording the last stage reached.
/// `Display` names the step that runs after that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Pending,
    Matched,
    Inspected,
    Planned,
    Renamed,
    Written,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Pending => "match",
            PipelineStage::Matched => "inspect",
            PipelineStage::Inspected => "plan",
            PipelineStage::Planned => "rename",
            PipelineStage::Renamed => "write",
            PipelineStage::Written => "finish",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal status of one sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStatus {
    /// Asset renamed and/or tags written (planned only in dry-run)
    Updated,
    /// Asset already complete
    NoChangeNeeded,
    /// No asset found for the sidecar
    NoMatch,
    /// A step failed; see the error message
    Errored,
}

/// Result of running one sidecar through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOutcome {
    pub sidecar_path: PathBuf,
    /// Final asset path (after any rename); `None` when unmatched
    pub asset_path: Option<PathBuf>,
    pub status: ProcessingStatus,
    pub error: Option<String>,
    /// Last stage reached before the failure
    pub failed_stage: Option<PipelineStage>,
    /// Tag writes applied (or planned in dry-run)
    pub updates: Vec<FieldUpdate>,
    /// New path when the extension was corrected
    pub renamed_to: Option<PathBuf>,
}

impl ProcessingOutcome {
    pub fn no_match(sidecar_path: PathBuf) -> Self {
        Self {
            sidecar_path,
            asset_path: None,
            status: ProcessingStatus::NoMatch,
            error: None,
            failed_stage: None,
            updates: Vec::new(),
            renamed_to: None,
        }
    }

    pub fn errored(
        sidecar_path: PathBuf,
        asset_path: Option<PathBuf>,
        stage: PipelineStage,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sidecar_path,
            asset_path,
            status: ProcessingStatus::Errored,
            error: Some(message.into()),
            failed_stage: Some(stage),
            updates: Vec::new(),
            renamed_to: None,
        }
    }

    pub fn completed(
        sidecar_path: PathBuf,
        asset_path: PathBuf,
        updates: Vec<FieldUpdate>,
        renamed_to: Option<PathBuf>,
    ) -> Self {
        let status = if updates.is_empty() && renamed_to.is_none() {
            ProcessingStatus::NoChangeNeeded
        } else {
            ProcessingStatus::Updated
        };
        Self {
            sidecar_path,
            asset_path: Some(asset_path),
            status,
            error: None,
            failed_stage: None,
            updates,
            renamed_to,
        }
    }

    /// Path shown in reports: the asset when known, else the sidecar
    pub fn display_path(&self) -> &Path {
        self.asset_path.as_deref().unwrap_or(&self.sidecar_path)
    }
}

/// Aggregate of a batch run
///
/// Mutated only by the orchestrator's aggregation loop.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub total: usize,
    pub updated: usize,
    pub no_change: usize,
    pub no_match: usize,
    pub errored: usize,
    pub outcomes: Vec<ProcessingOutcome>,
    /// Every asset path claimed by a sidecar
    pub matched_paths: HashSet<PathBuf>,
    pub dry_run: bool,
}

impl BatchResult {
    pub fn new(total: usize, dry_run: bool) -> Self {
        Self {
            total,
            dry_run,
            ..Default::default()
        }
    }

    /// Fold one finished outcome into the aggregate
    pub fn record(&mut self, outcome: ProcessingOutcome) {
        match outcome.status {
            ProcessingStatus::Updated => self.updated += 1,
            ProcessingStatus::NoChangeNeeded => self.no_change += 1,
            ProcessingStatus::NoMatch => self.no_match += 1,
            ProcessingStatus::Errored => self.errored += 1,
        }

        if let Some(path) = &outcome.asset_path {
            self.matched_paths.insert(path.clone());
        }

        self.outcomes.push(outcome);
    }

    /// Outcomes recorded so far
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ProcessingStatus::Errored)
    }

    /// Total tag writes across all outcomes
    pub fn update_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.updates.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{tags, FieldUpdate};

    #[test]
    fn test_completed_status_depends_on_changes() {
        let unchanged = ProcessingOutcome::completed("a.json".into(), "a".into(), vec![], None);
        assert_eq!(unchanged.status, ProcessingStatus::NoChangeNeeded);

        let renamed = ProcessingOutcome::completed(
            "a.json".into(),
            "a.jpg".into(),
            vec![],
            Some("a.jpg".into()),
        );
        assert_eq!(renamed.status, ProcessingStatus::Updated);

        let written = ProcessingOutcome::completed(
            "a.json".into(),
            "a".into(),
            vec![FieldUpdate::assign(tags::CREATE_DATE, "x")],
            None,
        );
        assert_eq!(written.status, ProcessingStatus::Updated);
    }

    #[test]
    fn test_record_counts_and_matched_paths() {
        let mut result = BatchResult::new(4, false);
        result.record(ProcessingOutcome::no_match("x.json".into()));
        result.record(ProcessingOutcome::completed("a.json".into(), "a".into(), vec![], None));
        result.record(ProcessingOutcome::errored(
            "b.json".into(),
            Some("b".into()),
            PipelineStage::Matched,
            "boom",
        ));

        assert_eq!(result.completed(), 3);
        assert_eq!(result.no_match, 1);
        assert_eq!(result.no_change, 1);
        assert_eq!(result.errored, 1);
        assert_eq!(result.matched_paths.len(), 2);
        assert!(result.matched_paths.contains(Path::new("b")));
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn test_display_path_falls_back_to_sidecar() {
        let outcome = ProcessingOutcome::no_match("x.json".into());
        assert_eq!(outcome.display_path(), Path::new("x.json"));
    }
}
