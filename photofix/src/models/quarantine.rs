//! Orphans and quarantine bookkeeping

use std::path::PathBuf;

/// Holding directory at the library root; mirrors relative paths
pub const TRASH_DIR: &str = "_trash";

/// Asset on disk with no sidecar outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanRecord {
    pub path: PathBuf,
    /// `.mov`/`.mp4`, eligible for quarantine
    pub live_video: bool,
}

/// One relocation into (or out of) the holding directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineMove {
    pub original_path: PathBuf,
    pub trashed_path: PathBuf,
}

/// A move that could not be carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMove {
    pub entry: QuarantineMove,
    pub error: String,
}

/// Result of a quarantine pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuarantineReport {
    /// Files moved (or that would be moved in dry-run)
    pub moved: Vec<QuarantineMove>,
    /// Destination already occupied; left in place
    pub skipped: Vec<QuarantineMove>,
    /// Stat or move failed; left in place
    pub failed: Vec<FailedMove>,
}

/// Result of a restore pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: Vec<QuarantineMove>,
    /// Live location already occupied; left in the holding directory
    pub conflicts: Vec<QuarantineMove>,
    pub failed: Vec<FailedMove>,
}
