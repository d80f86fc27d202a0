//! Live-video quarantine
//!
//! Orphaned `.mov`/`.mp4` companions are moved to `<root>/_trash`, keeping
//! their path relative to the root, so every move can be undone. Nothing is
//! ever deleted and an occupied destination is never overwritten.

use crate::models::{
    FailedMove, OrphanRecord, QuarantineMove, QuarantineReport, RestoreReport, TRASH_DIR,
};
use crate::services::file_matcher::expected_asset_path;
use crate::services::file_scanner::{FileScanner, ScanError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Quarantine errors
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// Path is not below the library root
    #[error("{0} is outside the library root")]
    OutsideRoot(PathBuf),

    /// Filesystem operation failed
    #[error("{op} {path} failed: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Library traversal failed
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl QuarantineError {
    fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        QuarantineError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Moves files into and out of the holding directory
#[derive(Debug, Clone)]
pub struct QuarantineManager {
    root: PathBuf,
    dry_run: bool,
}

impl QuarantineManager {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// `<root>/_trash`
    pub fn trash_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIR)
    }

    /// Holding location for a live path
    pub fn trashed_path(&self, original: &Path) -> Result<PathBuf, QuarantineError> {
        let relative = original
            .strip_prefix(&self.root)
            .map_err(|_| QuarantineError::OutsideRoot(original.to_path_buf()))?;
        Ok(self.trash_dir().join(relative))
    }

    /// Move every live-video orphan into the holding directory
    ///
    /// Other orphans are left alone. In dry-run the report lists the moves
    /// that would happen.
    pub async fn quarantine(
        &self,
        orphans: &[OrphanRecord],
    ) -> Result<QuarantineReport, QuarantineError> {
        let mut report = QuarantineReport::default();

        for orphan in orphans.iter().filter(|o| o.live_video) {
            let entry = QuarantineMove {
                original_path: orphan.path.clone(),
                trashed_path: self.trashed_path(&orphan.path)?,
            };

            match self.quarantine_one(&entry).await {
                Ok(true) => report.moved.push(entry),
                Ok(false) => report.skipped.push(entry),
                Err(e) => {
                    tracing::warn!(file = %entry.original_path.display(), error = %e, "Quarantine failed");
                    report.failed.push(FailedMove {
                        entry,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Returns `false` when the destination is occupied
    async fn quarantine_one(&self, entry: &QuarantineMove) -> Result<bool, QuarantineError> {
        if exists(&entry.trashed_path).await? {
            tracing::warn!(
                file = %entry.original_path.display(),
                trashed = %entry.trashed_path.display(),
                "Quarantine destination exists, leaving file in place"
            );
            return Ok(false);
        }

        if self.dry_run {
            tracing::info!(file = %entry.original_path.display(), "Would quarantine live video (dry run)");
        } else {
            move_file(&entry.original_path, &entry.trashed_path).await?;
            tracing::info!(
                file = %entry.original_path.display(),
                trashed = %entry.trashed_path.display(),
                "Quarantined live video"
            );
        }
        Ok(true)
    }

    /// Undo an explicit list of moves
    pub async fn restore_moves(
        &self,
        moves: &[QuarantineMove],
    ) -> Result<RestoreReport, QuarantineError> {
        let mut report = RestoreReport::default();

        for entry in moves {
            self.restore_one(entry.clone(), &mut report).await;
        }

        self.prune_trash().await;
        Ok(report)
    }

    /// Bring back every quarantined file that a sidecar claims
    ///
    /// Recovers assets that were quarantined by mistake, e.g. because their
    /// sidecar was added after the run.
    pub async fn restore_from_sidecars(&self) -> Result<RestoreReport, QuarantineError> {
        let root = self.root.clone();
        let sidecars = tokio::task::spawn_blocking(move || FileScanner::new().scan_sidecars(&root))
            .await
            .map_err(|e| QuarantineError::io("Scan", &self.root, std::io::Error::other(e)))??;

        let mut report = RestoreReport::default();
        for sidecar in sidecars {
            let original_path = expected_asset_path(&sidecar);
            let trashed_path = self.trashed_path(&original_path)?;

            // Stat errors fall through to try_restore, which records them
            if tokio::fs::try_exists(&trashed_path).await.unwrap_or(true) {
                let entry = QuarantineMove {
                    original_path,
                    trashed_path,
                };
                self.restore_one(entry, &mut report).await;
            }
        }

        self.prune_trash().await;
        Ok(report)
    }

    /// Move everything in the holding directory back to its mirrored path
    pub async fn restore_all(&self) -> Result<RestoreReport, QuarantineError> {
        let trash = self.trash_dir();
        let mut report = RestoreReport::default();
        if !exists(&trash).await? {
            return Ok(report);
        }

        let mut moves = Vec::new();
        for entry in WalkDir::new(&trash).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&trash) {
                moves.push(QuarantineMove {
                    original_path: self.root.join(relative),
                    trashed_path: entry.path().to_path_buf(),
                });
            }
        }

        for entry in moves {
            self.restore_one(entry, &mut report).await;
        }

        self.prune_trash().await;
        Ok(report)
    }

    async fn restore_one(&self, entry: QuarantineMove, report: &mut RestoreReport) {
        match self.try_restore(&entry).await {
            Ok(Restored::Moved) => report.restored.push(entry),
            Ok(Restored::Conflict) => report.conflicts.push(entry),
            Ok(Restored::Missing) => {}
            Err(e) => {
                tracing::warn!(file = %entry.trashed_path.display(), error = %e, "Restore failed");
                report.failed.push(FailedMove {
                    entry,
                    error: e.to_string(),
                });
            }
        }
    }

    async fn try_restore(&self, entry: &QuarantineMove) -> Result<Restored, QuarantineError> {
        if !exists(&entry.trashed_path).await? {
            tracing::debug!(file = %entry.trashed_path.display(), "Nothing to restore");
            return Ok(Restored::Missing);
        }

        if exists(&entry.original_path).await? {
            tracing::warn!(
                file = %entry.original_path.display(),
                "Live path occupied, leaving quarantined copy"
            );
            return Ok(Restored::Conflict);
        }

        if self.dry_run {
            tracing::info!(file = %entry.original_path.display(), "Would restore (dry run)");
        } else {
            move_file(&entry.trashed_path, &entry.original_path).await?;
            tracing::info!(file = %entry.original_path.display(), "Restored from quarantine");
        }
        Ok(Restored::Moved)
    }

    /// Remove empty directories inside the holding area, then the area itself
    async fn prune_trash(&self) {
        let trash = self.trash_dir();
        if self.dry_run || !tokio::fs::try_exists(&trash).await.unwrap_or(false) {
            return;
        }

        let dirs: Vec<PathBuf> = WalkDir::new(&trash)
            .follow_links(false)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();

        for dir in dirs {
            // Non-empty directories fail to remove and are kept
            if tokio::fs::remove_dir(&dir).await.is_ok() {
                tracing::debug!(dir = %dir.display(), "Pruned empty directory");
            }
        }
    }
}

enum Restored {
    Moved,
    Conflict,
    Missing,
}

async fn exists(path: &Path) -> Result<bool, QuarantineError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| QuarantineError::io("Stat", path, e))
}

async fn move_file(from: &Path, to: &Path) -> Result<(), QuarantineError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| QuarantineError::io("Create directory", parent, e))?;
    }
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| QuarantineError::io("Move", from, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel.as_bytes()).unwrap();
        path
    }

    fn orphan(path: PathBuf, live_video: bool) -> OrphanRecord {
        OrphanRecord { path, live_video }
    }

    #[tokio::test]
    async fn test_quarantine_mirrors_relative_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let clip = touch(root, "2020/clip.MOV");
        let note = touch(root, "notes.txt");

        let manager = QuarantineManager::new(root, false);
        let report = manager
            .quarantine(&[orphan(clip.clone(), true), orphan(note.clone(), false)])
            .await
            .unwrap();

        assert_eq!(report.moved.len(), 1);
        assert_eq!(report.moved[0].trashed_path, root.join("_trash/2020/clip.MOV"));
        assert!(!clip.exists());
        assert!(root.join("_trash/2020/clip.MOV").exists());
        assert!(note.exists());
    }

    #[tokio::test]
    async fn test_quarantine_skips_occupied_destination() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let clip = touch(root, "clip.mov");
        touch(root, "_trash/clip.mov");

        let manager = QuarantineManager::new(root, false);
        let report = manager.quarantine(&[orphan(clip.clone(), true)]).await.unwrap();

        assert!(report.moved.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(clip.exists());
    }

    #[tokio::test]
    async fn test_dry_run_moves_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let clip = touch(root, "clip.mp4");

        let manager = QuarantineManager::new(root, true);
        let report = manager.quarantine(&[orphan(clip.clone(), true)]).await.unwrap();

        assert_eq!(report.moved.len(), 1);
        assert!(clip.exists());
        assert!(!root.join(TRASH_DIR).exists());
    }

    #[tokio::test]
    async fn test_round_trip_leaves_no_residue() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let clip = touch(root, "a/b/clip.mov");

        let manager = QuarantineManager::new(root, false);
        let report = manager.quarantine(&[orphan(clip.clone(), true)]).await.unwrap();
        let restored = manager.restore_moves(&report.moved).await.unwrap();

        assert_eq!(restored.restored.len(), 1);
        assert_eq!(fs::read(&clip).unwrap(), b"a/b/clip.mov");
        assert!(!root.join(TRASH_DIR).exists());
    }

    #[tokio::test]
    async fn test_restore_from_sidecars() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "2020/IMG_1.MP4.json");
        touch(root, "_trash/2020/IMG_1.MP4");
        touch(root, "_trash/2020/other.mov");

        let manager = QuarantineManager::new(root, false);
        let report = manager.restore_from_sidecars().await.unwrap();

        assert_eq!(report.restored.len(), 1);
        assert!(root.join("2020/IMG_1.MP4").exists());
        assert!(root.join("_trash/2020/other.mov").exists());
    }

    #[tokio::test]
    async fn test_restore_conflict_keeps_both() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "IMG_1.MP4.json");
        touch(root, "IMG_1.MP4");
        touch(root, "_trash/IMG_1.MP4");

        let manager = QuarantineManager::new(root, false);
        let report = manager.restore_from_sidecars().await.unwrap();

        assert!(report.restored.is_empty());
        assert_eq!(report.conflicts.len(), 1);
        assert!(root.join("_trash/IMG_1.MP4").exists());
    }

    #[tokio::test]
    async fn test_restore_all() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "_trash/x/clip.mov");
        touch(root, "_trash/top.mp4");

        let manager = QuarantineManager::new(root, false);
        let report = manager.restore_all().await.unwrap();

        assert_eq!(report.restored.len(), 2);
        assert!(root.join("x/clip.mov").exists());
        assert!(root.join("top.mp4").exists());
        assert!(!root.join(TRASH_DIR).exists());
    }

    #[test]
    fn test_path_outside_root_rejected() {
        let manager = QuarantineManager::new("/lib", false);
        assert!(matches!(
            manager.trashed_path(Path::new("/elsewhere/clip.mov")),
            Err(QuarantineError::OutsideRoot(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_move_does_not_stop_the_pass() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let blocked = touch(root, "2020/clip.mov");
        let free = touch(root, "2021/clip2.mov");
        // A plain file where the mirrored directory should go
        touch(root, "_trash/2020");

        let manager = QuarantineManager::new(root, false);
        let report = manager
            .quarantine(&[orphan(blocked.clone(), true), orphan(free.clone(), true)])
            .await
            .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].entry.original_path, blocked);
        assert_eq!(report.moved.len(), 1);
        assert!(blocked.exists());
        assert!(!free.exists());
        assert!(root.join("_trash/2021/clip2.mov").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_restore_does_not_stop_the_pass() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "_trash/a/clip.mov");
        touch(root, "_trash/b/clip2.mov");
        // Restoring a/clip.mov needs a directory where a file sits
        touch(root, "a");

        let manager = QuarantineManager::new(root, false);
        let report = manager.restore_all().await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].entry.original_path, root.join("a/clip.mov"));
        assert_eq!(report.restored.len(), 1);
        assert!(root.join("b/clip2.mov").exists());
        assert!(root.join("_trash/a/clip.mov").exists());
    }
}
