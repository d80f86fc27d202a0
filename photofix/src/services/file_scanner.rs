//! Library traversal
//!
//! Three views of the same walk: sidecars to process, orphaned assets left
//! after the main pass, and stray exiftool temp files. The `_trash` holding
//! directory at the root is never entered.

use crate::models::asset::is_live_video;
use crate::models::{OrphanRecord, TRASH_DIR};
use crate::services::exiftool::TEMP_FILE_SUFFIX;
use crate::services::file_matcher::is_sidecar;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Result of removing stray temp files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempCleanup {
    /// Removed (or, in dry-run, found) files
    pub removed: Vec<PathBuf>,
    /// Files that could not be removed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Library scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    ignore_names: Vec<String>,
}

impl FileScanner {
    /// Create a scanner that skips OS litter (.DS_Store, Thumbs.db, ...)
    pub fn new() -> Self {
        Self {
            ignore_names: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                "desktop.ini".to_string(),
                ".git".to_string(),
            ],
        }
    }

    /// All sidecar files under `root`, sorted
    pub fn scan_sidecars(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let mut sidecars: Vec<PathBuf> = self
            .walk_files(root)?
            .into_iter()
            .filter(|p| is_sidecar(p))
            .collect();
        sidecars.sort();

        tracing::debug!(root = %root.display(), count = sidecars.len(), "Found sidecars");
        Ok(sidecars)
    }

    /// Assets no sidecar claimed
    ///
    /// Excludes sidecars, exiftool temp files and every path in `matched`.
    pub fn scan_orphans(
        &self,
        root: &Path,
        matched: &HashSet<PathBuf>,
    ) -> Result<Vec<OrphanRecord>, ScanError> {
        let mut orphans: Vec<OrphanRecord> = self
            .walk_files(root)?
            .into_iter()
            .filter(|p| !is_sidecar(p) && !is_temp_file(p) && !matched.contains(p))
            .map(|path| OrphanRecord {
                live_video: is_live_video(&path),
                path,
            })
            .collect();
        orphans.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(
            root = %root.display(),
            count = orphans.len(),
            live_videos = orphans.iter().filter(|o| o.live_video).count(),
            "Found orphans"
        );
        Ok(orphans)
    }

    /// Leftover `*_exiftool_tmp` files from interrupted writes
    pub fn scan_temp_files(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        Ok(self
            .walk_files(root)?
            .into_iter()
            .filter(|p| is_temp_file(p))
            .collect())
    }

    /// Regular files under `root`, skipping the holding directory
    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        Ok(files)
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();

        if entry.depth() == 1 && entry.file_type().is_dir() && file_name == TRASH_DIR {
            return false;
        }

        !self.ignore_names.iter().any(|name| *name == file_name)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(TEMP_FILE_SUFFIX))
}

/// Delete stray temp files; in dry-run only report them
pub async fn remove_temp_files(paths: Vec<PathBuf>, dry_run: bool) -> TempCleanup {
    let mut cleanup = TempCleanup::default();

    for path in paths {
        if dry_run {
            tracing::info!(file = %path.display(), "Would remove exiftool temp file (dry run)");
            cleanup.removed.push(path);
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "Removed exiftool temp file");
                cleanup.removed.push(path);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Cannot remove temp file");
                cleanup.failed.push((path, e.to_string()));
            }
        }
    }

    cleanup
}
