//! Pre-flight checks
//!
//! The only fatal conditions of a run: the root must exist, be a directory,
//! be listable and (unless dry-run) writable. A missing exiftool is reported
//! but not fatal; per-file reads then fail individually.

use crate::services::exiftool::ExifTool;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal pre-flight failures
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("Directory not found: {0}")]
    RootMissing(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied for {path}: {reason}")]
    PermissionDenied { path: PathBuf, reason: String },
}

/// Non-fatal findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    /// Canonical root
    pub root: PathBuf,
    pub tool_available: bool,
}

/// Validate the root and probe the tool
pub fn check(root: &Path, dry_run: bool, tool: &ExifTool) -> Result<PreflightReport, PreflightError> {
    let canonical = check_root(root, dry_run)?;

    let tool_available = tool.is_available();
    if !tool_available {
        tracing::warn!(
            program = %tool.program().display(),
            "exiftool not found; every file will fail at inspection"
        );
    }

    tracing::debug!(root = %canonical.display(), dry_run, tool_available, "Pre-flight passed");

    Ok(PreflightReport {
        root: canonical,
        tool_available,
    })
}

/// Validate the root directory only, returning its canonical path
pub fn check_root(root: &Path, dry_run: bool) -> Result<PathBuf, PreflightError> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PreflightError::RootMissing(root.to_path_buf()),
        _ => PreflightError::PermissionDenied {
            path: root.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    if !metadata.is_dir() {
        return Err(PreflightError::NotADirectory(root.to_path_buf()));
    }

    let canonical = root
        .canonicalize()
        .map_err(|e| permission_denied(root, e))?;

    std::fs::read_dir(&canonical).map_err(|e| permission_denied(&canonical, e))?;

    if !dry_run {
        // Dropped immediately; removes itself
        tempfile::Builder::new()
            .prefix(".photofix-probe")
            .tempfile_in(&canonical)
            .map_err(|e| permission_denied(&canonical, e))?;
    }

    Ok(canonical)
}

fn permission_denied(path: &Path, e: std::io::Error) -> PreflightError {
    PreflightError::PermissionDenied {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
