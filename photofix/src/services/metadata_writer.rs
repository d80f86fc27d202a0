//! Applies reconciliation plans
//!
//! Order per asset: rename, one tool write with every update, then the
//! modification-time sync. Each step is exposed separately so the caller can
//! record which stage failed.

use crate::models::{FieldUpdate, Rename};
use crate::services::exiftool::{MetadataTool, ToolError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Write errors
#[derive(Debug, Error)]
pub enum WriteError {
    /// Rename destination already exists
    #[error("Cannot rename to {0}: destination exists")]
    RenameConflict(PathBuf),

    /// Filesystem operation failed
    #[error("{op} {path} failed: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Metadata tool failed
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl WriteError {
    fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        WriteError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writer switches taken from the run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Plan only: no rename, write or time sync
    pub dry_run: bool,
    /// Set the modification time to the capture instant
    pub sync_file_times: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            sync_file_times: true,
        }
    }
}

/// Applies renames and tag updates
#[derive(Clone)]
pub struct MetadataWriter {
    tool: Arc<dyn MetadataTool>,
    options: WriterOptions,
}

impl MetadataWriter {
    pub fn new(tool: Arc<dyn MetadataTool>, options: WriterOptions) -> Self {
        Self { tool, options }
    }

    pub fn options(&self) -> WriterOptions {
        self.options
    }

    /// Move `rename.from` to `rename.to`, refusing to clobber
    pub async fn rename(&self, rename: &Rename) -> Result<(), WriteError> {
        if self.options.dry_run {
            tracing::info!(
                from = %rename.from.display(),
                to = %rename.to.display(),
                "Would rename (dry run)"
            );
            return Ok(());
        }

        match tokio::fs::symlink_metadata(&rename.to).await {
            Ok(_) => return Err(WriteError::RenameConflict(rename.to.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(WriteError::io("Stat", &rename.to, e)),
        }

        tokio::fs::rename(&rename.from, &rename.to)
            .await
            .map_err(|e| WriteError::io("Rename", &rename.from, e))?;

        tracing::info!(
            from = %rename.from.display(),
            to = %rename.to.display(),
            "Renamed JPEG with wrong extension"
        );
        Ok(())
    }

    /// Apply every update in a single tool invocation
    ///
    /// Returns the tool output, or `None` when nothing was written.
    pub async fn write(
        &self,
        path: &Path,
        updates: &[FieldUpdate],
    ) -> Result<Option<String>, WriteError> {
        if updates.is_empty() {
            return Ok(None);
        }

        if self.options.dry_run {
            tracing::info!(
                file = %path.display(),
                updates = %join_updates(updates),
                "Would write (dry run)"
            );
            return Ok(None);
        }

        let output = self.tool.write(path, updates).await?;
        tracing::debug!(
            file = %path.display(),
            updates = %join_updates(updates),
            output = %output,
            "Wrote metadata"
        );
        Ok(Some(output))
    }

    /// Set the modification time of `path` to `captured_at`
    ///
    /// Returns whether the time was changed.
    pub async fn sync_file_time(
        &self,
        path: &Path,
        captured_at: DateTime<Utc>,
    ) -> Result<bool, WriteError> {
        if self.options.dry_run || !self.options.sync_file_times {
            return Ok(false);
        }

        let owned = path.to_path_buf();
        let mtime = SystemTime::from(captured_at);

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let file = std::fs::OpenOptions::new().write(true).open(&owned)?;
            file.set_modified(mtime)
        })
        .await
        .map_err(|e| WriteError::io("Set modification time", path, std::io::Error::other(e)))?
        .map_err(|e| WriteError::io("Set modification time", path, e))?;

        tracing::trace!(file = %path.display(), mtime = %captured_at, "Synced file time");
        Ok(true)
    }
}

impl std::fmt::Debug for MetadataWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataWriter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn join_updates(updates: &[FieldUpdate]) -> String {
    updates
        .iter()
        .map(FieldUpdate::to_arg)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{tags, EmbeddedMetadata};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records write calls; optionally fails them
    #[derive(Default)]
    struct RecordingTool {
        calls: Mutex<Vec<(PathBuf, Vec<FieldUpdate>)>>,
        fail: bool,
    }

    #[async_trait]
    impl MetadataTool for RecordingTool {
        async fn read(&self, _path: &Path) -> Result<EmbeddedMetadata, ToolError> {
            Ok(EmbeddedMetadata::default())
        }

        async fn write(&self, path: &Path, updates: &[FieldUpdate]) -> Result<String, ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_path_buf(), updates.to_vec()));
            if self.fail {
                Err(ToolError::Failed {
                    code: Some(1),
                    stderr: "Error: Not a valid JPG".to_string(),
                })
            } else {
                Ok("1 image files updated".to_string())
            }
        }
    }

    fn writer(tool: Arc<RecordingTool>, dry_run: bool) -> MetadataWriter {
        MetadataWriter::new(
            tool,
            WriterOptions {
                dry_run,
                sync_file_times: true,
            },
        )
    }

    fn updates() -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::assign(tags::DATE_TIME_ORIGINAL, "2020:01:01 10:00:00+00:00"),
            FieldUpdate::assign(tags::CREATE_DATE, "2020:01:01 10:00:00+00:00"),
        ]
    }

    #[tokio::test]
    async fn test_single_invocation_for_all_updates() {
        let tool = Arc::new(RecordingTool::default());
        let writer = writer(tool.clone(), false);

        let output = writer.write(Path::new("/lib/a.jpg"), &updates()).await.unwrap();

        assert_eq!(output.as_deref(), Some("1 image files updated"));
        let calls = tool.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_update_list_is_noop() {
        let tool = Arc::new(RecordingTool::default());
        let writer = writer(tool.clone(), false);

        assert!(writer.write(Path::new("/lib/a.jpg"), &[]).await.unwrap().is_none());
        assert!(tool.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_skips_tool() {
        let tool = Arc::new(RecordingTool::default());
        let writer = writer(tool.clone(), true);

        assert!(writer.write(Path::new("/lib/a.jpg"), &updates()).await.unwrap().is_none());
        assert!(tool.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tool_failure_carries_stderr() {
        let tool = Arc::new(RecordingTool {
            fail: true,
            ..Default::default()
        });
        let writer = writer(tool, false);

        let err = writer.write(Path::new("/lib/a.jpg"), &updates()).await.unwrap_err();
        assert!(err.to_string().contains("Not a valid JPG"));
    }

    #[tokio::test]
    async fn test_rename_moves_file() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("IMG_1.HEIC");
        let to = temp.path().join("IMG_1.HEIC.jpg");
        fs::write(&from, b"jpeg").unwrap();

        let writer = writer(Arc::new(RecordingTool::default()), false);
        writer
            .rename(&Rename {
                from: from.clone(),
                to: to.clone(),
            })
            .await
            .unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn test_rename_refuses_to_clobber() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("IMG_1.HEIC");
        let to = temp.path().join("IMG_1.HEIC.jpg");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"existing").unwrap();

        let writer = writer(Arc::new(RecordingTool::default()), false);
        let result = writer.rename(&Rename { from: from.clone(), to: to.clone() }).await;

        assert!(matches!(result, Err(WriteError::RenameConflict(p)) if p == to));
        assert_eq!(fs::read(&to).unwrap(), b"existing");
        assert!(from.exists());
    }

    #[tokio::test]
    async fn test_dry_run_rename_leaves_file() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("IMG_1.HEIC");
        fs::write(&from, b"jpeg").unwrap();

        let writer = writer(Arc::new(RecordingTool::default()), true);
        writer
            .rename(&Rename {
                from: from.clone(),
                to: temp.path().join("IMG_1.HEIC.jpg"),
            })
            .await
            .unwrap();

        assert!(from.exists());
    }

    #[tokio::test]
    async fn test_sync_file_time() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();
        let captured_at = DateTime::from_timestamp(1_577_872_800, 0).unwrap();

        let writer = writer(Arc::new(RecordingTool::default()), false);
        assert!(writer.sync_file_time(&path, captured_at).await.unwrap());

        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified, SystemTime::from(captured_at));
    }

    #[tokio::test]
    async fn test_sync_file_time_disabled() {
        let tool = Arc::new(RecordingTool::default());
        let writer = MetadataWriter::new(
            tool,
            WriterOptions {
                dry_run: false,
                sync_file_times: false,
            },
        );
        let captured_at = DateTime::from_timestamp(0, 0).unwrap();

        assert!(!writer
            .sync_file_time(Path::new("/nonexistent/a.jpg"), captured_at)
            .await
            .unwrap());
    }
}
