//! Asset inspection
//!
//! Combines the embedded fields reported by the metadata tool with a
//! content-type sniff from magic bytes. Read-only.

use crate::models::MediaAsset;
use crate::services::exiftool::{MetadataTool, ToolError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Inspection errors
#[derive(Debug, Error)]
pub enum InspectError {
    /// Reading the file header failed
    #[error("Failed to read {0}: {1}")]
    Sniff(PathBuf, String),

    /// Metadata tool failed
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Sniff the MIME type from file content
///
/// Returns `None` for content `infer` does not recognise.
pub async fn sniff_content_type(path: &Path) -> Result<Option<String>, InspectError> {
    let owned = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || infer::get_from_path(&owned))
        .await
        .map_err(|e| InspectError::Sniff(path.to_path_buf(), format!("Task join error: {}", e)))?;

    result
        .map(|kind| kind.map(|k| k.mime_type().to_string()))
        .map_err(|e| InspectError::Sniff(path.to_path_buf(), e.to_string()))
}

/// Reads the current state of an asset
#[derive(Clone)]
pub struct AssetInspector {
    tool: Arc<dyn MetadataTool>,
}

impl AssetInspector {
    pub fn new(tool: Arc<dyn MetadataTool>) -> Self {
        Self { tool }
    }

    /// Inspect `path`: content type plus embedded fields
    pub async fn inspect(&self, path: &Path) -> Result<MediaAsset, InspectError> {
        let content_type = sniff_content_type(path).await?;
        let embedded = self.tool.read(path).await?;

        tracing::debug!(
            file = %path.display(),
            content_type = ?content_type,
            has_capture_date = embedded.has_capture_date(),
            has_gps = embedded.has_gps(),
            keywords = embedded.keywords.len(),
            "Inspected asset"
        );

        Ok(MediaAsset::new(path.to_path_buf(), content_type, embedded))
    }
}

impl std::fmt::Debug for AssetInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetInspector").finish_non_exhaustive()
    }
}
