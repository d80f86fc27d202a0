//! Media asset state as seen by the inspector

use std::path::{Path, PathBuf};

/// Extensions treated as movie containers for date backfill
pub const MOVIE_EXTENSIONS: [&str; 3] = ["mp4", "m4v", "mov"];

/// Extensions quarantined as live-photo video companions
pub const LIVE_VIDEO_EXTENSIONS: [&str; 2] = ["mov", "mp4"];

/// Embedded metadata currently stored in the asset
///
/// `None` means the tool reported no value (sentinels already normalised).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedMetadata {
    pub date_time_original: Option<String>,
    pub create_date: Option<String>,
    /// `QuickTime:CreateDate` (movies)
    pub quicktime_create_date: Option<String>,
    /// `Keys:CreationDate` (movies)
    pub keys_creation_date: Option<String>,
    pub gps_latitude: Option<String>,
    pub gps_longitude: Option<String>,
    pub gps_altitude: Option<String>,
    pub keywords: Vec<String>,
}

impl EmbeddedMetadata {
    /// True when any capture date the planner backfills is already present
    pub fn has_capture_date(&self) -> bool {
        self.date_time_original.is_some()
            || self.quicktime_create_date.is_some()
            || self.keys_creation_date.is_some()
    }

    /// True when either GPS coordinate is present
    pub fn has_gps(&self) -> bool {
        self.gps_latitude.is_some() || self.gps_longitude.is_some()
    }

    /// Case-sensitive keyword membership
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

/// Media file resolved from a sidecar, with its inspected state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub path: PathBuf,
    /// Lowercased extension without the dot (empty when none)
    pub extension: String,
    /// MIME type sniffed from file content
    pub content_type: Option<String>,
    pub embedded: EmbeddedMetadata,
}

impl MediaAsset {
    pub fn new(path: PathBuf, content_type: Option<String>, embedded: EmbeddedMetadata) -> Self {
        let extension = lowercase_extension(&path);
        Self {
            path,
            extension,
            content_type,
            embedded,
        }
    }

    pub fn is_movie(&self) -> bool {
        MOVIE_EXTENSIONS.contains(&self.extension.as_str())
    }

    /// Content is JPEG but the name says otherwise
    pub fn is_misnamed_jpeg(&self) -> bool {
        self.content_type.as_deref() == Some("image/jpeg")
            && !matches!(self.extension.as_str(), "jpg" | "jpeg")
    }
}

/// Lowercased extension of `path`, empty when it has none
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// `.mov` / `.mp4`, case-insensitive
pub fn is_live_video(path: &Path) -> bool {
    LIVE_VIDEO_EXTENSIONS.contains(&lowercase_extension(path).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let asset = MediaAsset::new(
            PathBuf::from("/lib/IMG_1.HEIC"),
            None,
            EmbeddedMetadata::default(),
        );
        assert_eq!(asset.extension, "heic");
        assert!(!asset.is_movie());
    }

    #[test]
    fn test_misnamed_jpeg() {
        let heic = MediaAsset::new(
            PathBuf::from("a.HEIC"),
            Some("image/jpeg".to_string()),
            EmbeddedMetadata::default(),
        );
        assert!(heic.is_misnamed_jpeg());

        let jpeg = MediaAsset::new(
            PathBuf::from("a.JPEG"),
            Some("image/jpeg".to_string()),
            EmbeddedMetadata::default(),
        );
        assert!(!jpeg.is_misnamed_jpeg());

        let png = MediaAsset::new(
            PathBuf::from("a.png"),
            Some("image/png".to_string()),
            EmbeddedMetadata::default(),
        );
        assert!(!png.is_misnamed_jpeg());
    }

    #[test]
    fn test_live_video_detection() {
        assert!(is_live_video(Path::new("clip.MOV")));
        assert!(is_live_video(Path::new("clip.mp4")));
        assert!(!is_live_video(Path::new("clip.m4v")));
        assert!(!is_live_video(Path::new("noext")));
    }
}
