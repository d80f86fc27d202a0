//! Sidecar JSON parsing
//!
//! Reads the export tool's per-asset JSON into a [`SidecarRecord`]. Unknown
//! fields are ignored; `photoTakenTime` and `creationTime` are required.

use crate::models::{GeoPoint, SidecarRecord, SidecarTime};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Sidecar parsing errors
#[derive(Debug, Error)]
pub enum SidecarError {
    /// Could not read the file
    #[error("Failed to read sidecar: {0}")]
    Read(#[from] std::io::Error),

    /// Content is not valid sidecar JSON
    #[error("Malformed sidecar JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Required object missing
    #[error("Sidecar is missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSidecar {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    photo_taken_time: Option<RawTime>,
    #[serde(default)]
    creation_time: Option<RawTime>,
    #[serde(default)]
    geo_data: Option<GeoPoint>,
    #[serde(default)]
    geo_data_exif: Option<GeoPoint>,
    #[serde(default)]
    people: Option<Vec<RawPerson>>,
    #[serde(default)]
    favorited: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawTime {
    /// Epoch seconds; a JSON string in real exports, a number in some tools
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
    #[serde(default)]
    formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    name: String,
}

impl RawTime {
    fn into_sidecar_time(self) -> SidecarTime {
        let timestamp = match self.timestamp {
            Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(serde_json::Value::Number(n)) => n.as_i64(),
            _ => None,
        };
        SidecarTime {
            timestamp,
            formatted: self.formatted.unwrap_or_default(),
        }
    }
}

/// Parse sidecar content
///
/// `source_path` is recorded on the result; nothing is read from it.
pub fn parse_sidecar(source_path: &Path, content: &str) -> Result<SidecarRecord, SidecarError> {
    let raw: RawSidecar = serde_json::from_str(content)?;

    let captured_at = raw
        .photo_taken_time
        .ok_or(SidecarError::MissingField("photoTakenTime"))?
        .into_sidecar_time();
    let created_at = raw
        .creation_time
        .ok_or(SidecarError::MissingField("creationTime"))?
        .into_sidecar_time();

    // geoData is zeroed for some uploads that still carry EXIF-derived coordinates
    let geo = raw
        .geo_data
        .filter(GeoPoint::is_known)
        .or_else(|| raw.geo_data_exif.filter(GeoPoint::is_known));

    let people = raw
        .people
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Ok(SidecarRecord {
        source_path: source_path.to_path_buf(),
        title: raw.title,
        description: raw.description.filter(|d| !d.is_empty()),
        captured_at,
        created_at,
        geo,
        people,
        favorited: raw.favorited.unwrap_or(false),
    })
}

/// Read and parse a sidecar file
pub async fn read_sidecar(path: &Path) -> Result<SidecarRecord, SidecarError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_sidecar(path, &content)
}
