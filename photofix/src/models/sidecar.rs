//! Sidecar metadata record
//!
//! One JSON sidecar per media asset, written by the export tool. Only the
//! fields used for reconciliation are kept; everything else is ignored.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;

/// Timestamp as written by the export tool
///
/// `formatted` is the human-readable string, `timestamp` the epoch seconds
/// (the export tool writes it as a JSON string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarTime {
    pub timestamp: Option<i64>,
    pub formatted: String,
}

impl SidecarTime {
    /// Resolve to a UTC instant
    ///
    /// The formatted string wins; the epoch value is the fallback for
    /// formats (e.g. localized month names) that do not parse. An epoch of
    /// zero or less is the export tool's "no value" and never resolves.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        parse_formatted(&self.formatted).or_else(|| {
            self.timestamp
                .filter(|t| *t > 0)
                .and_then(|t| DateTime::from_timestamp(t, 0))
        })
    }
}

/// Parse the export tool's formatted timestamp
///
/// Accepted: RFC 3339 (`2020-01-01T10:00:00Z`), the Takeout English form
/// (`Jan 1, 2020, 10:00:00 AM UTC`, with or without narrow no-break spaces)
/// and a plain `2020-01-01 10:00:00` taken as UTC.
pub fn parse_formatted(formatted: &str) -> Option<DateTime<Utc>> {
    let trimmed = formatted.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let normalized: String = trimmed
        .chars()
        .map(|c| if c == '\u{202f}' || c == '\u{a0}' { ' ' } else { c })
        .collect();
    let normalized = normalized.strip_suffix(" UTC").unwrap_or(&normalized);

    const NAIVE_FORMATS: [&str; 3] = [
        "%b %d, %Y, %I:%M:%S %p",
        "%Y-%m-%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Geolocation from the sidecar
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPoint {
    /// The export tool writes `0.0, 0.0` when no location is known
    pub fn is_known(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}

/// Parsed sidecar
///
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarRecord {
    /// Path of the sidecar file itself
    pub source_path: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `photoTakenTime`
    pub captured_at: SidecarTime,
    /// `creationTime` (upload time in the export)
    pub created_at: SidecarTime,
    /// Known location, if any
    pub geo: Option<GeoPoint>,
    /// Tagged people, in sidecar order
    pub people: Vec<String>,
    pub favorited: bool,
}
