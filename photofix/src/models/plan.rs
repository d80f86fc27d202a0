//! Field updates and reconciliation plans

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

/// Tag names understood by exiftool
pub mod tags {
    pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
    pub const CREATE_DATE: &str = "CreateDate";
    pub const QUICKTIME_CREATE_DATE: &str = "QuickTime:CreateDate";
    pub const KEYS_CREATION_DATE: &str = "Keys:CreationDate";
    pub const FILE_CREATE_DATE: &str = "FileCreateDate";
    pub const GPS_LATITUDE: &str = "GPSLatitude";
    pub const GPS_LATITUDE_REF: &str = "GPSLatitudeRef";
    pub const GPS_LONGITUDE: &str = "GPSLongitude";
    pub const GPS_LONGITUDE_REF: &str = "GPSLongitudeRef";
    pub const GPS_ALTITUDE: &str = "GPSAltitude";
    pub const GPS_ALTITUDE_REF: &str = "GPSAltitudeRef";
    pub const KEYWORDS: &str = "Keywords";

    /// Date tags the planner may assign
    pub const DATE_TAGS: [&str; 5] = [
        DATE_TIME_ORIGINAL,
        CREATE_DATE,
        QUICKTIME_CREATE_DATE,
        KEYS_CREATION_DATE,
        FILE_CREATE_DATE,
    ];

    /// GPS tags, always written as a group
    pub const GPS_TAGS: [&str; 6] = [
        GPS_LATITUDE,
        GPS_LATITUDE_REF,
        GPS_LONGITUDE,
        GPS_LONGITUDE_REF,
        GPS_ALTITUDE,
        GPS_ALTITUDE_REF,
    ];
}

/// How a value is applied to a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    /// `-Tag=value`
    Assign,
    /// `-Tag-=value` (list tags)
    Remove,
    /// `-Tag+=value` (list tags)
    Append,
}

impl UpdateOp {
    fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Assign => "=",
            UpdateOp::Remove => "-=",
            UpdateOp::Append => "+=",
        }
    }
}

/// One tag write
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldUpdate {
    pub tag: &'static str,
    pub op: UpdateOp,
    pub value: String,
}

impl FieldUpdate {
    pub fn assign(tag: &'static str, value: impl Into<String>) -> Self {
        Self {
            tag,
            op: UpdateOp::Assign,
            value: value.into(),
        }
    }

    pub fn remove(tag: &'static str, value: impl Into<String>) -> Self {
        Self {
            tag,
            op: UpdateOp::Remove,
            value: value.into(),
        }
    }

    pub fn append(tag: &'static str, value: impl Into<String>) -> Self {
        Self {
            tag,
            op: UpdateOp::Append,
            value: value.into(),
        }
    }

    /// Command-line form, e.g. `-DateTimeOriginal=2020:01:01 10:00:00+00:00`
    pub fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}{}{}", self.tag, self.op.as_str(), self.value)
    }
}

/// Extension correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Planner output for one asset
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationPlan {
    /// Pending rename, applied before writing
    pub rename: Option<Rename>,
    /// Ordered tag writes (possibly empty)
    pub updates: Vec<FieldUpdate>,
    /// Capture instant, used to sync the file modification time
    pub captured_at: Option<DateTime<Utc>>,
}

impl ReconciliationPlan {
    /// Path the writer targets once the rename is applied
    pub fn target_path<'a>(&'a self, current: &'a Path) -> &'a Path {
        self.rename.as_ref().map(|r| r.to.as_path()).unwrap_or(current)
    }

    /// Nothing to rename and nothing to write
    pub fn is_noop(&self) -> bool {
        self.rename.is_none() && self.updates.is_empty()
    }
}
