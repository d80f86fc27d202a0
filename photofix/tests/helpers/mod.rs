//! Shared test helpers
//!
//! - `FakeTool`: in-memory metadata store standing in for exiftool
//! - Library fixture builders (sidecars, JPEG/PNG/movie files)
//! - `CollectingReporter`: records outcomes in completion order

#![allow(dead_code)]

use async_trait::async_trait;
use photofix::models::{tags, EmbeddedMetadata, FieldUpdate, ProcessingOutcome, UpdateOp};
use photofix::services::{MetadataTool, Reporter, ToolError};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const JPEG_BYTES: [u8; 12] = [
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01,
];

pub const PNG_BYTES: [u8; 16] = [
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// In-memory metadata tool
///
/// Reads fail for paths that do not exist on disk, like the real tool. Writes
/// apply the same semantics exiftool gives `=`, `-=` and `+=`.
#[derive(Default)]
pub struct FakeTool {
    store: Mutex<HashMap<PathBuf, EmbeddedMetadata>>,
    writes: Mutex<Vec<(PathBuf, Vec<FieldUpdate>)>>,
    failing: Mutex<HashSet<PathBuf>>,
    panicking: Mutex<HashSet<PathBuf>>,
    vanishing: Mutex<HashSet<PathBuf>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate embedded fields for `path`
    pub fn seed(&self, path: &Path, metadata: EmbeddedMetadata) {
        self.store
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), metadata);
    }

    /// Make every write to `path` fail
    pub fn fail_writes_for(&self, path: &Path) {
        self.failing.lock().unwrap().insert(path.to_path_buf());
    }

    /// Make every read of `path` panic
    pub fn panic_on_read(&self, path: &Path) {
        self.panicking.lock().unwrap().insert(path.to_path_buf());
    }

    /// Delete `path` from disk right after a successful write
    pub fn remove_after_write(&self, path: &Path) {
        self.vanishing.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn metadata(&self, path: &Path) -> EmbeddedMetadata {
        self.store
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn writes(&self) -> Vec<(PathBuf, Vec<FieldUpdate>)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

fn apply(metadata: &mut EmbeddedMetadata, update: &FieldUpdate) {
    let value = Some(update.value.clone());
    match (update.tag, update.op) {
        (tags::DATE_TIME_ORIGINAL, UpdateOp::Assign) => metadata.date_time_original = value,
        (tags::CREATE_DATE, UpdateOp::Assign) => metadata.create_date = value,
        (tags::QUICKTIME_CREATE_DATE, UpdateOp::Assign) => {
            metadata.quicktime_create_date = value.clone();
            // QuickTime:CreateDate is what a plain CreateDate read reports for movies
            metadata.create_date = value;
        }
        (tags::KEYS_CREATION_DATE, UpdateOp::Assign) => metadata.keys_creation_date = value,
        (tags::GPS_LATITUDE, UpdateOp::Assign) => metadata.gps_latitude = value,
        (tags::GPS_LONGITUDE, UpdateOp::Assign) => metadata.gps_longitude = value,
        (tags::GPS_ALTITUDE, UpdateOp::Assign) => metadata.gps_altitude = value,
        (tags::KEYWORDS, UpdateOp::Remove) => metadata.keywords.retain(|k| *k != update.value),
        (tags::KEYWORDS, UpdateOp::Append) => metadata.keywords.push(update.value.clone()),
        _ => {}
    }
}

#[async_trait]
impl MetadataTool for FakeTool {
    async fn read(&self, path: &Path) -> Result<EmbeddedMetadata, ToolError> {
        if self.panicking.lock().unwrap().contains(path) {
            panic!("simulated tool crash for {}", path.display());
        }
        if !path.exists() {
            return Err(ToolError::Failed {
                code: Some(1),
                stderr: format!("Error: File not found - {}", path.display()),
            });
        }
        Ok(self.metadata(path))
    }

    async fn write(&self, path: &Path, updates: &[FieldUpdate]) -> Result<String, ToolError> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), updates.to_vec()));

        if self.failing.lock().unwrap().contains(path) {
            return Err(ToolError::Failed {
                code: Some(1),
                stderr: "Error: Not a valid JPG (looks more like a PNG)".to_string(),
            });
        }

        {
            let mut store = self.store.lock().unwrap();
            let metadata = store.entry(path.to_path_buf()).or_default();
            for update in updates {
                apply(metadata, update);
            }
        }

        if self.vanishing.lock().unwrap().contains(path) {
            std::fs::remove_file(path).unwrap();
        }
        Ok("    1 image files updated".to_string())
    }
}

/// Sidecar contents for a fixture
#[derive(Debug, Clone)]
pub struct SidecarFixture {
    pub taken: String,
    pub created: String,
    pub geo: Option<(f64, f64, f64)>,
    pub people: Vec<String>,
}

impl Default for SidecarFixture {
    fn default() -> Self {
        Self {
            taken: "2020-01-01T10:00:00Z".to_string(),
            created: "2020-01-02T08:30:00Z".to_string(),
            geo: None,
            people: Vec::new(),
        }
    }
}

impl SidecarFixture {
    pub fn to_json(&self) -> String {
        let (lat, lon, alt) = self.geo.unwrap_or((0.0, 0.0, 0.0));
        let mut value = json!({
            "title": "fixture",
            "description": "",
            "imageViews": "0",
            "creationTime": { "timestamp": "0", "formatted": self.created },
            "photoTakenTime": { "timestamp": "0", "formatted": self.taken },
            "geoData": {
                "latitude": lat, "longitude": lon, "altitude": alt,
                "latitudeSpan": 0.0, "longitudeSpan": 0.0
            },
            "geoDataExif": {
                "latitude": 0.0, "longitude": 0.0, "altitude": 0.0,
                "latitudeSpan": 0.0, "longitudeSpan": 0.0
            }
        });
        if !self.people.is_empty() {
            value["people"] = self
                .people
                .iter()
                .map(|name| json!({ "name": name }))
                .collect();
        }
        value.to_string()
    }
}

/// Write `<dir>/<sidecar_name>` with the fixture's JSON
pub fn write_sidecar(dir: &Path, sidecar_name: &str, fixture: &SidecarFixture) -> PathBuf {
    let path = dir.join(sidecar_name);
    write_file(&path, fixture.to_json().as_bytes());
    path
}

/// Write a file, creating parent directories
pub fn write_file(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
    path.to_path_buf()
}

pub fn write_jpeg(path: &Path) -> PathBuf {
    write_file(path, &JPEG_BYTES)
}

pub fn write_png(path: &Path) -> PathBuf {
    write_file(path, &PNG_BYTES)
}

/// Records every outcome handed to the reporter
#[derive(Default)]
pub struct CollectingReporter {
    pub started: Mutex<Option<usize>>,
    pub seen: Mutex<Vec<(PathBuf, usize, usize)>>,
}

impl Reporter for CollectingReporter {
    fn on_start(&self, total: usize) {
        *self.started.lock().unwrap() = Some(total);
    }

    fn on_outcome(&self, outcome: &ProcessingOutcome, completed: usize, total: usize) {
        self.seen
            .lock()
            .unwrap()
            .push((outcome.sidecar_path.clone(), completed, total));
    }
}
