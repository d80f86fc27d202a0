//! External metadata tool (exiftool) invocation
//!
//! Read mode:
//! `exiftool -n -T -d "%Y-%m-%d %H:%M:%S%z" -sep ";" -<tags...> <file>`
//! prints one tab-separated line in tag order, `-` for missing values.
//!
//! Write mode:
//! `exiftool -overwrite_original_in_place -P -<Tag>=<value>... <file>`
//! exits non-zero with diagnostics on stderr on failure.

use crate::models::{tags, EmbeddedMetadata, FieldUpdate};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Tags requested in read mode, in output order
pub const READ_TAGS: [&str; 8] = [
    tags::DATE_TIME_ORIGINAL,
    tags::CREATE_DATE,
    tags::QUICKTIME_CREATE_DATE,
    tags::KEYS_CREATION_DATE,
    tags::GPS_LATITUDE,
    tags::GPS_LONGITUDE,
    tags::GPS_ALTITUDE,
    tags::KEYWORDS,
];

/// Date format passed with `-d`
pub const READ_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// List separator passed with `-sep`
pub const LIST_SEPARATOR: char = ';';

/// Suffix exiftool gives its temporary files; left behind by interrupted writes
pub const TEMP_FILE_SUFFIX: &str = "_exiftool_tmp";

/// Tool invocation errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Executable not found
    #[error("{0} not found; install exiftool or pass --exiftool")]
    NotFound(String),

    /// Process could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit
    #[error("exiftool exited with {}: {stderr}", describe_exit(.code))]
    Failed { code: Option<i32>, stderr: String },

    /// Output did not match the requested tag layout
    #[error("Unexpected exiftool output: {0}")]
    UnexpectedOutput(String),
}

/// Reads and writes embedded metadata
///
/// The production implementation shells out to exiftool; tests substitute an
/// in-memory store.
#[async_trait]
pub trait MetadataTool: Send + Sync {
    /// Current embedded fields of `path`
    async fn read(&self, path: &Path) -> Result<EmbeddedMetadata, ToolError>;

    /// Apply all `updates` to `path` in one invocation, returning tool output
    async fn write(&self, path: &Path, updates: &[FieldUpdate]) -> Result<String, ToolError>;
}

/// exiftool subprocess client
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the executable resolves (PATH lookup or explicit path)
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    async fn run(&self, args: Vec<OsString>) -> Result<String, ToolError> {
        let program = self.program.display().to_string();

        tracing::trace!(program = %program, args = ?args, "Running exiftool");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound(program.clone())
                } else {
                    ToolError::Spawn {
                        program: program.clone(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::Failed {
                code: output.status.code(),
                stderr: if stderr.is_empty() {
                    "failed to execute command".to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\r', '\n'])
            .to_string())
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new(photofix_common::config::DEFAULT_EXIFTOOL)
    }
}

#[async_trait]
impl MetadataTool for ExifTool {
    async fn read(&self, path: &Path) -> Result<EmbeddedMetadata, ToolError> {
        let stdout = self.run(read_args(path)).await?;
        parse_read_output(&stdout)
    }

    async fn write(&self, path: &Path, updates: &[FieldUpdate]) -> Result<String, ToolError> {
        self.run(write_args(path, updates)).await
    }
}

/// Arguments for read mode
pub fn read_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-n".into(),
        "-T".into(),
        "-d".into(),
        READ_DATE_FORMAT.into(),
        "-sep".into(),
        LIST_SEPARATOR.to_string().into(),
    ];
    args.extend(READ_TAGS.iter().map(|tag| OsString::from(format!("-{}", tag))));
    args.push(path.as_os_str().to_os_string());
    args
}

/// Arguments for write mode
pub fn write_args(path: &Path, updates: &[FieldUpdate]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-overwrite_original_in_place".into(), "-P".into()];
    args.extend(updates.iter().map(|u| OsString::from(u.to_arg())));
    args.push(path.as_os_str().to_os_string());
    args
}

/// Parse the tab-separated read-mode line
pub fn parse_read_output(stdout: &str) -> Result<EmbeddedMetadata, ToolError> {
    let line = stdout.lines().next().unwrap_or("");
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != READ_TAGS.len() {
        return Err(ToolError::UnexpectedOutput(format!(
            "expected {} fields, got {}: {:?}",
            READ_TAGS.len(),
            fields.len(),
            line
        )));
    }

    let date = |i: usize| normalize(fields[i]).filter(|v| !is_zero_date(v));
    let value = |i: usize| normalize(fields[i]);

    let keywords: Vec<String> = value(7)
        .map(|list| {
            list.split(LIST_SEPARATOR)
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(EmbeddedMetadata {
        date_time_original: date(0),
        create_date: date(1),
        quicktime_create_date: date(2),
        keys_creation_date: date(3),
        gps_latitude: value(4),
        gps_longitude: value(5),
        gps_altitude: value(6),
        keywords,
    })
}

/// Map the tool's "no value" sentinels to `None`
fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `0000:00:00 00:00:00` and friends
fn is_zero_date(value: &str) -> bool {
    value.contains('0') && value.chars().all(|c| c == '0' || ":- T+.Z".contains(c))
}
