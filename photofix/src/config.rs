//! Resolved run configuration
//!
//! Command-line values override the TOML file, which overrides built-in
//! defaults. The engine only ever sees a [`RunConfig`].

use crate::services::metadata_writer::WriterOptions;
use crate::services::planner::PlannerOptions;
use photofix_common::config::{TomlConfig, DEFAULT_EXIFTOOL, DEFAULT_THREADS};
use photofix_common::{Error, Result};
use std::path::PathBuf;

/// Values given on the command line
///
/// Boolean flags can only switch a feature on; `false` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub root: PathBuf,
    pub people: bool,
    pub remove_live_video: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub threads: Option<usize>,
    pub exiftool: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Library root
    pub root: PathBuf,
    /// Add tagged people as keywords
    pub people: bool,
    /// Quarantine orphaned live-photo videos
    pub quarantine_live_videos: bool,
    pub verbose: bool,
    /// Inspect and plan only
    pub dry_run: bool,
    /// Sidecars processed concurrently (always > 0)
    pub concurrency: usize,
    /// Also write FileCreateDate
    pub file_create_date: bool,
    /// Set the modification time to the capture instant
    pub sync_file_times: bool,
    /// exiftool executable
    pub exiftool: PathBuf,
}

impl RunConfig {
    /// Configuration with built-in defaults for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            people: false,
            quarantine_live_videos: false,
            verbose: false,
            dry_run: false,
            concurrency: DEFAULT_THREADS,
            file_create_date: !cfg!(target_os = "linux"),
            sync_file_times: true,
            exiftool: PathBuf::from(DEFAULT_EXIFTOOL),
        }
    }

    /// Merge command-line values over the TOML file
    pub fn resolve(cli: CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let concurrency = cli.threads.unwrap_or_else(|| toml.threads_or_default());
        if concurrency == 0 {
            return Err(Error::InvalidInput(
                "threads must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            root: cli.root,
            people: cli.people || toml.people.unwrap_or(false),
            quarantine_live_videos: cli.remove_live_video || toml.remove_live_video.unwrap_or(false),
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            concurrency,
            file_create_date: toml
                .file_create_date
                .unwrap_or(!cfg!(target_os = "linux")),
            sync_file_times: toml.sync_file_times.unwrap_or(true),
            exiftool: cli.exiftool.unwrap_or_else(|| toml.exiftool_or_default()),
        })
    }

    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            people: self.people,
            file_create_date: self.file_create_date,
        }
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            dry_run: self.dry_run,
            sync_file_times: self.sync_file_times,
        }
    }
}
