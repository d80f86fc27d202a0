//! Error types for photofix
//!
//! Per-file failures ([`PipelineError`]) end up as `Errored` outcomes and never
//! abort the batch. Only [`RunError`] stops a run.

use crate::services::asset_inspector::InspectError;
use crate::services::file_matcher::MatchError;
use crate::services::file_scanner::ScanError;
use crate::services::metadata_writer::WriteError;
use crate::services::planner::PlanError;
use crate::services::preflight::PreflightError;
use crate::services::quarantine::QuarantineError;
use crate::services::sidecar_parser::SidecarError;
use thiserror::Error;

/// Failure of one sidecar's pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Sidecar(#[from] SidecarError),

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Failure that stops the whole run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Quarantine(#[from] QuarantineError),

    #[error(transparent)]
    Config(#[from] photofix_common::Error),

    /// Blocking traversal task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RunError>;
