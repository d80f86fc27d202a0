//! Data models for photofix
//!
//! - Sidecar records and the inspected asset state
//! - Field updates and plans
//! - Per-sidecar outcomes and the batch aggregate
//! - Orphan and quarantine bookkeeping

pub mod asset;
pub mod outcome;
pub mod plan;
pub mod quarantine;
pub mod sidecar;

pub use asset::{EmbeddedMetadata, MediaAsset};
pub use outcome::{BatchResult, PipelineStage, ProcessingOutcome, ProcessingStatus};
pub use plan::{tags, FieldUpdate, ReconciliationPlan, Rename, UpdateOp};
pub use quarantine::{
    FailedMove, OrphanRecord, QuarantineMove, QuarantineReport, RestoreReport, TRASH_DIR,
};
pub use sidecar::{GeoPoint, SidecarRecord, SidecarTime};
