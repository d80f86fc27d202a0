//! Service modules for the reconciliation pipeline
//!
//! Leaf-first: matching, parsing and inspection feed the planner, the writer
//! applies plans, the orchestrator drives batches, and the scanner and
//! quarantine manager handle what the batch leaves behind.

pub mod asset_inspector;
pub mod batch_orchestrator;
pub mod exiftool;
pub mod file_matcher;
pub mod file_scanner;
pub mod metadata_writer;
pub mod planner;
pub mod preflight;
pub mod quarantine;
pub mod reporter;
pub mod sidecar_parser;

pub use asset_inspector::{AssetInspector, InspectError};
pub use batch_orchestrator::BatchOrchestrator;
pub use exiftool::{ExifTool, MetadataTool, ToolError};
pub use file_matcher::MatchError;
pub use file_scanner::{FileScanner, ScanError, TempCleanup};
pub use metadata_writer::{MetadataWriter, WriteError, WriterOptions};
pub use planner::{PlanError, PlannerOptions};
pub use preflight::{PreflightError, PreflightReport};
pub use quarantine::{QuarantineError, QuarantineManager};
pub use reporter::{Reporter, RunReport, TracingReporter};
pub use sidecar_parser::SidecarError;
