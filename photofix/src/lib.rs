//! photofix library interface
//!
//! Backfills embedded metadata of an exported photo library from its JSON
//! sidecars. The binaries are thin wrappers around [`BatchOrchestrator`] and
//! [`QuarantineManager`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::{CliOverrides, RunConfig};
pub use crate::error::{PipelineError, Result, RunError};
pub use crate::services::{BatchOrchestrator, QuarantineManager};
