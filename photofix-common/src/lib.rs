//! # photofix common library
//!
//! Shared code for the photofix binaries:
//! - Error type for configuration and I/O failures
//! - TOML bootstrap configuration loading
//! - Logging initialisation
//! - Human-readable elapsed time formatting

pub mod config;
pub mod error;
pub mod human_time;
pub mod logging;

pub use error::{Error, Result};
