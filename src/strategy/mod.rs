//! Backup strategies — one function per action kind, run once per
//! destination.
//!
//! | Strategy           | Tool   | Target leaf              | Summary lines        |
//! |--------------------|--------|--------------------------|----------------------|
//! | [`secure::back_up`] | restic | `<name>_encrypted`       | files/dirs/snapshot  |
//! | [`simple::back_up`] | rclone | `<name>_backup`          | Transferred/Checks   |
//!
//! Both return `Ok(None)` when this destination did not complete (declined,
//! or a command failed); the orchestrator then stops.  `Err` is reserved for
//! session-ending conditions such as the user quitting.

pub mod secure;
pub mod simple;

use std::path::Path;

use crate::{config::ToolsConfig, destination::Destination};

/// A completed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResult {
    /// Repository path/URI or copy target actually written to.
    pub destination: String,
    /// Short lines pulled from the tool's own output.
    pub summary: Vec<String>,
}

/// Everything a strategy needs to know about one destination.
#[derive(Debug, Clone, Copy)]
pub struct Job<'a> {
    pub source: &'a Path,
    pub normalized: &'a str,
    pub destination: &'a Destination,
    pub media_root: &'a Path,
    pub tools: &'a ToolsConfig,
    /// Offered at the sub-path prompt.
    pub default_subpath: &'a str,
}
