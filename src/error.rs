//! Flow-terminating conditions.
//!
//! Everything else travels as `anyhow::Error`; these variants exist so `main`
//! can pick an exit code by downcasting.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NasError {
    /// The user typed `q`/`quit`, declined to continue, closed stdin, or hit
    /// Ctrl-C.  Exits 0.
    #[error("operation cancelled by user")]
    Cancelled,

    #[error("required tools not found: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error("invalid selection: '{0}'")]
    InvalidSelection(String),

    #[error("source folder does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("no destinations found (no mounted disks and no rclone remotes)")]
    NoDestinations,

    #[error("no backups were completed; check the log: {}", .0.display())]
    NoBackups(PathBuf),
}

impl NasError {
    /// Process exit code for this condition.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled => 0,
            _ => 1,
        }
    }
}
