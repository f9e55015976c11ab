//! Per-session log file.
//!
//! One file per run at `<log_dir>/backup_<YYYYMMDD_HHMMSS>.log`.  The file is
//! opened in append mode for every write and closed again immediately, so an
//! interrupted run never leaves a handle open and a crashed run still has
//! everything up to its last completed entry.
//!
//! Each streamed command produces two entries:
//!
//! ```text
//! [14:03:07] Executing: restic --repo /run/media/alice/Backup1/... init
//! [14:03:09] Initializing repo on Backup1 - SUCCESS
//! Full Output:
//!   created restic repository 5d7d7c1a8f at /run/media/...
//! ```
//!
//! Environment overrides (the repository password) are never written.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    /// Create `log_dir` if needed and pick this session's file name from
    /// `started`.  The file itself appears on the first write.
    pub fn create(log_dir: &Path, started: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("creating log directory {}", log_dir.display()))?;
        let path = log_dir.join(format!("backup_{}.log", started.format("%Y%m%d_%H%M%S")));
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record that `command` is about to run.
    pub fn record_issue(&self, command: &str) -> Result<()> {
        self.append(&format!("[{}] Executing: {command}\n", timestamp()))
    }

    /// Record a finished command with its full output, one indented line per
    /// output line.
    pub fn record_completion(&self, label: &str, success: bool, lines: &[String]) -> Result<()> {
        let status = if success { "SUCCESS" } else { "ERROR" };
        let mut entry = format!("[{}] {label} - {status}\nFull Output:\n", timestamp());
        for line in lines {
            entry.push_str("  ");
            entry.push_str(line);
            entry.push('\n');
        }
        self.append(&entry)
    }

    fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
