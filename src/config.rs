//! Configuration types and loading logic.
//!
//! `Config` is a direct 1-to-1 mapping of `config.toml`.  Every section has a
//! `Default` impl so the file is entirely optional; a fresh machine with
//! `restic` and `rclone` on `PATH` needs no configuration at all.
//!
//! # File format
//!
//! ```toml
//! [tools]
//! backup_engine = "restic"
//! sync          = "rclone"
//!
//! [paths]
//! media_root  = "/run/media/alice"   # default: /run/media/$USER
//! log_dir     = "/home/alice/logs"   # default: ~/manual_nas_logs
//! install_dir = "/home/alice/bin"    # default: ~/.local/bin
//!
//! [defaults]
//! secure_subpath = "manual_nas_encrypted"
//! simple_subpath = "manual_nas_backup"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ─── Top-level ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    /// External programs this tool drives.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Filesystem locations: media mounts, logs, self-install target.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Default sub-paths offered at the custom destination prompt.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

// ─── [tools] ──────────────────────────────────────────────────────────────────

/// Program names (looked up on `PATH`) or absolute paths.
#[derive(Debug, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// The encrypted, deduplicating backup engine.
    #[serde(default = "default_backup_engine")]
    pub backup_engine: String,

    /// The file sync tool; also used to enumerate cloud remotes.
    #[serde(default = "default_sync")]
    pub sync: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            backup_engine: default_backup_engine(),
            sync: default_sync(),
        }
    }
}

// ─── [paths] ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PathsConfig {
    /// Directory whose subdirectories are the mounted external disks.
    #[serde(default)]
    pub media_root: Option<PathBuf>,

    /// Where session logs are written.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Where `install` places the executable.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
}

impl PathsConfig {
    /// `media_root`, or `/run/media/<user>`.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("/run/media").join(current_user()))
    }

    /// `log_dir`, or `<home>/manual_nas_logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| home_dir().join("manual_nas_logs"))
    }

    /// `install_dir`, or `<home>/.local/bin`.
    pub fn install_dir(&self) -> PathBuf {
        self.install_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(".local").join("bin"))
    }
}

// ─── [defaults] ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct DefaultsConfig {
    /// Sub-path under a destination where secure repositories go.
    #[serde(default = "default_secure_subpath")]
    pub secure_subpath: String,

    /// Sub-path under a destination where simple copies go.
    #[serde(default = "default_simple_subpath")]
    pub simple_subpath: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            secure_subpath: default_secure_subpath(),
            simple_subpath: default_simple_subpath(),
        }
    }
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

// Field-level `#[serde(default = "…")]` needs free functions.

pub fn default_backup_engine() -> String {
    "restic".into()
}

pub fn default_sync() -> String {
    "rclone".into()
}

pub fn default_secure_subpath() -> String {
    "manual_nas_encrypted".into()
}

pub fn default_simple_subpath() -> String {
    "manual_nas_backup".into()
}

/// The user's home directory, falling back to `.` when it cannot be found.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve the effective username from `$USER`, then `$LOGNAME`.
pub fn current_user() -> String {
    std::env::var("USER")
        .ok()
        .or_else(|| std::env::var("LOGNAME").ok())
        .unwrap_or_else(|| "user".into())
}

/// `~/.config/manual-nas-tool/config.toml`, when a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|d| d.join("manual-nas-tool").join("config.toml"))
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read and parse a `Config` from `path`.
///
/// A missing file yields `Config::default()` silently.  Returns an error if
/// the file exists but cannot be read or is not valid TOML.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
