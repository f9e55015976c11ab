//! Command argument construction helpers.
//!
//! This module is responsible for *building* the argument lists handed to
//! restic and rclone.  Nothing here executes; process execution lives in
//! [`crate::exec`], where the spinner owns the terminal.
//!
//! Every function here is pure, so the exact invocations are locked down with
//! unit and snapshot tests without either tool installed.  Arguments are
//! discrete strings; paths containing spaces or quotes pass through intact.

use std::path::Path;

/// Environment variable restic reads the repository password from.
pub const PASSWORD_ENV: &str = "RESTIC_PASSWORD";

// ─── restic ───────────────────────────────────────────────────────────────────

/// `<engine> --repo <repo>`, the prefix of every restic call.
pub fn restic_base(engine: &str, repo: &str) -> Vec<String> {
    vec![engine.into(), "--repo".into(), repo.into()]
}

/// `snapshots --latest 1`: cheap probe that fails when no repository exists.
pub fn build_probe_args(engine: &str, repo: &str) -> Vec<String> {
    let mut cmd = restic_base(engine, repo);
    cmd.extend(["snapshots".into(), "--latest".into(), "1".into()]);
    cmd
}

pub fn build_init_args(engine: &str, repo: &str) -> Vec<String> {
    let mut cmd = restic_base(engine, repo);
    cmd.push("init".into());
    cmd
}

pub fn build_backup_args(engine: &str, repo: &str, source: &Path) -> Vec<String> {
    let mut cmd = restic_base(engine, repo);
    cmd.extend([
        "backup".into(),
        source.to_string_lossy().into_owned(),
        "--verbose".into(),
    ]);
    cmd
}

// ─── rclone ───────────────────────────────────────────────────────────────────

/// `lsd <target>`: succeeds when the target folder already exists.
pub fn build_lsd_args(sync: &str, target: &str) -> Vec<String> {
    vec![sync.into(), "lsd".into(), target.into()]
}

/// Incremental, non-destructive copy: newer destination files are kept,
/// nothing is deleted, empty source directories are created.
pub fn build_copy_args(sync: &str, source: &Path, target: &str) -> Vec<String> {
    vec![
        sync.into(),
        "copy".into(),
        source.to_string_lossy().into_owned(),
        target.into(),
        "--progress".into(),
        "--update".into(),
        "--create-empty-src-dirs".into(),
    ]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
