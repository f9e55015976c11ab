//! Secure strategy: encrypted, versioned backup into a restic repository.
//!
//! ```text
//! sub-path prompt → probe repo → confirm (Initial|Incremental)
//!                 → [init, if Initial] → backup --verbose → summary
//! ```
//!
//! The password reaches restic only through `RESTIC_PASSWORD` on each child
//! process; it never appears in an argument list or the session log.

use std::{
    fmt,
    io::{BufRead, Write},
};

use anyhow::Result;

use super::{BackupResult, Job};
use crate::{
    exec::Executor,
    prompt::Prompter,
    runner::{PASSWORD_ENV, build_backup_args, build_init_args, build_probe_args},
    ui::icon_info,
};

/// How many trailing output lines are searched for summary keywords.
const SUMMARY_WINDOW: usize = 10;
const SUMMARY_KEYWORDS: [&str; 5] = ["files", "dirs", "added", "processed", "snapshot"];

/// Whether the repository already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Initial,
    Incremental,
}

impl BackupKind {
    /// A failed probe is treated as "no repository yet", whatever the cause.
    pub fn from_probe(repo_exists: bool) -> Self {
        if repo_exists {
            Self::Incremental
        } else {
            Self::Initial
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "Initial",
            Self::Incremental => "Incremental",
        })
    }
}

/// restic repository path for `job`.
pub fn repo_path(job: &Job<'_>, subpath: &str) -> String {
    job.destination.target(
        job.media_root,
        subpath,
        &format!("{}_encrypted", job.normalized),
        "rclone:",
    )
}

/// Lines among the last [`SUMMARY_WINDOW`] that mention any summary keyword.
pub fn summarize(lines: &[String]) -> Vec<String> {
    let skip = lines.len().saturating_sub(SUMMARY_WINDOW);
    lines[skip..]
        .iter()
        .filter(|l| {
            let lower = l.to_lowercase();
            SUMMARY_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .cloned()
        .collect()
}

pub fn back_up<E: Executor, R: BufRead, W: Write>(
    job: &Job<'_>,
    password: &str,
    exec: &E,
    prompt: &mut Prompter<R, W>,
) -> Result<Option<BackupResult>> {
    let subpath = prompt.custom_destination_path(job.default_subpath)?;
    let repo = repo_path(job, &subpath);
    let name = &job.destination.name;
    let engine = &job.tools.backup_engine;
    let env = [(PASSWORD_ENV, password)];

    prompt.say(&format!("\n{} Secure Backup Repository: {repo}", icon_info()))?;

    let (exists, _) = exec.probe(&build_probe_args(engine, &repo), &env);
    let kind = BackupKind::from_probe(exists);
    tracing::info!(%repo, %kind, "repository probed");

    if !prompt.confirm(&format!("Proceed with {kind} backup to {name}?"))? {
        return Ok(None);
    }

    if kind == BackupKind::Initial {
        let init = exec.stream(
            &format!("Initializing repo on {name}"),
            &build_init_args(engine, &repo),
            &env,
        );
        if !init.success {
            return Ok(None);
        }
    }

    let backup = exec.stream(
        &format!("{kind} backup to {name}"),
        &build_backup_args(engine, &repo, job.source),
        &env,
    );
    if !backup.success {
        return Ok(None);
    }

    Ok(Some(BackupResult {
        destination: repo,
        summary: summarize(&backup.lines),
    }))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
