//! Simple strategy: plain incremental mirror with rclone.
//!
//! ```text
//! sub-path prompt → lsd target → [exists? merge or _duplicated_<date>]
//!                 → confirm → copy --update → summary
//! ```

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::{Local, NaiveDate};

use super::{BackupResult, Job};
use crate::{
    exec::Executor,
    prompt::Prompter,
    runner::{build_copy_args, build_lsd_args},
    ui::{icon_info, icon_warn},
};

const SUMMARY_KEYWORDS: [&str; 3] = ["Transferred", "Errors", "Checks"];
const SUMMARY_MAX: usize = 3;
const NO_SUMMARY: &str = "No summary available.";

/// Copy target for `job` before any duplicate handling.
pub fn target_path(job: &Job<'_>, subpath: &str) -> String {
    job.destination
        .target(job.media_root, subpath, &format!("{}_backup", job.normalized), "")
}

/// Sibling target used instead of merging into an existing folder.
pub fn duplicate_target(target: &str, today: NaiveDate) -> String {
    format!("{target}_duplicated_{}", today.format("%Y%m%d"))
}

/// The last [`SUMMARY_MAX`] lines mentioning a transfer statistic, or a
/// placeholder when rclone printed none.
pub fn summarize(lines: &[String]) -> Vec<String> {
    let matching: Vec<&String> = lines
        .iter()
        .filter(|l| SUMMARY_KEYWORDS.iter().any(|k| l.contains(k)))
        .collect();
    if matching.is_empty() {
        return vec![NO_SUMMARY.to_string()];
    }
    let skip = matching.len().saturating_sub(SUMMARY_MAX);
    matching[skip..].iter().map(|l| (*l).clone()).collect()
}

pub fn back_up<E: Executor, R: BufRead, W: Write>(
    job: &Job<'_>,
    exec: &E,
    prompt: &mut Prompter<R, W>,
) -> Result<Option<BackupResult>> {
    let subpath = prompt.custom_destination_path(job.default_subpath)?;
    let mut target = target_path(job, &subpath);
    let name = &job.destination.name;
    let sync = &job.tools.sync;

    let (exists, _) = exec.probe(&build_lsd_args(sync, &target), &[]);
    if exists {
        prompt.say(&format!(
            "{} A folder for '{}_backup' already exists at the destination.",
            icon_warn(),
            job.normalized
        ))?;
        if !prompt.confirm("Do you want to merge/update files into it? (N creates a duplicated folder)")? {
            target = duplicate_target(&target, Local::now().date_naive());
            let leaf = target.rsplit(['/', ':']).next().unwrap_or(&target);
            prompt.say(&format!("{} A new folder will be used: {leaf}", icon_info()))?;
        }
    }

    if !prompt.confirm(&format!("Proceed with simple copy to {name}?"))? {
        return Ok(None);
    }

    let copy = exec.stream(
        &format!("Simple copy to {name}"),
        &build_copy_args(sync, job.source, &target),
        &[],
    );
    if !copy.success {
        return Ok(None);
    }

    Ok(Some(BackupResult {
        destination: target,
        summary: summarize(&copy.lines),
    }))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
