//! Destination discovery, selection, ordering and target-path construction.
//!
//! Two kinds of destination exist:
//!
//! | Kind    | Discovered from                          | Identifier        |
//! |---------|------------------------------------------|-------------------|
//! | `Disk`  | subdirectories of the media root         | mount-point name  |
//! | `Cloud` | `rclone listremotes`                     | remote name       |
//!
//! The final list is always ordered disks first, so the faster local copy is
//! attempted before the cloud upload even if the cloud was picked first.

use std::{
    fmt,
    io::{BufRead, Write},
    path::Path,
};

use anyhow::Result;
use console::style;

use crate::{
    error::NasError,
    exec,
    prompt::Prompter,
    ui::{icon_info, icon_ok, icon_warn},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DestinationKind {
    Disk,
    Cloud,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub kind: DestinationKind,
    pub name: String,
}

impl Destination {
    pub fn disk(name: impl Into<String>) -> Self {
        Self {
            kind: DestinationKind::Disk,
            name: name.into(),
        }
    }

    pub fn cloud(name: impl Into<String>) -> Self {
        Self {
            kind: DestinationKind::Cloud,
            name: name.into(),
        }
    }

    /// Build the final target for this destination.
    ///
    /// - disk:  `<media_root>/<disk>/<subpath>/<leaf>`
    /// - cloud: `<cloud_prefix><remote>:<subpath>/<leaf>`
    ///
    /// `cloud_prefix` is `"rclone:"` when the string is handed to the backup
    /// engine (its rclone backend) and empty when handed to rclone itself.
    pub fn target(&self, media_root: &Path, subpath: &str, leaf: &str, cloud_prefix: &str) -> String {
        match self.kind {
            DestinationKind::Cloud => format!("{cloud_prefix}{}:{subpath}/{leaf}", self.name),
            DestinationKind::Disk => media_root
                .join(&self.name)
                .join(subpath)
                .join(leaf)
                .to_string_lossy()
                .into_owned(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DestinationKind::Disk => write!(f, "External Disk: {}", self.name),
            DestinationKind::Cloud => write!(f, "Cloud Remote: {}", self.name),
        }
    }
}

// ─── Discovery ────────────────────────────────────────────────────────────────

/// Subdirectory names of `media_root`, sorted.  A missing or unreadable root
/// means "no disks".
pub fn list_disks(media_root: &Path) -> Vec<String> {
    list_subdirectories(media_root)
}

/// Sorted names of the directories directly inside `dir`; empty when `dir`
/// cannot be read.
pub fn list_subdirectories(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "directory not readable");
            return Vec::new();
        },
    };

    let mut disks: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    disks.sort();
    disks
}

/// Arguments for `rclone listremotes`.
pub fn build_listremotes_args(sync: &str) -> Vec<String> {
    vec![sync.into(), "listremotes".into()]
}

/// Parse `rclone listremotes` output (`name:` per line) into bare names.
pub fn parse_remotes(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.strip_suffix(':').unwrap_or(l).to_string())
        .collect()
}

/// Ask rclone for its configured remotes, warning when there are none.
pub fn list_remotes(sync: &str) -> Vec<String> {
    println!("{} Checking rclone configuration...", icon_info());
    let (ok, stdout) = exec::run_silent(&build_listremotes_args(sync), &[]);
    let remotes = if ok { parse_remotes(&stdout) } else { Vec::new() };

    if remotes.is_empty() {
        println!("\n{} Rclone has no configured cloud remotes.", icon_warn());
    } else {
        println!("{} Rclone is configured.", icon_ok());
    }
    remotes
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// All candidates in menu order: disks first, then remotes.
pub fn candidates(disks: &[String], remotes: &[String]) -> Vec<Destination> {
    disks
        .iter()
        .map(Destination::disk)
        .chain(remotes.iter().map(Destination::cloud))
        .collect()
}

/// Prompt for the primary destination.  An invalid answer is fatal.
pub fn select_primary<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    disks: &[String],
    remotes: &[String],
) -> Result<Destination> {
    let options = candidates(disks, remotes);
    if options.is_empty() {
        return Err(NasError::NoDestinations.into());
    }

    prompt.say(&format!("\n{}", style("💾 Select PRIMARY destination:").bold()))?;
    prompt.say(&format!(
        "{} To add more cloud options, first run: {}",
        icon_info(),
        style("rclone config").bold()
    ))?;
    for (i, dest) in options.iter().enumerate() {
        let line = format!("{}) {dest}", i + 1);
        let line = match dest.kind {
            DestinationKind::Disk => style(line).green(),
            DestinationKind::Cloud => style(line).blue(),
        };
        prompt.say(&line.to_string())?;
    }

    let choice = prompt.input("Select a destination", "")?;
    pick(&options, &choice)
        .cloned()
        .ok_or_else(|| NasError::InvalidSelection(choice).into())
}

/// Offer one extra destination of the other kind.  Declining, having no
/// candidates, or an invalid answer all yield `None`; only the last warns.
pub fn select_secondary<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    primary: &Destination,
    disks: &[String],
    remotes: &[String],
) -> Result<Option<Destination>> {
    let (names, kind, question, heading, item) = match primary.kind {
        DestinationKind::Disk => (
            remotes,
            DestinationKind::Cloud,
            "Also back up to a cloud remote?",
            "☁️ Select SECONDARY cloud destination:",
            "Select a cloud remote",
        ),
        DestinationKind::Cloud => (
            disks,
            DestinationKind::Disk,
            "Also back up to an external disk?",
            "💽 Select SECONDARY disk destination:",
            "Select a disk",
        ),
    };

    if names.is_empty() || !prompt.confirm(question)? {
        return Ok(None);
    }

    prompt.say(&format!("\n{}", style(heading).bold()))?;
    for (i, name) in names.iter().enumerate() {
        prompt.say(&format!("{}) {name}", i + 1))?;
    }

    let choice = prompt.input(item, "")?;
    match pick(names, &choice) {
        Some(name) => Ok(Some(Destination {
            kind,
            name: name.clone(),
        })),
        None => {
            prompt.say(&format!("{} Invalid selection. Skipping.", icon_warn()))?;
            Ok(None)
        },
    }
}

/// 1-based menu lookup.
fn pick<'a, T>(items: &'a [T], choice: &str) -> Option<&'a T> {
    let n: usize = choice.trim().parse().ok()?;
    n.checked_sub(1).and_then(|i| items.get(i))
}

/// Stable re-sort that puts every disk ahead of every cloud remote.
pub fn order_destinations(mut dests: Vec<Destination>) -> Vec<Destination> {
    dests.sort_by_key(|d| d.kind);
    dests
}

// ─── Tests ────────────────────────────────────────────────────────────────────
