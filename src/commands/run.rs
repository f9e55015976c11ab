//! Interactive backup session — runs when no subcommand is given.
//!
//! # Session stages (in order)
//!
//! | # | Stage              | Fails with                          |
//! |---|--------------------|-------------------------------------|
//! | 1 | Tool check         | `MissingTools`                      |
//! | 2 | Remote check       | — (warns, continues without cloud)  |
//! | 3 | Action select      | `InvalidSelection`                  |
//! | 4 | Source select      | `InvalidSelection`, `MissingSource` |
//! | 5 | Destination select | `NoDestinations`, `InvalidSelection`|
//! | 6 | Password (secure)  | —                                   |
//! | 7 | Per destination    | `NoBackups` when none completed     |
//! | 8 | Summary + install  | —                                   |
//!
//! Destinations run strictly in order and the first one that does not
//! complete stops the rest.  Results of destinations that already completed
//! are kept and reported.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Result;
use chrono::Local;
use console::style;

use crate::{
    cancel::Cancellation,
    commands::install,
    config::{self, Config, ToolsConfig},
    destination::{self, Destination, list_subdirectories},
    error::NasError,
    exec::SystemExecutor,
    logger::SessionLog,
    prompt::Prompter,
    session::{ActionKind, Session, normalized_leaf},
    strategy::{BackupResult, Job, secure, simple},
    ui::{self, icon_err, icon_info, icon_ok},
};

// ─── Entry point ──────────────────────────────────────────────────────────────

pub fn run(cfg: &Config, cancel: &Cancellation) -> Result<()> {
    let stdin = io::stdin();
    let mut prompt = Prompter::new(stdin.lock(), io::stdout());

    ui::print_banner();
    check_tools(&cfg.tools)?;
    let remotes = destination::list_remotes(&cfg.tools.sync);

    let action = select_action(&mut prompt)?;
    let source = select_source(&mut prompt, &config::home_dir())?;
    let normalized = normalized_leaf(&source);
    if !prompt.confirm(&format!(
        "\n{} Source: {}\nContinue with this folder?",
        icon_info(),
        source.display()
    ))? {
        return Err(NasError::Cancelled.into());
    }

    let media_root = cfg.paths.media_root();
    let disks = destination::list_disks(&media_root);
    let destinations = select_destinations(&mut prompt, &disks, &remotes)?;

    let log = SessionLog::create(&cfg.paths.log_dir(), Local::now())?;
    let started = Instant::now();

    let password = match action {
        ActionKind::Secure => {
            Some(prompt.password("Enter password for secure repository", &normalized)?.0)
        },
        ActionKind::Simple => None,
    };

    let session = Session {
        action,
        source,
        normalized,
        destinations,
        password,
        started,
        log_path: log.path().to_path_buf(),
    };
    tracing::info!(
        action = ?session.action,
        source = %session.source.display(),
        destinations = session.destinations.len(),
        "session ready"
    );

    let exec = SystemExecutor::new(log, session.started, cancel.clone());
    let results = execute_all(&session.destinations, cancel, |dest| {
        let job = Job {
            source: &session.source,
            normalized: &session.normalized,
            destination: dest,
            media_root: &media_root,
            tools: &cfg.tools,
            default_subpath: match session.action {
                ActionKind::Secure => cfg.defaults.secure_subpath.as_str(),
                ActionKind::Simple => cfg.defaults.simple_subpath.as_str(),
            },
        };
        match (&session.password, session.action) {
            (Some(pw), ActionKind::Secure) => secure::back_up(&job, pw, &exec, &mut prompt),
            _ => simple::back_up(&job, &exec, &mut prompt),
        }
    })?;

    if results.is_empty() {
        return Err(NasError::NoBackups(session.log_path).into());
    }

    render_summary(&session, &results)?;
    install::offer(&mut prompt, &cfg.paths.install_dir())?;
    println!("\n{}", style("All done!").green());
    Ok(())
}

// ─── Stages ───────────────────────────────────────────────────────────────────

/// Where to send the user when a tool is missing.
fn install_hint(role: &str) -> &'static str {
    match role {
        "backup engine" => "https://restic.readthedocs.io",
        _ => "https://rclone.org/install/",
    }
}

/// Both tools must resolve on `PATH` (or be absolute paths that exist).
pub fn check_tools(tools: &ToolsConfig) -> Result<()> {
    println!("{} Checking for required tools...", icon_info());
    let missing: Vec<(&str, &str)> = [("backup engine", tools.backup_engine.as_str()), ("sync tool", tools.sync.as_str())]
        .into_iter()
        .filter(|(_, program)| which::which(program).is_err())
        .collect();

    if missing.is_empty() {
        println!("{} All tools are installed.", icon_ok());
        return Ok(());
    }
    for (role, program) in &missing {
        println!("{} Tool not found: {program}. See: {}", icon_err(), install_hint(role));
    }
    Err(NasError::MissingTools(missing.iter().map(|(_, p)| (*p).to_string()).collect()).into())
}

pub fn select_action<R: BufRead, W: Write>(prompt: &mut Prompter<R, W>) -> Result<ActionKind> {
    prompt.say(&format!("\n{}", style("Choose an action:").bold()))?;
    prompt.say(&format!(
        "{} (Encrypted, version history - Recommended for safety)",
        style("1) Secure Backup").cyan()
    ))?;
    prompt.say(&format!(
        "{} (Non-encrypted, direct file access - Ideal for archiving)",
        style("2) Simple Incremental Copy").cyan()
    ))?;

    let choice = prompt.input("Select an option (1/2)", "")?;
    ActionKind::from_menu(&choice).ok_or_else(|| NasError::InvalidSelection(choice).into())
}

/// Pick a folder under `home` by number, or `0` for a path typed relative to
/// `home`.  The result must exist.
pub fn select_source<R: BufRead, W: Write>(prompt: &mut Prompter<R, W>, home: &Path) -> Result<PathBuf> {
    let folders = list_subdirectories(home);

    prompt.say(&format!("\n{}", style("📂 Select source folder:").bold()))?;
    prompt.say(&style("0) Enter a custom path").yellow().to_string())?;
    for (i, folder) in folders.iter().enumerate() {
        prompt.say(&format!("{}) {folder}", i + 1))?;
    }

    let choice = prompt.input("Select a folder", "")?;
    let source = if choice == "0" {
        let relative = prompt.input(&format!("Enter path relative to Home ('{}')", home.display()), "")?;
        home.join(relative)
    } else {
        let folder = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| folders.get(i))
            .ok_or_else(|| NasError::InvalidSelection(choice.clone()))?;
        home.join(folder)
    };

    if !source.exists() {
        return Err(NasError::MissingSource(source).into());
    }
    Ok(source)
}

/// Primary plus optional secondary, disks first.
pub fn select_destinations<R: BufRead, W: Write>(
    prompt: &mut Prompter<R, W>,
    disks: &[String],
    remotes: &[String],
) -> Result<Vec<Destination>> {
    let primary = destination::select_primary(prompt, disks, remotes)?;
    let secondary = destination::select_secondary(prompt, &primary, disks, remotes)?;
    Ok(destination::order_destinations(
        std::iter::once(primary).chain(secondary).collect(),
    ))
}

/// Run `back_up` for each destination in order, stopping at the first one
/// that does not complete.  Later destinations are not attempted.  A
/// cancellation seen at any point, including during the last destination,
/// ends the session before the summary.
pub fn execute_all<F>(destinations: &[Destination], cancel: &Cancellation, mut back_up: F) -> Result<Vec<BackupResult>>
where
    F: FnMut(&Destination) -> Result<Option<BackupResult>>,
{
    let mut results = Vec::new();
    for dest in destinations {
        cancel.check()?;
        match back_up(dest)? {
            Some(result) => results.push(result),
            None => {
                cancel.check()?;
                println!(
                    "{} Backup to {} failed. Halting subsequent backups.",
                    icon_err(),
                    dest.name
                );
                break;
            },
        }
    }
    cancel.check()?;
    Ok(results)
}

fn render_summary(session: &Session, results: &[BackupResult]) -> Result<()> {
    let mut out = io::stdout();
    ui::print_summary(
        &mut out,
        session.started.elapsed(),
        &session.source.to_string_lossy(),
        results,
    )?;

    if let (ActionKind::Secure, Some(password)) = (session.action, &session.password) {
        writeln!(out)?;
        for line in ui::password_box(password) {
            writeln!(out, "{line}")?;
        }
    }

    writeln!(out, "\n📄 Detailed log saved to: {}", session.log_path.display())?;
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
