//! `manual-nas-tool` — interactive backups of a home folder to external disks
//! and cloud remotes.
//!
//! # Overview
//!
//! This binary is a thin orchestration layer around two external tools:
//! [`restic`](https://restic.net) for encrypted, versioned "secure" backups
//! and [`rclone`](https://rclone.org) for plain incremental "simple" copies
//! (and for discovering configured cloud remotes).  All deduplication,
//! encryption and transfer logic stays inside those tools; this program asks
//! the questions, builds the argument lists, runs them behind a spinner, and
//! keeps a per-session log.
//!
//! # Usage
//!
//! ```text
//! manual-nas-tool                 # interactive session
//! manual-nas-tool install         # copy this binary to ~/.local/bin
//! manual-nas-tool --print-config  # show resolved config and exit
//! ```
//!
//! Type `q` at any prompt to leave.
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                  |
//! |--------------------------|-------------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap                   |
//! | [`config`]               | `Config` struct + TOML loader                   |
//! | [`error`]                | Exit-code-bearing error kinds                   |
//! | [`cancel`]               | Ctrl-C cancellation token                       |
//! | [`exec`]                 | Silent and streamed command execution           |
//! | [`logger`]               | Per-session append-only log file                |
//! | [`prompt`]               | Line prompts, password generation, sub-paths    |
//! | [`destination`]          | Disk/remote discovery, selection, ordering      |
//! | [`runner`]               | restic/rclone argument construction             |
//! | [`session`]              | Session state, name normalisation               |
//! | [`strategy`]             | Secure and simple per-destination flows         |
//! | [`ui`]                   | Icons, spinner, summary rendering               |
//! | [`commands::run`]        | The interactive session                         |
//! | [`commands::install`]    | Self-install                                    |

mod cancel;
mod cli;
mod commands;
mod config;
mod destination;
mod error;
mod exec;
mod logger;
mod prompt;
mod runner;
mod session;
mod strategy;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Subcommand};
use console::style;
use error::NasError;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<NasError>() {
            Some(NasError::Cancelled) => {
                println!("\n{} Operation cancelled by user.", ui::icon_warn());
                ExitCode::SUCCESS
            },
            Some(nas) => {
                eprintln!("{} {nas}", ui::icon_err());
                ExitCode::from(nas.exit_code())
            },
            None => {
                eprintln!("{} {} {e:#}", ui::icon_err(), style("Error:").red().bold());
                ExitCode::FAILURE
            },
        },
    }
}

fn dispatch(cli: &Cli) -> Result<()> {
    let cfg = match cli.config.clone().or_else(config::default_config_path) {
        Some(path) => config::load_config(&path)?,
        None => config::Config::default(),
    };

    if cli.print_config {
        println!("{cfg:#?}");
        return Ok(());
    }

    match &cli.command {
        // ── manual-nas-tool install ─────────────────────────────────────────
        Some(Subcommand::Install) => commands::install::run(&cfg.paths.install_dir()),

        // ── manual-nas-tool (interactive session) ───────────────────────────
        None => {
            let cancel = cancel::Cancellation::new();
            cancel.install_handler()?;
            commands::run::run(&cfg, &cancel)
        },
    }
}

/// Diagnostics go to stderr.  `RUST_LOG` wins; otherwise `-v` raises the
/// level from `warn`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
