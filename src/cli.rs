//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "manual-nas-tool",
    about   = "Interactive secure (restic) and simple (rclone) backups to disks and cloud remotes",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// Defaults to `~/.config/manual-nas-tool/config.toml`.  The file is
    /// optional; every setting has a built-in default.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.  Omit to start an interactive backup session.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// Print the resolved configuration and exit without running anything.
    #[arg(long)]
    pub print_config: bool,

    /// Raise diagnostic output on stderr (-v info, -vv debug, -vvv trace).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
pub enum Subcommand {
    /// Copy this executable to the install directory as `manual-nas-tool`.
    ///
    /// Overwrites (updates) an existing install without asking.
    Install,
}
