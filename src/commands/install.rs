//! Self-install: copy this executable onto the user's `PATH`.
//!
//! Offered interactively at the end of every successful session and
//! available directly as `manual-nas-tool install`.  Re-running over an
//! existing install is an update, never a second copy.

use std::{
    ffi::OsString,
    fs,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use console::style;

use crate::{
    prompt::Prompter,
    ui::{icon_err, icon_info, icon_ok, icon_warn},
};

pub const COMMAND_NAME: &str = "manual-nas-tool";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    Updated,
}

impl InstallStatus {
    fn verb(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Updated => "updated",
        }
    }
}

pub fn target(install_dir: &Path) -> PathBuf {
    install_dir.join(COMMAND_NAME)
}

/// Copy `exe` to `<install_dir>/manual-nas-tool` with mode 0755.
pub fn install_to(exe: &Path, install_dir: &Path) -> Result<InstallStatus> {
    let dest = target(install_dir);
    let status = if dest.exists() {
        InstallStatus::Updated
    } else {
        InstallStatus::Installed
    };

    fs::create_dir_all(install_dir)
        .with_context(|| format!("creating {}", install_dir.display()))?;
    fs::copy(exe, &dest).with_context(|| format!("copying {} to {}", exe.display(), dest.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod 755 {}", dest.display()))?;
    }

    Ok(status)
}

/// Whether `dir` is one of the entries of a `PATH`-style variable.
pub fn dir_on_path(dir: &Path, path_var: Option<OsString>) -> bool {
    path_var.is_some_and(|p| std::env::split_paths(&p).any(|entry| entry.as_path() == dir))
}

fn do_install(install_dir: &Path) {
    let result = std::env::current_exe()
        .context("locating the running executable")
        .and_then(|exe| install_to(&exe, install_dir));

    match result {
        Ok(status) => {
            println!(
                "{} Command '{COMMAND_NAME}' has been {} successfully!",
                icon_ok(),
                status.verb()
            );
            if !dir_on_path(install_dir, std::env::var_os("PATH")) {
                println!("{} Your PATH does not seem to include {}.", icon_warn(), install_dir.display());
                println!("    Please add it to your shell profile (e.g., .bashrc, .zshrc) and restart your terminal:");
                println!(
                    "    {}",
                    style(format!("export PATH=\"{}:$PATH\"", install_dir.display())).bold()
                );
            }
        },
        Err(e) => println!("{} Installation failed: {e:#}", icon_err()),
    }
}

/// Offer to install (or update) after a session.  Failures are reported but
/// never fail the session.
pub fn offer<R: BufRead, W: Write>(prompt: &mut Prompter<R, W>, install_dir: &Path) -> Result<()> {
    let dest = target(install_dir);
    prompt.say(&"-".repeat(50))?;

    if dest.exists() {
        prompt.say(&format!("{} Command '{COMMAND_NAME}' is already installed.", icon_info()))?;
        prompt.say(&format!(
            "    You can run this tool anytime by just typing: {}",
            style(COMMAND_NAME).bold()
        ))?;
        if prompt.confirm("Do you want to update it to this version?")? {
            do_install(install_dir);
        }
    } else if prompt.confirm(&format!("Would you like to install this tool as the '{COMMAND_NAME}' command?"))? {
        do_install(install_dir);
    } else {
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from(COMMAND_NAME));
        prompt.say(&format!(
            "{} To install later, run: {}",
            icon_info(),
            style(format!("{} install", exe.display())).bold()
        ))?;
    }
    Ok(())
}

/// `manual-nas-tool install`.
pub fn run(install_dir: &Path) -> Result<()> {
    do_install(install_dir);
    Ok(())
}
