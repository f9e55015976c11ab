//! Terminal UI — status icons, the progress spinner, and the final summary.
//!
//! # Design goals
//!
//! - **One writer at a time.** The spinner owns the terminal while an external command runs and is
//!   cleared before anything else is printed.
//! - **Clock is session time.** The spinner shows time since the session started, not since the
//!   current command started, so consecutive stages read as one continuous run.
//! - **Testable without a terminal.** Rendering helpers return `String`s or write to a
//!   `&mut dyn Write`.

use std::{
    io::Write,
    time::{Duration, Instant},
};

use console::{StyledObject, measure_text_width, style};
use indicatif::{ProgressBar, ProgressStyle};

use crate::strategy::BackupResult;

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

pub fn icon_ok() -> StyledObject<&'static str> {
    style("✅").green()
}
pub fn icon_warn() -> StyledObject<&'static str> {
    style("⚠️").yellow()
}
pub fn icon_err() -> StyledObject<&'static str> {
    style("❌").red()
}
pub fn icon_info() -> StyledObject<&'static str> {
    style("ℹ️").blue()
}
fn icon_progress() -> StyledObject<&'static str> {
    style("📦").cyan()
}

/// `HH:MM:SS`, hours unbounded.
pub fn format_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// A running progress line.  Created by [`Progress::start`], removed by
/// [`Progress::stop`] or on drop.
///
/// indicatif ticks it from its own background thread every 100 ms; the bar
/// is seeded with the elapsed session time so `{elapsed_precise}` reads as
/// time since `session_start`.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn start(label: &str, session_start: Instant) -> Self {
        let bar = ProgressBar::new_spinner().with_elapsed(session_start.elapsed());
        let style = ProgressStyle::with_template("{prefix} {spinner:.cyan} {msg} - {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS);
        bar.set_style(style);
        bar.set_prefix(icon_progress().to_string());
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Clear the line.  Must happen before the next console write.
    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

// ─── Command outcome lines ────────────────────────────────────────────────────

/// Number of trailing output lines replayed when a command fails.
pub const FAILURE_TAIL: usize = 5;

/// Print the status line for a finished streamed command.  On failure the
/// last [`FAILURE_TAIL`] output lines follow so the user sees why.
pub fn print_command_outcome(label: &str, success: bool, lines: &[String]) {
    if success {
        println!("{} {label} completed successfully!", icon_ok());
        return;
    }
    println!("{} {label} failed!", icon_err());
    println!("Error details (last {FAILURE_TAIL} lines):");
    let skip = lines.len().saturating_sub(FAILURE_TAIL);
    for line in &lines[skip..] {
        println!("  {line}");
    }
}

// ─── Banner ───────────────────────────────────────────────────────────────────

pub fn print_banner() {
    let term = console::Term::stdout();
    if term.is_term() {
        let _ = term.clear_screen();
    }
    println!(
        "{}",
        style(format!("✨ Manual NAS Backup Tool - v{} ✨", env!("CARGO_PKG_VERSION")))
            .cyan()
            .bold()
    );
    println!("\n{} This tool helps you create two types of backups:", icon_info());
    println!(
        "  1. {} Ideal for safety. Encrypted, versioned, and space-efficient.",
        style("Secure Backups:").bold()
    );
    println!(
        "  2. {} Ideal for archiving files to free up space while keeping them accessible.",
        style("Simple Copies:").bold()
    );
}

// ─── Summary ──────────────────────────────────────────────────────────────────

/// Print the end-of-run report: duration, source, one block per completed
/// destination.
pub fn print_summary(out: &mut dyn Write, elapsed: Duration, source: &str, results: &[BackupResult]) -> std::io::Result<()> {
    writeln!(out, "\n{} Operation finished in {}!", icon_ok(), format_time(elapsed))?;
    writeln!(out, "📂 Source:      {source}")?;
    for (i, result) in results.iter().enumerate() {
        writeln!(out, "\n{}--- Summary for Backup #{} ---", icon_info(), i + 1)?;
        writeln!(out, "  💾 Destination: {}", result.destination)?;
        for line in &result.summary {
            writeln!(out, "    {line}")?;
        }
    }
    Ok(())
}

const BOX_WIDTH: usize = 60;

/// The boxed recovery-password notice.  This is the only place the password
/// is ever shown.
pub fn password_box(password: &str) -> Vec<String> {
    let border = |s: String| format!("{}{}", icon_warn(), s);
    let blank = || border(format!("│{}│", " ".repeat(BOX_WIDTH)));
    let centered = |text: &str| {
        let width = measure_text_width(text);
        let left = BOX_WIDTH.saturating_sub(width) / 2;
        let right = BOX_WIDTH.saturating_sub(width + left);
        border(format!("│{}{text}{}│", " ".repeat(left), " ".repeat(right)))
    };

    let label = "   Password: ";
    let pad = BOX_WIDTH.saturating_sub(label.len() + measure_text_width(password));
    let pwd_line = border(format!(
        "│{label}{}{}│",
        style(password).yellow().bold(),
        " ".repeat(pad)
    ));

    vec![
        border(format!("┌{}┐", "─".repeat(BOX_WIDTH))),
        blank(),
        centered("--- IMPORTANT RECOVERY PASSWORD ---"),
        blank(),
        pwd_line,
        blank(),
        centered("Save this in a secure password manager!"),
        blank(),
        border(format!("└{}┘", "─".repeat(BOX_WIDTH))),
    ]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
