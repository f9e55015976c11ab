//! External command execution.
//!
//! Two modes, both taking a structured argument list (never a shell string)
//! plus per-invocation environment overrides that are layered onto a copy of
//! this process's environment:
//!
//! - [`run_silent`] — quick probes.  Returns `(success, trimmed stdout)`.
//! - [`Executor::stream`] — long-running work behind the spinner.  Collects
//!   stdout and stderr lines in arrival order, writes both session-log
//!   entries, and prints the status line.
//!
//! Neither mode returns an error: a command that cannot even be spawned is
//! reported as a failed run whose output is the spawn error.
//!
//! The [`Executor`] trait is the seam the strategies are written against, so
//! their state machines can be tested with a scripted fake.

use std::{
    io::{BufRead, BufReader, Read},
    process::{Command, Stdio},
    sync::mpsc,
    thread,
    time::Instant,
};

use anyhow::{Context, Result};

use crate::{
    cancel::Cancellation,
    logger::SessionLog,
    ui::{Progress, icon_info, print_command_outcome},
};

/// `(name, value)` pairs added to the child's environment.
pub type EnvOverrides<'a> = &'a [(&'a str, &'a str)];

/// Result of a streamed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Every output line, stdout and stderr interleaved, trimmed.
    pub lines: Vec<String>,
}

impl CommandOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            lines: vec![message.into()],
        }
    }
}

pub trait Executor {
    /// Quick check; see [`run_silent`].
    fn probe(&self, args: &[String], env: EnvOverrides<'_>) -> (bool, String);

    /// Long-running command shown to the user as `label`.
    fn stream(&self, label: &str, args: &[String], env: EnvOverrides<'_>) -> CommandOutcome;
}

// ─── Silent mode ──────────────────────────────────────────────────────────────

/// Run to completion with stdout captured and stderr discarded.
pub fn run_silent(args: &[String], env: EnvOverrides<'_>) -> (bool, String) {
    tracing::debug!(command = %args.join(" "), "probe");
    let Some((prog, rest)) = args.split_first() else {
        return (false, "Failed to execute command.".into());
    };

    let output = Command::new(prog)
        .args(rest)
        .envs(env.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(out) => (
            out.status.success(),
            String::from_utf8_lossy(&out.stdout).trim().to_string(),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "probe could not be spawned");
            (false, "Failed to execute command.".into())
        },
    }
}

// ─── Streamed mode ────────────────────────────────────────────────────────────

/// Spawn `args` and gather every stdout/stderr line as it arrives.
///
/// Each pipe is drained on its own scoped thread into one channel, so the
/// returned order is the order lines became readable.
pub fn run_collecting(args: &[String], env: EnvOverrides<'_>) -> Result<(bool, Vec<String>)> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let mut child = Command::new(prog)
        .args(rest)
        .envs(env.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;

    let stdout = child.stdout.take().context("child stdout was not captured")?;
    let stderr = child.stderr.take().context("child stderr was not captured")?;

    let (tx, rx) = mpsc::channel();
    let lines = thread::scope(|s| {
        let tx_err = tx.clone();
        s.spawn(move || forward_lines(stdout, &tx));
        s.spawn(move || forward_lines(stderr, &tx_err));
        rx.iter().collect::<Vec<String>>()
    });

    let status = child
        .wait()
        .with_context(|| format!("waiting for: {}", args.join(" ")))?;
    Ok((status.success(), lines))
}

/// Read `pipe` to EOF.  Bytes that are not UTF-8 are replaced, never a
/// reason to stop reading: a closed pipe would SIGPIPE the child.
fn forward_lines(pipe: impl Read, tx: &mpsc::Sender<String>) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let _ = tx.send(String::from_utf8_lossy(&buf).trim().to_string());
            },
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {},
            Err(e) => {
                tracing::debug!(error = %e, "output pipe read failed");
                break;
            },
        }
    }
}

/// The real executor: spawns processes, draws the spinner, writes the
/// session log.
pub struct SystemExecutor {
    log: SessionLog,
    started: Instant,
    cancel: Cancellation,
}

impl SystemExecutor {
    pub fn new(log: SessionLog, started: Instant, cancel: Cancellation) -> Self {
        Self {
            log,
            started,
            cancel,
        }
    }
}

impl Executor for SystemExecutor {
    fn probe(&self, args: &[String], env: EnvOverrides<'_>) -> (bool, String) {
        if self.cancel.is_cancelled() {
            return (false, String::new());
        }
        run_silent(args, env)
    }

    fn stream(&self, label: &str, args: &[String], env: EnvOverrides<'_>) -> CommandOutcome {
        if self.cancel.is_cancelled() {
            return CommandOutcome::failed("cancelled before start");
        }

        println!("\n{} Starting {label}...", icon_info());
        let command_line = args.join(" ");
        tracing::debug!(command = %command_line, "stream");
        if let Err(e) = self.log.record_issue(&command_line) {
            tracing::warn!(error = %e, "could not write session log");
        }

        let progress = Progress::start(label, self.started);
        let result = {
            let _running = self.cancel.command_running();
            run_collecting(args, env)
        };
        progress.stop();

        let outcome = match result {
            Ok((success, lines)) => CommandOutcome { success, lines },
            Err(e) => CommandOutcome::failed(format!("Failed to execute command: {e:#}")),
        };

        if let Err(e) = self
            .log
            .record_completion(label, outcome.success, &outcome.lines)
        {
            tracing::warn!(error = %e, "could not write session log");
        }
        print_command_outcome(label, outcome.success, &outcome.lines);
        outcome
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    // ── run_silent ────────────────────────────────────────────────────────────

    #[test]
    fn silent_true_succeeds() {
        assert!(run_silent(&["true".into()], &[]).0);
    }

    #[test]
    fn silent_false_fails() {
        assert!(!run_silent(&["false".into()], &[]).0);
    }

    #[test]
    fn silent_trims_stdout_and_drops_stderr() {
        let (ok, out) = run_silent(&sh("echo '  gdrive:'; echo noise >&2"), &[]);
        assert!(ok);
        assert_eq!(out, "gdrive:");
    }

    #[test]
    fn silent_missing_program_is_a_generic_failure() {
        let (ok, out) = run_silent(&["definitely-not-a-real-binary-xyz".into()], &[]);
        assert!(!ok);
        assert_eq!(out, "Failed to execute command.");
    }

    #[test]
    fn silent_empty_args_fail() {
        assert!(!run_silent(&[], &[]).0);
    }

    #[test]
    fn env_overrides_reach_the_child_only() {
        let (ok, out) = run_silent(&sh("printf %s \"$NAS_TEST_VAR\""), &[("NAS_TEST_VAR", "hunter2")]);
        assert!(ok);
        assert_eq!(out, "hunter2");
        assert!(std::env::var("NAS_TEST_VAR").is_err());
    }

    // ── run_collecting ────────────────────────────────────────────────────────

    #[test]
    fn collecting_gathers_both_streams() {
        let (ok, lines) = run_collecting(&sh("echo out1; echo err1 >&2; echo out2"), &[]).unwrap();
        assert!(ok);
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"err1".to_string()));
        let out1 = lines.iter().position(|l| l == "out1").unwrap();
        let out2 = lines.iter().position(|l| l == "out2").unwrap();
        assert!(out1 < out2, "stdout order preserved");
    }

    #[test]
    fn collecting_reports_non_zero_exit() {
        let (ok, lines) = run_collecting(&sh("echo failing; exit 3"), &[]).unwrap();
        assert!(!ok);
        assert_eq!(lines, vec!["failing"]);
    }

    #[test]
    fn collecting_survives_invalid_utf8() {
        let script = "printf 'a\\n\\377bad\\n'; sleep 0.2; echo after; echo 'Transferred: 1'";
        let (ok, lines) = run_collecting(&sh(script), &[]).unwrap();
        assert!(ok, "{lines:?}");
        assert_eq!(lines, vec!["a", "\u{fffd}bad", "after", "Transferred: 1"]);
    }

    #[test]
    fn collecting_trims_lines() {
        let (_, lines) = run_collecting(&sh("echo '   padded   '"), &[]).unwrap();
        assert_eq!(lines, vec!["padded"]);
    }

    #[test]
    fn collecting_spawn_failure_is_an_error() {
        assert!(run_collecting(&["definitely-not-a-real-binary-xyz".into()], &[]).is_err());
        assert!(run_collecting(&[], &[]).is_err());
    }

    // ── SystemExecutor ────────────────────────────────────────────────────────

    fn executor(dir: &std::path::Path) -> (SystemExecutor, Cancellation) {
        let log = SessionLog::create(dir, chrono::Local::now()).unwrap();
        let cancel = Cancellation::new();
        (SystemExecutor::new(log, Instant::now(), cancel.clone()), cancel)
    }

    #[test]
    fn stream_logs_command_status_and_output_but_not_env() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = executor(dir.path());

        let outcome = exec.stream(
            "Echo test",
            &sh("echo first; echo \"$SECRET_PW\" | wc -c"),
            &[("SECRET_PW", "topsecret")],
        );
        assert!(outcome.success);
        assert_eq!(outcome.lines[0], "first");

        let log_file = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap().path();
        let text = std::fs::read_to_string(log_file).unwrap();
        assert!(text.contains("Executing: sh -c echo first"));
        assert!(text.contains("Echo test - SUCCESS"));
        assert!(text.contains("  first"));
        assert!(!text.contains("topsecret"));
    }

    #[test]
    fn stream_failure_is_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = executor(dir.path());
        let outcome = exec.stream("Missing", &["definitely-not-a-real-binary-xyz".into()], &[]);
        assert!(!outcome.success);
        assert!(outcome.lines[0].starts_with("Failed to execute command"));
    }

    #[test]
    fn stream_after_cancel_does_not_run() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, cancel) = executor(dir.path());
        cancel.cancel();
        let marker = dir.path().join("ran");
        let outcome = exec.stream("Touch", &["touch".into(), marker.to_string_lossy().into_owned()], &[]);
        assert!(!outcome.success);
        assert!(!marker.exists());
    }
}
