//! Cancellation token shared between the Ctrl-C handler and the session.
//!
//! The handler calls [`Cancellation::cancel`].  When no external command is
//! running the process exits on the spot; otherwise the child receives the
//! signal itself and the session stops at its next [`Cancellation::check`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Result;

use crate::{error::NasError, ui::icon_warn};

#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    inner: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    cancelled: AtomicBool,
    running_command: AtomicBool,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session cancelled.  Returns whether an external command is
    /// in flight.
    pub fn cancel(&self) -> bool {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.running_command.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Checkpoint: `Err(NasError::Cancelled)` once cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(NasError::Cancelled.into());
        }
        Ok(())
    }

    /// Flag an external command as running until the guard drops.
    pub fn command_running(&self) -> CommandGuard {
        self.inner.running_command.store(true, Ordering::SeqCst);
        CommandGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Route Ctrl-C and SIGTERM to this token.
    pub fn install_handler(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            // A busy session reports the cancellation from `main` once it
            // unwinds to the next checkpoint.
            if !token.cancel() {
                eprintln!("\n{} Operation cancelled by user.", icon_warn());
                std::process::exit(0);
            }
        })?;
        Ok(())
    }
}

pub struct CommandGuard {
    inner: Arc<State>,
}

impl Drop for CommandGuard {
    fn drop(&mut self) {
        self.inner.running_command.store(false, Ordering::SeqCst);
    }
}
