//! Editor supervision
//!
//! The editor runs as a child process with the artifact path as its only
//! argument. Its standard streams are bound to the controlling terminal
//! rather than to whatever evap itself was given, so the user can edit even
//! when evap's stdout is a pipe. evap blocks until the editor exits; there
//! is no timeout.

use crate::error::{Error, Result};
use crate::platform::{Platform, TerminalOps};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Conventional status for "command not found"
pub const COMMAND_NOT_FOUND_STATUS: i32 = 127;

/// How a finished editor process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with the given code
    Exited(i32),
    /// Killed by the given signal number
    Signaled(i32),
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Termination::Exited(COMMAND_NOT_FOUND_STATUS) => write!(
                f,
                "command not found (exit status {})",
                COMMAND_NOT_FOUND_STATUS
            ),
            Termination::Exited(code) => write!(f, "exit status {}", code),
            Termination::Signaled(signo) => match Signal::try_from(signo) {
                Ok(signal) => write!(f, "killed by {}", signal.as_str()),
                Err(_) => write!(f, "killed by signal {}", signo),
            },
        }
    }
}

/// Result of running the editor
#[derive(Debug)]
pub enum EditorOutcome {
    /// The process could not be created
    SpawnFailed(io::Error),
    /// Non-zero exit or death by signal
    AbnormalTermination(Termination),
    /// Exited normally with status zero
    CleanExit,
}

impl EditorOutcome {
    /// Classify a finished child's exit status
    pub fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(0), _) => EditorOutcome::CleanExit,
            (Some(code), _) => EditorOutcome::AbnormalTermination(Termination::Exited(code)),
            (None, Some(signo)) => EditorOutcome::AbnormalTermination(Termination::Signaled(signo)),
            // Neither exited nor signaled (stopped/continued) cannot come back from wait()
            (None, None) => EditorOutcome::AbnormalTermination(Termination::Exited(-1)),
        }
    }

    /// True only for a normal exit with status zero
    pub fn is_clean(&self) -> bool {
        matches!(self, EditorOutcome::CleanExit)
    }

    /// Convert into the session's error taxonomy
    pub fn into_result(self, editor: &str) -> Result<()> {
        match self {
            EditorOutcome::CleanExit => Ok(()),
            EditorOutcome::SpawnFailed(source) => Err(Error::EditorSpawnFailed {
                editor: editor.to_string(),
                source,
            }),
            EditorOutcome::AbnormalTermination(termination) => Err(Error::EditorAbnormalExit {
                editor: editor.to_string(),
                status: termination.to_string(),
            }),
        }
    }
}

/// Runs an editor on a file and reports how it ended
pub trait EditorLauncher {
    /// Block until `editor` has finished editing `artifact`
    fn launch(&self, editor: &str, artifact: &Path) -> EditorOutcome;
}

/// Launches the editor attached to the controlling terminal
pub struct TerminalEditor {
    terminal: Box<dyn TerminalOps>,
}

impl TerminalEditor {
    /// Create a launcher using the platform terminal
    pub fn new() -> Self {
        Self::with_terminal(Platform::terminal())
    }

    /// Create a launcher using a specific terminal implementation
    pub fn with_terminal(terminal: Box<dyn TerminalOps>) -> Self {
        Self { terminal }
    }
}

impl Default for TerminalEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorLauncher for TerminalEditor {
    fn launch(&self, editor: &str, artifact: &Path) -> EditorOutcome {
        let mut command = Command::new(editor);
        command.arg(artifact);

        match self.terminal.open_controlling_terminal() {
            Ok(tty) => {
                if let Err(e) = attach_terminal(&mut command, tty) {
                    warn!("Failed to bind editor to terminal, inheriting streams: {}", e);
                }
            }
            Err(e) => {
                warn!("No controlling terminal, editor inherits standard streams: {}", e);
            }
        }

        debug!("Launching editor '{}' on {}", editor, artifact.display());
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return EditorOutcome::SpawnFailed(io::Error::new(
                    ErrorKind::NotFound,
                    "command not found",
                ));
            }
            Err(e) => return EditorOutcome::SpawnFailed(e),
        };

        // Ctrl-C and Ctrl-\ belong to the editor while it runs. Installed
        // after spawn so the child does not inherit SIG_IGN.
        let _guard = InterruptGuard::install();
        let waited = child.wait();
        drop(command);

        match waited {
            Ok(status) => {
                debug!("Editor finished with {}", status);
                EditorOutcome::from_status(status)
            }
            Err(e) => EditorOutcome::SpawnFailed(e),
        }
    }
}

/// Point the child's stdin, stdout and stderr at the terminal
///
/// Every handle here is close-on-exec; the child only keeps the copies
/// placed on fds 0-2.
fn attach_terminal(command: &mut Command, tty: File) -> io::Result<()> {
    let stdin = tty.try_clone()?;
    let stdout = tty.try_clone()?;
    command
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(tty));
    Ok(())
}

/// Ignores SIGINT and SIGQUIT until dropped, then restores the old actions
struct InterruptGuard {
    previous: Vec<(Signal, SigAction)>,
}

impl InterruptGuard {
    fn install() -> Self {
        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        let mut previous = Vec::with_capacity(2);

        for signal in [Signal::SIGINT, Signal::SIGQUIT] {
            // SAFETY: SIG_IGN runs no handler code in this process
            match unsafe { sigaction(signal, &ignore) } {
                Ok(old) => previous.push((signal, old)),
                Err(e) => warn!("Failed to ignore {} while editing: {}", signal, e),
            }
        }

        Self { previous }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        for (signal, action) in self.previous.drain(..) {
            // SAFETY: restores the action that was installed before
            if let Err(e) = unsafe { sigaction(signal, &action) } {
                warn!("Failed to restore {}: {}", signal, e);
            }
        }
    }
}
