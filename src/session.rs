//! Session control
//!
//! Drives one editing session through its states:
//!
//! ```text
//! Start -> Validating -> Allocating -> Editing -> Emitting -> Cleaning -> Done
//!                \            \           \                      |
//!                 `------------`-----------`----> Error <--------'
//! ```
//!
//! Cleanup policy differs by edge. After a failed edit the artifact is
//! unlinked without a wipe. After a successful edit it is wiped and unlinked,
//! or kept when requested. A failed wipe leaves it on disk and is reported as
//! a warning.

use crate::artifact::Artifact;
use crate::config::SessionConfig;
use crate::diagnostics::{write_diagnostic, DiagnosticLevel};
use crate::editor::{EditorLauncher, TerminalEditor};
use crate::emitter;
use crate::error::{Error, Result};
use crate::platform::{CoreDumpStatus, LimitOps, Platform, TerminalOps};
use crate::security_audit;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// Exit status of a fully successful session
pub const EXIT_SUCCESS: i32 = 0;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    Validating,
    Allocating,
    Editing,
    Emitting,
    Cleaning,
    Done,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What happened during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Final state, `Done` or `Error`
    pub state: SessionState,
    /// Process exit status to use
    pub exit_code: i32,
    /// Artifact path, if one was allocated
    pub artifact: Option<PathBuf>,
    /// Whether the artifact was left on disk on purpose
    pub kept: bool,
    /// Bytes written to the output sink
    pub bytes_emitted: u64,
    /// Whether a secure wipe was attempted and failed
    pub wipe_failed: bool,
    /// State in which the session failed, if it did
    pub failed_in: Option<SessionState>,
}

/// Turn off core dumps and record which protections took effect
///
/// Safe to call more than once; the binary calls it before anything else.
pub fn disable_core_dumps(limits: &dyn LimitOps) -> CoreDumpStatus {
    let protection = limits.disable_core_dumps();
    security_audit::log_core_dump_status(
        protection.rlimit_succeeded,
        protection.dumpable_cleared,
    );
    protection
}

/// One editing session
pub struct Session {
    config: SessionConfig,
    terminal: Box<dyn TerminalOps>,
    limits: Box<dyn LimitOps>,
    launcher: Box<dyn EditorLauncher>,
    state: SessionState,
    artifact: Option<PathBuf>,
    kept: bool,
    bytes_emitted: u64,
    wipe_failed: bool,
    failed_in: Option<SessionState>,
}

impl Session {
    /// Create a session using the real platform and terminal editor
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            terminal: Platform::terminal(),
            limits: Platform::limits(),
            launcher: Box::new(TerminalEditor::new()),
            state: SessionState::Start,
            artifact: None,
            kept: false,
            bytes_emitted: 0,
            wipe_failed: false,
            failed_in: None,
        }
    }

    /// Replace the terminal detection used for input validation
    pub fn with_terminal(mut self, terminal: Box<dyn TerminalOps>) -> Self {
        self.terminal = terminal;
        self
    }

    /// Replace the resource limit operations
    pub fn with_limits(mut self, limits: Box<dyn LimitOps>) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the editor launcher
    pub fn with_launcher(mut self, launcher: Box<dyn EditorLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the session to completion
    ///
    /// Buffer bytes go to `out`; status lines go to `diag`. Errors are
    /// reported on `diag` before returning.
    pub fn run<W, D>(&mut self, out: &mut W, diag: &mut D) -> SessionReport
    where
        W: Write + ?Sized,
        D: Write + ?Sized,
    {
        let result = self.run_inner(out, diag);

        let exit_code = match result {
            Ok(()) => {
                self.transition(SessionState::Done);
                EXIT_SUCCESS
            }
            Err(e) => {
                let failed_in = *self.failed_in.get_or_insert(self.state);
                debug!("Session failed in {}: {}", failed_in, e);
                write_diagnostic(diag, DiagnosticLevel::Error, &e);
                self.transition(SessionState::Error);
                e.exit_code()
            }
        };

        SessionReport {
            state: self.state,
            exit_code,
            artifact: self.artifact.clone(),
            kept: self.kept,
            bytes_emitted: self.bytes_emitted,
            wipe_failed: self.wipe_failed,
            failed_in: self.failed_in,
        }
    }

    fn run_inner<W, D>(&mut self, out: &mut W, diag: &mut D) -> Result<()>
    where
        W: Write + ?Sized,
        D: Write + ?Sized,
    {
        // Core dumps could persist the same plaintext the wipe removes
        disable_core_dumps(self.limits.as_ref());

        self.transition(SessionState::Validating);
        if !self.terminal.stdin_is_terminal() {
            return Err(Error::InputNotInteractive);
        }

        self.transition(SessionState::Allocating);
        let artifact = Artifact::allocate(&self.config.tmpdir)?;
        self.artifact = Some(artifact.path().to_path_buf());

        self.transition(SessionState::Editing);
        let outcome = self.launcher.launch(&self.config.editor, artifact.path());
        if let Err(e) = outcome.into_result(&self.config.editor) {
            if let Error::EditorAbnormalExit { editor, status } = &e {
                security_audit::log_editor_abnormal_exit(editor, status);
            }
            self.failed_in = Some(SessionState::Editing);
            self.transition(SessionState::Cleaning);
            if let Err(cleanup) = artifact.discard() {
                write_diagnostic(
                    diag,
                    DiagnosticLevel::Warning,
                    format!("Failed to remove temporary file: {}", cleanup),
                );
            }
            return Err(e);
        }

        self.transition(SessionState::Emitting);
        let emission = if self.config.no_output {
            debug!("Output suppressed");
            Ok(())
        } else {
            emitter::emit_buffer(artifact.path(), out, self.config.null_end)
                .map(|written| self.bytes_emitted = written)
        };
        if emission.is_err() {
            self.failed_in = Some(SessionState::Emitting);
        }

        // Cleanup runs whether or not emission succeeded
        self.transition(SessionState::Cleaning);
        if self.config.keep {
            let path = artifact.retain();
            self.kept = true;
            write_diagnostic(
                diag,
                DiagnosticLevel::Info,
                format!("Kept temporary file: {}", path.display()),
            );
        } else {
            match artifact.erase() {
                Ok(report) => debug!("Zeroed {} bytes", report.bytes_zeroed),
                Err(e) if e.is_warning() => {
                    self.wipe_failed = true;
                    write_diagnostic(diag, DiagnosticLevel::Warning, &e);
                }
                Err(e) => return Err(e),
            }
        }

        emission
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }
}
