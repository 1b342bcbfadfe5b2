//! Platform-specific operation traits
//!
//! These traits define the interface for platform-specific operations,
//! allowing for clean abstraction and easier testing.

use std::fs::File;

/// Terminal detection and access
pub trait TerminalOps: Send + Sync {
    /// Check whether standard input is an interactive terminal
    fn stdin_is_terminal(&self) -> bool;

    /// Open the controlling terminal device for reading and writing
    ///
    /// The returned handle is close-on-exec, so it never survives into a
    /// spawned program on its own.
    fn open_controlling_terminal(&self) -> std::io::Result<File>;
}

/// Process credential inspection
pub trait PrivilegeOps: Send + Sync {
    /// True when the effective uid/gid differ from the real uid/gid
    fn is_privileged(&self) -> bool;
}

/// Process-wide resource limits
pub trait LimitOps: Send + Sync {
    /// Prevent this process (and the editor it spawns) from writing core dumps
    fn disable_core_dumps(&self) -> CoreDumpStatus;
}

/// Which core dump protections took effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreDumpStatus {
    /// Whether `setrlimit(RLIMIT_CORE, 0)` succeeded.
    ///
    /// Inherited by the editor across exec.
    pub rlimit_succeeded: bool,

    /// Whether `prctl(PR_SET_DUMPABLE, 0)` succeeded (Linux only).
    pub dumpable_cleared: bool,
}

impl CoreDumpStatus {
    /// At least one protection is active
    pub fn is_protected(&self) -> bool {
        self.rlimit_succeeded || self.dumpable_cleared
    }
}
