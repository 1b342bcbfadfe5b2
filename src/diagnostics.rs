//! Human-readable status lines for the diagnostic stream
//!
//! These are the messages a user is meant to read (kept-file notice,
//! editor failure, validation errors). They are written to stderr in
//! production, separate from both the buffer output and `tracing` logs.

use std::fmt;
use std::io::Write;

/// Prefix on every diagnostic line
pub const DIAGNOSTIC_TAG: &str = "[EVAP]";

/// Severity shown in a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => f.write_str("[INFO]"),
            DiagnosticLevel::Warning => f.write_str("[WARN]"),
            DiagnosticLevel::Error => f.write_str("[ERROR]"),
        }
    }
}

/// Write one diagnostic line
///
/// Failures to write are ignored; there is nowhere left to report them.
pub fn write_diagnostic<D: Write + ?Sized>(
    diag: &mut D,
    level: DiagnosticLevel,
    message: impl fmt::Display,
) {
    let _ = writeln!(diag, "{} {} {}", DIAGNOSTIC_TAG, level, message);
    let _ = diag.flush();
}
