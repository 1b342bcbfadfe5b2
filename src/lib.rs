//! evap - A temporary, no-trace editing buffer
//!
//! evap opens the user's editor on a private temporary file, streams the
//! saved content to standard output, and then overwrites and removes the
//! file so the text does not linger on disk.
//!
//! ## Module Organization
//!
//! ### Session
//!
//! - [`session`] - The session state machine tying everything together
//! - [`cli`] - Argument parsing, help and version text
//! - [`config`] - Editor and temporary directory resolution, config file
//!
//! ### Artifact lifecycle
//!
//! - [`artifact`] - Private, uniquely named temporary file
//! - [`editor`] - Running the editor on the controlling terminal
//! - [`emitter`] - Copying the buffer to the output sink
//! - [`eraser`] - Zero-fill, sync, then unlink
//!
//! ### Support
//!
//! - [`platform`] - Terminal, privilege and resource limit operations
//! - [`diagnostics`] - `[EVAP]` status lines on standard error
//! - [`security_audit`] - Structured audit events via `tracing`
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use evap::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! let report = session.run(&mut std::io::stdout(), &mut std::io::stderr());
//! std::process::exit(report.exit_code);
//! ```
//!
//! ## Platform Support
//!
//! - Linux
//! - macOS and other Unix systems (no `PR_SET_DUMPABLE`)
//!
//! ## Limits
//!
//! The wipe is a single zero pass followed by `fsync`. It does not reach
//! copies made by copy-on-write filesystems, snapshots, journals, SSD
//! wear-leveling, or the editor's own swap and backup files.

#[macro_use]
extern crate tracing;

pub mod artifact;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod editor;
pub mod emitter;
pub mod eraser;
pub mod error;
pub mod platform;
pub mod security_audit;
pub mod session;

// Re-exports for core functionality
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::{Session, SessionReport, SessionState};

// Convenience re-exports for common types
pub use artifact::Artifact;
pub use cli::{CliAction, CliArgs};
pub use config::loader::ConfigLoader;
pub use editor::{EditorLauncher, EditorOutcome, TerminalEditor};

// Version information
/// The current version of evap from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
