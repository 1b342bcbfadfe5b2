//! Configuration management for evap
//!
//! A [`SessionConfig`] is assembled once, before the session starts, from
//! four sources in decreasing priority: command-line flags, the optional
//! config file, the environment, and built-in defaults. It is immutable
//! afterwards.
//!
//! When the process runs with effective credentials that differ from its
//! real ones (setuid/setgid), the config file and `$EDITOR` are ignored and
//! the editor falls back to [`DEFAULT_EDITOR`].

pub mod loader;

use crate::cli::CliArgs;
use crate::platform::PrivilegeOps;
use crate::security_audit;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use loader::ConfigLoader;

/// Editor used when nothing else is configured or the process is privileged
pub const DEFAULT_EDITOR: &str = "vi";

/// Temporary directory used when `$TMPDIR` is absent or implausible
pub const DEFAULT_TMPDIR: &str = "/tmp";

/// Longest accepted temporary directory name, in bytes
pub const MAX_TMPDIR_LEN: usize = 200;

/// Longest accepted editor command, in bytes
pub const MAX_EDITOR_LEN: usize = 1024;

/// Finalized settings for one editing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Editor program, run with the artifact path as its only argument
    pub editor: String,
    /// Directory the artifact is created in
    pub tmpdir: PathBuf,
    /// Leave the artifact on disk and report its path
    pub keep: bool,
    /// Do not copy the buffer to the output stream
    pub no_output: bool,
    /// Terminate the output with a NUL byte
    pub null_end: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            editor: DEFAULT_EDITOR.to_string(),
            tmpdir: PathBuf::from(DEFAULT_TMPDIR),
            keep: false,
            no_output: false,
            null_end: false,
        }
    }
}

/// Contents of the optional `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub editor: Option<String>,
    pub tmpdir: Option<PathBuf>,
    pub keep: Option<bool>,
    pub no_output: Option<bool>,
    pub null_end: Option<bool>,
}

/// Environment values the session consults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// `$EDITOR`, if set and valid UTF-8
    pub editor: Option<String>,
    /// `$TMPDIR`, if set
    pub tmpdir: Option<OsString>,
}

impl Environment {
    /// Snapshot the relevant variables from the process environment
    pub fn capture() -> Self {
        let editor = match env::var("EDITOR") {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                warn!("Ignoring $EDITOR: not valid UTF-8");
                None
            }
        };

        Self {
            editor,
            tmpdir: env::var_os("TMPDIR"),
        }
    }
}

impl SessionConfig {
    /// Merge all configuration sources into a session configuration
    pub fn from_sources(
        args: &CliArgs,
        file: Option<&FileConfig>,
        environment: &Environment,
        privileged: bool,
    ) -> Self {
        // A privileged process must not trust anything the invoking user
        // controls implicitly.
        let file = if privileged { None } else { file };
        let defaults = FileConfig::default();
        let file = file.unwrap_or(&defaults);

        Self {
            editor: resolve_editor(
                args.editor.as_deref(),
                file.editor.as_deref(),
                environment.editor.as_deref(),
                privileged,
            ),
            tmpdir: resolve_tmpdir(file.tmpdir.as_deref(), environment.tmpdir.as_deref()),
            keep: args.keep || file.keep.unwrap_or(false),
            no_output: args.no_output || file.no_output.unwrap_or(false),
            null_end: args.null_end || file.null_end.unwrap_or(false),
        }
    }

    /// Build the configuration from the real process state
    ///
    /// Reads the config file (unless privileged) and the environment.
    /// A malformed config file is reported and ignored.
    pub fn load(args: &CliArgs, privileges: &dyn PrivilegeOps) -> Self {
        let privileged = privileges.is_privileged();
        let file = if privileged {
            debug!("Running privileged; skipping config file");
            None
        } else {
            let mut loader = ConfigLoader::new();
            match loader.load() {
                Ok(Some(file)) => {
                    let source = loader.current_path().map(|p| p.display().to_string());
                    security_audit::log_config_event(false, source.as_deref());
                    Some(file)
                }
                Ok(None) => None,
                Err(e) => {
                    warn!("{}. Ignoring config file", e);
                    security_audit::log_config_event(true, None);
                    None
                }
            }
        };

        Self::from_sources(args, file.as_ref(), &Environment::capture(), privileged)
    }
}

/// Pick the editor command
///
/// Priority: `--editor`, then the config file, then `$EDITOR`, then
/// [`DEFAULT_EDITOR`]. When `privileged` is set only the explicit flag is
/// honored.
pub fn resolve_editor(
    flag: Option<&str>,
    file: Option<&str>,
    environment: Option<&str>,
    privileged: bool,
) -> String {
    if let Some(editor) = flag.and_then(|e| accept_editor(e, "--editor")) {
        return editor;
    }

    if privileged {
        if file.is_some() || environment.is_some() {
            security_audit::log_privileged_editor_override(DEFAULT_EDITOR);
        }
        return DEFAULT_EDITOR.to_string();
    }

    file.and_then(|e| accept_editor(e, "config file"))
        .or_else(|| environment.and_then(|e| accept_editor(e, "$EDITOR")))
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

fn accept_editor(editor: &str, origin: &str) -> Option<String> {
    if let Err(reason) = validate_editor(editor) {
        warn!("Ignoring editor from {}: {}", origin, reason);
        return None;
    }
    Some(editor.to_string())
}

/// Check an editor command before it is handed to the process launcher
pub fn validate_editor(editor: &str) -> std::result::Result<(), String> {
    if editor.is_empty() {
        return Err("editor command is empty".to_string());
    }
    if editor.contains('\0') {
        return Err("editor command contains a NUL byte".to_string());
    }
    if editor.len() > MAX_EDITOR_LEN {
        return Err(format!(
            "editor command is {} bytes (limit {})",
            editor.len(),
            MAX_EDITOR_LEN
        ));
    }
    Ok(())
}

/// Pick the directory the artifact is created in
///
/// The config file wins over `$TMPDIR`. Either is discarded when empty or
/// longer than [`MAX_TMPDIR_LEN`] bytes.
pub fn resolve_tmpdir(file: Option<&Path>, environment: Option<&std::ffi::OsStr>) -> PathBuf {
    file.map(Path::as_os_str)
        .into_iter()
        .chain(environment)
        .find(|dir| plausible_tmpdir(dir))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TMPDIR))
}

fn plausible_tmpdir(dir: &std::ffi::OsStr) -> bool {
    if dir.is_empty() {
        return false;
    }
    if dir.len() > MAX_TMPDIR_LEN {
        warn!(
            "Ignoring temporary directory of {} bytes (limit {})",
            dir.len(),
            MAX_TMPDIR_LEN
        );
        return false;
    }
    true
}
