//! Command-line parsing, help and version text

use crate::error::{Error, Result};
use std::ffi::OsStr;

/// Flags accepted on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `--editor=CMD`
    pub editor: Option<String>,
    /// `--keep`
    pub keep: bool,
    /// `--no-output`
    pub no_output: bool,
    /// `--null-end`
    pub null_end: bool,
    /// `--debug`
    pub debug: bool,
}

/// What the binary should do after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Run an editing session
    Run(CliArgs),
    /// Print usage and exit 0
    Help,
    /// Print the version and exit 0
    Version,
}

/// Parse arguments (excluding the program name)
///
/// `--help` and `--version` take effect as soon as they are seen, so
/// anything after them is not validated.
pub fn parse_args<I, S>(args: I) -> Result<CliAction>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut parsed = CliArgs::default();

    for arg in args {
        let arg = arg.as_ref().to_str().ok_or_else(|| Error::InvalidArgument {
            message: format!(
                "Unrecognized argument: '{}'",
                arg.as_ref().to_string_lossy()
            ),
        })?;

        match arg {
            "--keep" => parsed.keep = true,
            "--no-output" => parsed.no_output = true,
            "--null-end" => parsed.null_end = true,
            "--debug" => parsed.debug = true,
            "--help" => return Ok(CliAction::Help),
            "--version" => return Ok(CliAction::Version),
            _ => {
                if let Some(editor) = arg.strip_prefix("--editor=") {
                    crate::config::validate_editor(editor).map_err(|reason| {
                        Error::InvalidArgument {
                            message: format!("Invalid option: '--editor': {}", reason),
                        }
                    })?;
                    parsed.editor = Some(editor.to_string());
                } else if arg.starts_with("--") {
                    return Err(Error::InvalidArgument {
                        message: format!("Invalid option: '{}'", arg),
                    });
                } else {
                    return Err(Error::InvalidArgument {
                        message: format!("Unrecognized argument: '{}'", arg),
                    });
                }
            }
        }
    }

    Ok(CliAction::Run(parsed))
}

/// Usage text printed by `--help`
pub fn help_text() -> String {
    [
        "Usage: evap [OPTIONS]",
        "A temporary, no-trace editing buffer that evaporates after use.",
        "",
        "Options:",
        "  --editor=CMD     Use specified editor instead of $EDITOR or vi",
        "  --keep           Keep temporary file after use (debugging)",
        "  --no-output      Do not print buffer to stdout",
        "  --null-end       End output with NUL byte",
        "  --debug          Enable debug logging on stderr",
        "  --help           Show this help message",
        "  --version        Show version information",
        "",
        "Environment:",
        "  EDITOR           Editor to use when --editor is not given",
        "  TMPDIR           Directory for the temporary file (default /tmp)",
        "  EVAP_CONFIG      Path to a config.toml",
        "  EVAP_DEBUG       Enable debug logging (1 or true)",
        "  RUST_LOG         Set logging level (error, warn, info, debug, trace)",
        "",
    ]
    .join("\n")
}

/// Version line printed by `--version`
pub fn version_text() -> String {
    format!("{} version {}\n", crate::NAME, crate::VERSION)
}
