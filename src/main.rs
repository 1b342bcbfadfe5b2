//! evap - A temporary, no-trace editing buffer
//!
//! Opens an editor on a private temporary file, prints what was saved, and
//! wipes the file afterwards.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use evap::cli::{self, CliAction, CliArgs};
use evap::diagnostics::{write_diagnostic, DiagnosticLevel};
use evap::platform::Platform;
use evap::session::disable_core_dumps;
use evap::{Session, SessionConfig};

/// Environment variable that turns on debug logging
const DEBUG_ENV_VAR: &str = "EVAP_DEBUG";

fn main() {
    let code = match try_main() {
        Ok(code) => code,
        Err(e) => {
            write_diagnostic(&mut io::stderr(), DiagnosticLevel::Error, format!("{:#}", e));
            1
        }
    };
    process::exit(code);
}

fn try_main() -> anyhow::Result<i32> {
    // First thing; Session::run repeats it once logging is installed
    disable_core_dumps(Platform::limits().as_ref());

    let args = match cli::parse_args(env::args_os().skip(1)) {
        Ok(CliAction::Run(args)) => args,
        Ok(CliAction::Help) => {
            io::stdout().write_all(cli::help_text().as_bytes())?;
            return Ok(0);
        }
        Ok(CliAction::Version) => {
            io::stdout().write_all(cli::version_text().as_bytes())?;
            return Ok(0);
        }
        Err(e) => {
            write_diagnostic(&mut io::stderr(), DiagnosticLevel::Error, &e);
            return Ok(e.exit_code());
        }
    };

    init_logging(&args);
    debug!("Starting {} v{}", evap::NAME, evap::VERSION);

    let privileges = Platform::privileges();
    let config = SessionConfig::load(&args, privileges.as_ref());
    debug!(
        "Editor '{}', temporary directory {}",
        config.editor,
        config.tmpdir.display()
    );

    let mut session = Session::new(config);
    let stdout = io::stdout();
    let stderr = io::stderr();
    let report = session.run(&mut stdout.lock(), &mut stderr.lock());

    debug!("Session finished in state {}", report.state);
    Ok(report.exit_code)
}

/// Send tracing output to stderr, quiet unless asked
///
/// `RUST_LOG` wins over `--debug` and `EVAP_DEBUG`.
fn init_logging(args: &CliArgs) {
    let debug_env = env::var(DEBUG_ENV_VAR)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let level = if args.debug || debug_env { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();
}
