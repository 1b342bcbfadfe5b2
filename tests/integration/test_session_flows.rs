//! Integration Tests for Session Flows
//!
//! These tests run whole sessions against real editor processes (small
//! shell scripts) and check what reaches the output and what stays on disk.

use evap::platform::{CoreDumpStatus, LimitOps, TerminalOps};
use evap::{Session, SessionConfig, SessionState, TerminalEditor};
use std::fs::{self, File};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

// Sessions touch process-wide signal dispositions, and writing a script
// while another thread forks can make exec fail with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pretends stdin is a terminal but has no /dev/tty to offer
struct DetachedTerminal;

impl TerminalOps for DetachedTerminal {
    fn stdin_is_terminal(&self) -> bool {
        true
    }

    fn open_controlling_terminal(&self) -> io::Result<File> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no controlling terminal"))
    }
}

struct NoLimits;

impl LimitOps for NoLimits {
    fn disable_core_dumps(&self) -> CoreDumpStatus {
        CoreDumpStatus {
            rlimit_succeeded: true,
            dumpable_cleared: true,
        }
    }
}

struct Fixture {
    _scripts: TempDir,
    tmpdir: TempDir,
    editor: PathBuf,
}

/// Write an executable editor script with the given body
fn fixture(body: &str) -> Fixture {
    let scripts = TempDir::new().unwrap();
    let editor = scripts.path().join("editor.sh");
    fs::write(&editor, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&editor, fs::Permissions::from_mode(0o755)).unwrap();

    Fixture {
        _scripts: scripts,
        tmpdir: TempDir::new().unwrap(),
        editor,
    }
}

fn session(fixture: &Fixture, keep: bool, no_output: bool, null_end: bool) -> Session {
    let config = SessionConfig {
        editor: fixture.editor.to_string_lossy().into_owned(),
        tmpdir: fixture.tmpdir.path().to_path_buf(),
        keep,
        no_output,
        null_end,
    };

    Session::new(config)
        .with_terminal(Box::new(DetachedTerminal))
        .with_limits(Box::new(NoLimits))
        .with_launcher(Box::new(TerminalEditor::with_terminal(Box::new(
            DetachedTerminal,
        ))))
}

fn leftover_files(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_clean_edit_is_emitted_and_erased() {
    let _guard = serial();
    let fixture = fixture(r#"printf 'hello\n' > "$1""#);

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, false, false, false).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.state, SessionState::Done);
    assert_eq!(out, b"hello\n");
    assert_eq!(leftover_files(fixture.tmpdir.path()), 0);
}

#[test]
fn test_null_end_appends_one_nul() {
    let _guard = serial();
    let fixture = fixture(r#"printf 'hello\n' > "$1""#);

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, false, false, true).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 0);
    assert_eq!(out, b"hello\n\0");
    assert_eq!(leftover_files(fixture.tmpdir.path()), 0);
}

#[test]
fn test_failing_editor_emits_nothing() {
    let _guard = serial();
    let fixture = fixture(r#"printf 'partial' > "$1"; exit 1"#);

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, false, false, true).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 1);
    assert_eq!(report.state, SessionState::Error);
    assert!(out.is_empty());
    assert_eq!(leftover_files(fixture.tmpdir.path()), 0);

    let diag = String::from_utf8(diag).unwrap();
    assert!(diag.contains("[EVAP] [ERROR] Editor exited abnormally (exit status 1)"));
}

#[test]
fn test_keep_leaves_file_and_reports_path() {
    let _guard = serial();
    let fixture = fixture(r#"printf 'hello\n' > "$1""#);

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, true, false, false).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 0);
    assert_eq!(out, b"hello\n");

    let kept = report.artifact.unwrap();
    assert_eq!(fs::read(&kept).unwrap(), b"hello\n");
    assert_eq!(fs::metadata(&kept).unwrap().permissions().mode() & 0o777, 0o600);

    let diag = String::from_utf8(diag).unwrap();
    assert_eq!(
        diag,
        format!("[EVAP] [INFO] Kept temporary file: {}\n", kept.display())
    );
}

#[test]
fn test_no_output_with_null_end_writes_nothing() {
    let _guard = serial();
    let fixture = fixture(r#"printf 'secret' > "$1""#);

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, false, true, true).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 0);
    assert!(out.is_empty());
    assert_eq!(leftover_files(fixture.tmpdir.path()), 0);
}

#[test]
fn test_untouched_buffer_is_empty_output() {
    let _guard = serial();
    let fixture = fixture("exit 0");

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, false, false, false).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 0);
    assert!(out.is_empty());
    assert_eq!(report.bytes_emitted, 0);
}

#[test]
fn test_failed_wipe_warns_and_keeps_exit_zero() {
    let _guard = serial();
    // root can open the read-only artifact for writing, so the wipe succeeds
    if nix::unistd::geteuid().is_root() {
        return;
    }
    let fixture = fixture(r#"printf 'hello\n' > "$1"; chmod 400 "$1""#);

    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let report = session(&fixture, false, false, false).run(&mut out, &mut diag);

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.state, SessionState::Done);
    assert!(report.wipe_failed);
    assert_eq!(out, b"hello\n");

    let left = report.artifact.unwrap();
    assert_eq!(fs::read(&left).unwrap(), b"hello\n");

    let diag = String::from_utf8(diag).unwrap();
    assert_eq!(diag.lines().count(), 1, "{}", diag);
    assert!(diag.starts_with("[EVAP] [WARN] secure wipe of"), "{}", diag);
    assert!(diag.contains("during open"), "{}", diag);
}

#[test]
fn test_binary_rejects_piped_stdin() {
    let _guard = serial();
    let tmpdir = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_evap"))
        .env("TMPDIR", tmpdir.path())
        .env("EDITOR", "true")
        .env_remove("EVAP_CONFIG")
        .env_remove("EVAP_DEBUG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[EVAP] [ERROR] standard input is not supported"));
    // Reported once, as the diagnostic line only
    assert_eq!(
        stderr.matches("standard input is not supported").count(),
        1,
        "{}",
        stderr
    );
    assert_eq!(leftover_files(tmpdir.path()), 0);
}

#[test]
fn test_binary_logs_without_color_when_redirected() {
    let _guard = serial();
    let tmpdir = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_evap"))
        .env("TMPDIR", tmpdir.path())
        .env("RUST_LOG", "debug")
        .env_remove("EVAP_CONFIG")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Session failed in Validating"), "{}", stderr);
    assert!(!stderr.contains('\x1b'), "escape codes in {:?}", stderr);
}

#[test]
fn test_binary_help_and_version() {
    let _guard = serial();
    let help = Command::new(env!("CARGO_BIN_EXE_evap"))
        .arg("--help")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(help.status.success());
    assert!(String::from_utf8_lossy(&help.stdout).starts_with("Usage: evap"));

    let version = Command::new(env!("CARGO_BIN_EXE_evap"))
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(version.status.success());
    assert_eq!(
        String::from_utf8_lossy(&version.stdout),
        format!("evap version {}\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_binary_rejects_unknown_option() {
    let _guard = serial();
    let output = Command::new(env!("CARGO_BIN_EXE_evap"))
        .arg("--bogus")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("[EVAP] [ERROR] Invalid option: '--bogus'. Use --help for usage."));
}
