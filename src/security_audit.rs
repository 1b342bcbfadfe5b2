//! Security Audit Logging
//!
//! This module provides security audit logging for the artifact lifecycle.
//!
//! ## Security Policy
//!
//! - **NEVER** log buffer contents, not even a prefix or a length-limited excerpt
//! - Only log security-relevant events with non-sensitive metadata
//!   (paths, byte counts, exit statuses)
//! - Use INFO level for events the user already sees as an `[EVAP]` line,
//!   WARN only for exposures nothing else reports
//! - Audit logs go to the diagnostic stream, never to the buffer output
//!
//! ## Events Logged
//!
//! - Core dump suppression
//! - Privileged editor override
//! - Artifact creation, wipe, retention and plain removal
//! - Wipe failures
//! - Editor abnormal termination
//! - Configuration load errors

use std::path::Path;
use tracing::{info, warn};

/// Security audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    /// Core dumps disabled for the session
    CoreDumpsDisabled,
    /// Core dumps could not be disabled
    CoreDumpsUnprotected,
    /// Inherited editor setting ignored because the process is privileged
    PrivilegedEditorOverride,
    /// Temporary artifact created
    ArtifactCreated,
    /// Artifact zero-filled, synced and unlinked
    ArtifactWiped,
    /// Artifact retained at the user's request
    ArtifactKept,
    /// Artifact unlinked without a wipe pass
    ArtifactDiscarded,
    /// Wipe failed; the artifact may still hold plaintext
    WipeFailed,
    /// Editor crashed or exited non-zero
    EditorAbnormalExit,
    /// Configuration loaded successfully
    ConfigLoaded,
    /// Configuration file error
    ConfigError,
}

impl SecurityEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> &'static str {
        match self {
            SecurityEvent::CoreDumpsDisabled => "Core dumps disabled",
            SecurityEvent::CoreDumpsUnprotected => "Core dumps could not be disabled",
            SecurityEvent::PrivilegedEditorOverride => {
                "Privileged process; inherited editor ignored"
            }
            SecurityEvent::ArtifactCreated => "Temporary file created",
            SecurityEvent::ArtifactWiped => "Temporary file wiped and removed",
            SecurityEvent::ArtifactKept => "Temporary file kept",
            SecurityEvent::ArtifactDiscarded => "Temporary file removed without wipe",
            SecurityEvent::WipeFailed => "Secure wipe failed",
            SecurityEvent::EditorAbnormalExit => "Editor exited abnormally",
            SecurityEvent::ConfigLoaded => "Configuration loaded successfully",
            SecurityEvent::ConfigError => "Configuration loading error",
        }
    }

    /// Check if this event is an exposure that should warn
    ///
    /// Kept files and failed wipes are reported to the user directly, so
    /// their audit records stay at info.
    pub fn is_suspicious(&self) -> bool {
        matches!(self, SecurityEvent::CoreDumpsUnprotected)
    }
}

/// Log a security audit event
///
/// ## Security Note
///
/// Never pass buffer contents as metadata.
/// Only include non-sensitive information like paths, sizes and statuses.
///
/// # Examples
///
/// ```
/// use evap::security_audit::{log_security_event, SecurityEvent};
///
/// // Good: Logs event with non-sensitive metadata
/// log_security_event(SecurityEvent::ArtifactWiped, Some("bytes=42"));
///
/// // BAD: Never do this!
/// // log_security_event(SecurityEvent::ArtifactWiped, Some("content=hunter2"));
/// ```
pub fn log_security_event(event: SecurityEvent, metadata: Option<&str>) {
    let event_desc = event.description();

    let log_message = if let Some(meta) = metadata {
        format!("SECURITY AUDIT: {} | {}", event_desc, meta)
    } else {
        format!("SECURITY AUDIT: {}", event_desc)
    };

    if event.is_suspicious() {
        warn!("{}", log_message);
    } else {
        info!("{}", log_message);
    }
}

/// Log the outcome of core dump suppression
pub fn log_core_dump_status(rlimit: bool, dumpable: bool) {
    let event = if rlimit || dumpable {
        SecurityEvent::CoreDumpsDisabled
    } else {
        SecurityEvent::CoreDumpsUnprotected
    };
    log_security_event(
        event,
        Some(&format!("rlimit={} dumpable_cleared={}", rlimit, dumpable)),
    );
}

/// Log that a privileged process replaced an inherited editor
pub fn log_privileged_editor_override(fallback: &str) {
    log_security_event(
        SecurityEvent::PrivilegedEditorOverride,
        Some(&format!("editor={}", sanitize_for_log(fallback))),
    );
}

/// Log artifact creation
pub fn log_artifact_created(path: &Path) {
    log_security_event(
        SecurityEvent::ArtifactCreated,
        Some(&format!("path={}", sanitize_path(path))),
    );
}

/// Log a completed wipe
pub fn log_artifact_wiped(path: &Path, bytes: u64) {
    log_security_event(
        SecurityEvent::ArtifactWiped,
        Some(&format!("path={} bytes={}", sanitize_path(path), bytes)),
    );
}

/// Log artifact retention
pub fn log_artifact_kept(path: &Path) {
    log_security_event(
        SecurityEvent::ArtifactKept,
        Some(&format!("path={}", sanitize_path(path))),
    );
}

/// Log plain removal after a failed edit
pub fn log_artifact_discarded(path: &Path) {
    log_security_event(
        SecurityEvent::ArtifactDiscarded,
        Some(&format!("path={}", sanitize_path(path))),
    );
}

/// Log a wipe that did not complete
pub fn log_wipe_failed(path: &Path, stage: &str) {
    log_security_event(
        SecurityEvent::WipeFailed,
        Some(&format!("path={} stage={}", sanitize_path(path), stage)),
    );
}

/// Log abnormal editor termination
pub fn log_editor_abnormal_exit(editor: &str, status: &str) {
    log_security_event(
        SecurityEvent::EditorAbnormalExit,
        Some(&format!(
            "editor={} status={}",
            sanitize_for_log(editor),
            sanitize_for_log(status)
        )),
    );
}

/// Log configuration events
pub fn log_config_event(is_error: bool, details: Option<&str>) {
    let event = if is_error {
        SecurityEvent::ConfigError
    } else {
        SecurityEvent::ConfigLoaded
    };
    log_security_event(event, details);
}

fn sanitize_path(path: &Path) -> String {
    sanitize_for_log(&path.to_string_lossy())
}

/// Sanitize a value to prevent log injection
fn sanitize_for_log(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .take(256) // Limit length
        .collect()
}
