//! Platform abstraction layer
//!
//! This module provides a unified interface for the handful of operating
//! system facilities the session depends on: terminal detection, privilege
//! inspection and core dump suppression.

mod traits;
#[cfg(unix)]
mod unix;

pub use traits::*;

#[cfg(not(unix))]
compile_error!("evap requires a Unix controlling terminal");

/// Platform implementation factory
pub struct Platform;

impl Platform {
    /// Get the platform-specific terminal operations
    pub fn terminal() -> Box<dyn TerminalOps> {
        Box::new(unix::UnixTerminal::new())
    }

    /// Get the platform-specific privilege operations
    pub fn privileges() -> Box<dyn PrivilegeOps> {
        Box::new(unix::UnixPrivileges::new())
    }

    /// Get the platform-specific resource limit operations
    pub fn limits() -> Box<dyn LimitOps> {
        Box::new(unix::UnixLimits::new())
    }
}
