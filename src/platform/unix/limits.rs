//! Unix resource limit operations

use crate::platform::traits::{CoreDumpStatus, LimitOps};
use nix::sys::resource::{setrlimit, Resource};

pub struct UnixLimits;

impl UnixLimits {
    pub fn new() -> Self {
        Self
    }
}

impl LimitOps for UnixLimits {
    fn disable_core_dumps(&self) -> CoreDumpStatus {
        let rlimit_succeeded = match setrlimit(Resource::RLIMIT_CORE, 0, 0) {
            Ok(()) => true,
            Err(e) => {
                warn!("setrlimit(RLIMIT_CORE, 0) failed: {}", e);
                false
            }
        };

        CoreDumpStatus {
            rlimit_succeeded,
            dumpable_cleared: clear_dumpable(),
        }
    }
}

#[cfg(target_os = "linux")]
fn clear_dumpable() -> bool {
    match nix::sys::prctl::set_dumpable(false) {
        Ok(()) => true,
        Err(e) => {
            warn!("prctl(PR_SET_DUMPABLE, 0) failed: {}", e);
            false
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn clear_dumpable() -> bool {
    // PR_SET_DUMPABLE is Linux-only; the rlimit still applies
    false
}
