//! Unix credential checks

use crate::platform::traits::PrivilegeOps;
use nix::unistd::{getegid, geteuid, getgid, getuid};

pub struct UnixPrivileges;

impl UnixPrivileges {
    pub fn new() -> Self {
        Self
    }
}

impl PrivilegeOps for UnixPrivileges {
    fn is_privileged(&self) -> bool {
        geteuid() != getuid() || getegid() != getgid()
    }
}
