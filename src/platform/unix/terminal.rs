//! Unix terminal operations

use crate::platform::traits::TerminalOps;
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;

/// Device node for the process's controlling terminal
const CONTROLLING_TERMINAL: &str = "/dev/tty";

pub struct UnixTerminal;

impl UnixTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl TerminalOps for UnixTerminal {
    fn stdin_is_terminal(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn open_controlling_terminal(&self) -> std::io::Result<File> {
        // std opens with O_CLOEXEC
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(CONTROLLING_TERMINAL)
    }
}
