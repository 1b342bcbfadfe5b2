//! Unix-specific platform implementations

mod limits;
mod privileges;
mod terminal;

pub use limits::UnixLimits;
pub use privileges::UnixPrivileges;
pub use terminal::UnixTerminal;
