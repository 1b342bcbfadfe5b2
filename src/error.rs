//! Error types and Result aliases for evap

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for evap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of the secure wipe at which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeStage {
    /// Opening the artifact for writing
    Open,
    /// Reading the artifact's current length
    Stat,
    /// Overwriting the extent with zeros
    Write,
    /// Forcing the zeros to stable storage
    Sync,
    /// Removing the directory entry after a completed wipe
    Unlink,
}

impl fmt::Display for WipeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WipeStage::Open => "open",
            WipeStage::Stat => "stat",
            WipeStage::Write => "write",
            WipeStage::Sync => "sync",
            WipeStage::Unlink => "unlink",
        };
        f.write_str(name)
    }
}

/// Main error type for evap
#[derive(Debug, Error)]
pub enum Error {
    // === Validation errors ===
    /// Standard input is not an interactive terminal
    #[error("standard input is not supported. Pipe into evap is invalid.")]
    InputNotInteractive,

    /// A command-line argument could not be understood
    #[error("{message}. Use --help for usage.")]
    InvalidArgument { message: String },

    // === Artifact errors ===
    /// The temporary artifact could not be created
    #[error("failed to create temporary file in '{}': {source}", dir.display())]
    AllocationFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Editor errors ===
    /// The editor process could not be started
    #[error("failed to launch editor '{editor}': {source}")]
    EditorSpawnFailed {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    /// The editor terminated with a non-zero status or by a signal
    #[error("Editor exited abnormally ({status})")]
    EditorAbnormalExit { editor: String, status: String },

    // === Buffer errors ===
    /// The artifact could not be copied to the output sink
    #[error("failed to emit buffer from '{}': {source}", path.display())]
    EmissionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The secure wipe did not complete; the file was left in place
    #[error("secure wipe of '{}' failed during {stage}: {source}", path.display())]
    WipeFailed {
        path: PathBuf,
        stage: WipeStage,
        #[source]
        source: std::io::Error,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether the session may still report success after this error
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::WipeFailed { .. })
    }
}
