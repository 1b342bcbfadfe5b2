//! Temporary artifact allocation and disposal
//!
//! An [`Artifact`] is the one temporary file a session owns. It is created
//! empty with owner-only permissions under a unique, unpredictable name, and
//! its creating descriptor is closed straight away: from then on it is
//! addressed only by path.
//!
//! The artifact's lifetime ends through exactly one of the consuming methods:
//! [`Artifact::erase`], [`Artifact::discard`] or [`Artifact::retain`].

use crate::eraser::{self, WipeReport};
use crate::error::{Error, Result};
use crate::security_audit;
use std::fs::{self, OpenOptions, Permissions};
use std::io::ErrorKind;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name prefix for every artifact
pub const ARTIFACT_PREFIX: &str = "evap-";

/// Owner read/write only
pub const ARTIFACT_MODE: u32 = 0o600;

/// How many fresh names to try before giving up on collisions
const MAX_CREATE_ATTEMPTS: u32 = 16;

/// Handle to the session's temporary file
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    /// Create a new, empty artifact in `dir`
    ///
    /// Name selection and creation are one `O_CREAT | O_EXCL` open, so an
    /// existing file (or symlink) at the chosen name is never reused.
    pub fn allocate(dir: &Path) -> Result<Self> {
        let mut last_error = None;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let path = dir.join(artifact_name());
            let created = OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(ARTIFACT_MODE)
                .open(&path);

            match created {
                Ok(file) => {
                    // umask can only clear bits, but be explicit about the result
                    if let Err(source) = file.set_permissions(Permissions::from_mode(ARTIFACT_MODE)) {
                        drop(file);
                        let _ = fs::remove_file(&path);
                        return Err(Error::AllocationFailed {
                            dir: dir.to_path_buf(),
                            source,
                        });
                    }
                    drop(file);

                    debug!("Allocated artifact {}", path.display());
                    security_audit::log_artifact_created(&path);
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Artifact name collision at {}, retrying", path.display());
                    last_error = Some(e);
                }
                Err(source) => {
                    return Err(Error::AllocationFailed {
                        dir: dir.to_path_buf(),
                        source,
                    });
                }
            }
        }

        Err(Error::AllocationFailed {
            dir: dir.to_path_buf(),
            source: last_error.unwrap_or_else(|| {
                std::io::Error::new(ErrorKind::AlreadyExists, "no unique name available")
            }),
        })
    }

    /// Path of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero-fill, sync and unlink the artifact
    ///
    /// On failure the file is deliberately left in place; the error names
    /// the stage that failed.
    pub fn erase(self) -> Result<WipeReport> {
        eraser::secure_erase(&self.path)
    }

    /// Unlink the artifact without wiping it
    ///
    /// Used after a failed edit, where the content is not trusted as final.
    pub fn discard(self) -> Result<()> {
        fs::remove_file(&self.path)?;
        security_audit::log_artifact_discarded(&self.path);
        Ok(())
    }

    /// Hand the artifact over to the user; it stays on disk
    pub fn retain(self) -> PathBuf {
        security_audit::log_artifact_kept(&self.path);
        self.path
    }
}

fn artifact_name() -> String {
    format!("{}{}", ARTIFACT_PREFIX, Uuid::new_v4().simple())
}
