//! Best-effort secure erasure
//!
//! A single pass: overwrite the file's current extent with zeros, force the
//! writes to stable storage, and only then remove the directory entry. If
//! any step before the unlink fails, the entry is left in place so the
//! failure stays visible instead of looking like a clean deletion.
//!
//! This does not defeat copy-on-write filesystems, snapshots, journals or
//! SSD wear-leveling.

use crate::error::{Error, Result, WipeStage};
use crate::security_audit;
use nix::fcntl::OFlag;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Size of each zero chunk written over the file
pub const WIPE_CHUNK_SIZE: usize = 4096;

/// Outcome of a completed wipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipeReport {
    /// File that was wiped
    pub path: PathBuf,
    /// Number of zero bytes written over the extent
    pub bytes_zeroed: u64,
}

/// Something that can be zero-filled and then flushed to stable storage
pub trait WipeTarget: Write {
    /// Force written data to stable storage
    fn sync_to_disk(&mut self) -> io::Result<()>;
}

impl WipeTarget for File {
    fn sync_to_disk(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Write exactly `len` zero bytes to `target`
///
/// Short writes are resumed within the same chunk and `Interrupted` is
/// retried. A write that accepts zero bytes is treated as irrecoverable.
pub fn zero_fill<W: Write + ?Sized>(target: &mut W, len: u64) -> io::Result<u64> {
    let zeros = [0u8; WIPE_CHUNK_SIZE];
    let mut remaining = len;

    while remaining > 0 {
        let chunk = remaining.min(WIPE_CHUNK_SIZE as u64) as usize;
        let mut written = 0;

        while written < chunk {
            match target.write(&zeros[written..chunk]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        ErrorKind::WriteZero,
                        "write accepted no bytes while wiping",
                    ));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        remaining -= chunk as u64;
    }

    Ok(len)
}

/// Zero-fill `len` bytes, sync, and then call `unlink`
///
/// `unlink` runs only after the sync has returned successfully.
pub fn wipe_then_unlink<T, F>(
    target: &mut T,
    len: u64,
    unlink: F,
) -> std::result::Result<u64, (WipeStage, io::Error)>
where
    T: WipeTarget + ?Sized,
    F: FnOnce() -> io::Result<()>,
{
    let zeroed = zero_fill(target, len).map_err(|e| (WipeStage::Write, e))?;
    target.sync_to_disk().map_err(|e| (WipeStage::Sync, e))?;
    unlink().map_err(|e| (WipeStage::Unlink, e))?;
    Ok(zeroed)
}

/// Overwrite the file at `path` with zeros and sync it, without unlinking
pub fn secure_wipe(path: &Path) -> Result<WipeReport> {
    wipe_path(path, || Ok(()))
}

/// Overwrite the file at `path` with zeros, sync it, then unlink it
///
/// On error the file is left on disk, possibly partially wiped.
pub fn secure_erase(path: &Path) -> Result<WipeReport> {
    let report = wipe_path(path, || fs::remove_file(path))?;
    security_audit::log_artifact_wiped(path, report.bytes_zeroed);
    Ok(report)
}

fn wipe_path<F>(path: &Path, unlink: F) -> Result<WipeReport>
where
    F: FnOnce() -> io::Result<()>,
{
    let fail = |stage: WipeStage, source: io::Error| {
        security_audit::log_wipe_failed(path, &stage.to_string());
        Error::WipeFailed {
            path: path.to_path_buf(),
            stage,
            source,
        }
    };

    // Write-only, no truncation: the existing blocks must be overwritten.
    // A symlink put in place of the artifact fails here with ELOOP.
    let mut file = OpenOptions::new()
        .write(true)
        .custom_flags(OFlag::O_NOFOLLOW.bits())
        .open(path)
        .map_err(|e| fail(WipeStage::Open, e))?;

    let len = file.metadata().map_err(|e| fail(WipeStage::Stat, e))?.len();
    debug!("Wiping {} bytes of {}", len, path.display());

    let bytes_zeroed =
        wipe_then_unlink(&mut file, len, unlink).map_err(|(stage, e)| fail(stage, e))?;

    Ok(WipeReport {
        path: path.to_path_buf(),
        bytes_zeroed,
    })
}
