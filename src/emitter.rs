//! Buffer emission
//!
//! Copies the artifact byte-for-byte to the output sink in bounded chunks.
//! Nothing is added or stripped except the optional NUL terminator.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use zeroize::Zeroizing;

/// Size of each read/write chunk
pub const EMIT_CHUNK_SIZE: usize = 4096;

/// Byte appended when NUL termination is requested
pub const NULL_TERMINATOR: u8 = 0;

/// Copy the artifact at `path` to `sink`
///
/// Returns the number of bytes written, including the terminator.
pub fn emit_buffer<W: Write + ?Sized>(path: &Path, sink: &mut W, null_end: bool) -> Result<u64> {
    let emission_failed = |source: io::Error| Error::EmissionFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(emission_failed)?;
    let written = copy_chunked(file, sink, null_end).map_err(emission_failed)?;

    debug!("Emitted {} bytes from {}", written, path.display());
    Ok(written)
}

/// Stream `reader` into `sink`, optionally appending one NUL byte
///
/// The chunk buffer is zeroed when it is dropped.
pub fn copy_chunked<R, W>(mut reader: R, sink: &mut W, null_end: bool) -> io::Result<u64>
where
    R: Read,
    W: Write + ?Sized,
{
    let mut buf = Zeroizing::new(vec![0u8; EMIT_CHUNK_SIZE]);
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf[..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buf[..n])?;
        total += n as u64;
    }

    if null_end {
        sink.write_all(&[NULL_TERMINATOR])?;
        total += 1;
    }

    sink.flush()?;
    Ok(total)
}
