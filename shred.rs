//! Overwrite engine.
//!
//! A shred resolves the target extent once, seeds one random stream, then
//! runs the configured number of passes over the same `[0, target_size)`
//! range. Each pass starts from offset zero and walks the extent in
//! block-sized chunks. Once all passes are done the file is synced, closed
//! and optionally removed.

use crate::config::ShredOptions;
use crate::error::{Result, ShredError};
use crate::extent::OpenTarget;
use crate::random::RandomSource;
use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A single shred invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShredRequest {
    pub path: PathBuf,
    /// Number of overwrite passes
    pub iterations: u32,
    /// Remove the file after overwriting
    pub delete: bool,
    /// Do not round the extent up to the next full block
    pub exact: bool,
}

impl ShredRequest {
    pub fn new(path: impl Into<PathBuf>, opts: ShredOptions) -> Self {
        Self {
            path: path.into(),
            iterations: opts.iterations,
            delete: opts.delete,
            exact: opts.exact,
        }
    }
}

/// Position reached within a shred, reported after every chunk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current pass, starting at 1
    pub pass: u32,
    pub passes: u32,
    /// Bytes written so far in the current pass
    pub written: u64,
    /// Bytes each pass writes
    pub total: u64,
}

/// Overwrite `path` three times, rounding up to the next full block, then
/// delete it.
///
/// See [`shred_with_opts`] for control over the individual settings.
pub fn shred(path: impl AsRef<Path>) -> Result<()> {
    shred_with_opts(&ShredRequest::new(path.as_ref(), ShredOptions::DEFAULT))
}

/// Overwrite a file as described by `request`, and optionally delete it.
pub fn shred_with_opts(request: &ShredRequest) -> Result<()> {
    shred_with_progress(request, |_| {})
}

/// Same as [`shred_with_opts`], calling `on_progress` after every chunk.
///
/// On error the target is left as it is: partially overwritten and not
/// deleted, even if deletion was requested.
pub fn shred_with_progress<F>(request: &ShredRequest, mut on_progress: F) -> Result<()>
where
    F: FnMut(Progress),
{
    let path = request.path.as_path();
    let mut target = OpenTarget::open(path)?;
    let target_size = target.target_size(request.exact);
    let block_size = target.block_size();

    let mut random = RandomSource::new()?;

    debug!(
        path = %path.display(),
        original_size = target.original_size(),
        target_size,
        block_size,
        iterations = request.iterations,
        "starting shred"
    );

    let chunk_len = usize::try_from(block_size).map_err(|_| {
        ShredError::block_size(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "block size does not fit in memory"),
        )
    })?;
    let mut buf = vec![0u8; chunk_len];

    for pass in 1..=request.iterations {
        overwrite_pass(
            target.file_mut(),
            path,
            target_size,
            &mut buf,
            &mut random,
            |written| {
                on_progress(Progress {
                    pass,
                    passes: request.iterations,
                    written,
                    total: target_size,
                })
            },
        )?;
        debug!(path = %path.display(), pass, "overwrite pass complete");
    }

    let file = target.into_file();
    file.sync_all().map_err(|e| ShredError::sync(path, e))?;
    close(file).map_err(|e| ShredError::close(path, e))?;

    if request.delete {
        fs::remove_file(path).map_err(|e| ShredError::delete(path, e))?;
        info!(path = %path.display(), "file shredded and removed");
    } else {
        info!(path = %path.display(), size = target_size, "file shredded");
    }

    Ok(())
}

/// Overwrite `[0, target_size)` of `file` once with the next bytes of
/// `random`, in chunks of `buf.len()`.
///
/// The last chunk is cut short when `target_size` is not a multiple of the
/// buffer length. `on_chunk` receives the bytes written so far in this pass.
pub fn overwrite_pass<W, F>(
    file: &mut W,
    path: &Path,
    target_size: u64,
    buf: &mut [u8],
    random: &mut RandomSource,
    mut on_chunk: F,
) -> Result<()>
where
    W: Write + Seek,
    F: FnMut(u64),
{
    file.seek(SeekFrom::Start(0))
        .map_err(|e| ShredError::seek(path, e))?;

    let block_size = buf.len() as u64;
    let mut offset = 0u64;
    while offset < target_size {
        random.fill(buf);
        // Bounded by buf.len(), so the cast back to usize cannot truncate.
        let len = block_size.min(target_size - offset) as usize;
        let mut done = 0;
        // Short writes advance the offset and the rest of the chunk is retried.
        while done < len {
            match file.write(&buf[done..len]) {
                Ok(0) => {
                    let err = io::Error::from(io::ErrorKind::WriteZero);
                    return Err(ShredError::write(path, offset, err));
                }
                Ok(n) => {
                    done += n;
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(ShredError::write(path, offset, e)),
            }
        }
        on_chunk(offset);
    }
    Ok(())
}

/// Close the handle, surfacing the error that dropping a `File` discards.
#[cfg(unix)]
fn close(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: fd came from into_raw_fd, so we own it and close it once.
    if unsafe { libc::close(fd) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn close(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}
