//! Extent resolution for shred targets.
//!
//! [`OpenTarget`] opens a path write-only and works out how many bytes a
//! pass has to cover and in what chunk size:
//!
//! - regular files report their size through metadata
//! - block and character devices are measured by seeking to the end, since
//!   metadata reports zero (or nonsense) for them
//! - the chunk size is the block size of the containing filesystem
//!
//! Pipes, FIFOs and sockets cannot be seeked and are rejected while the
//! target is measured.

use crate::error::{Result, ShredError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// A target opened for overwriting, with the metadata a shred needs.
///
/// Owns the only handle to the target for the duration of one invocation.
#[derive(Debug)]
pub struct OpenTarget {
    file: File,
    is_regular: bool,
    original_size: u64,
    block_size: u64,
}

impl OpenTarget {
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).open(path) {
            Ok(file) => file,
            // Write-only opens of directories fail with EISDIR before we get
            // a chance to stat the handle.
            Err(_) if fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) => {
                return Err(ShredError::not_a_file(path));
            }
            Err(e) => return Err(ShredError::open(path, e)),
        };

        let meta = file.metadata().map_err(|e| ShredError::stat(path, e))?;
        if meta.is_dir() {
            return Err(ShredError::not_a_file(path));
        }

        let is_regular = meta.is_file();
        let original_size = if is_regular {
            meta.len()
        } else {
            file.seek(SeekFrom::End(0))
                .map_err(|e| ShredError::seek(path, e))?
        };

        let block_size = block_size(path).map_err(|e| ShredError::block_size(path, e))?;

        debug!(
            path = %path.display(),
            is_regular,
            size = original_size,
            block_size,
            "resolved shred target"
        );

        Ok(Self {
            file,
            is_regular,
            original_size,
            block_size,
        })
    }

    pub fn is_regular(&self) -> bool {
        self.is_regular
    }

    /// Size before shredding: metadata length for regular files, seek-to-end
    /// offset for everything else.
    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Number of bytes every pass must overwrite.
    ///
    /// Only regular files are rounded up, and only when `exact` is unset.
    /// Devices have a fixed size and cannot grow.
    pub fn target_size(&self, exact: bool) -> u64 {
        if exact || !self.is_regular {
            self.original_size
        } else {
            round_up_to_block(self.original_size, self.block_size)
        }
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    pub fn into_file(self) -> File {
        self.file
    }
}

/// Round `size` up to the next multiple of `block`.
///
/// Zero is treated as already aligned, so empty files stay empty.
pub fn round_up_to_block(size: u64, block: u64) -> u64 {
    if size == 0 {
        return 0;
    }
    size + block - 1 - (size - 1) % block
}

/// Block size of the filesystem containing `path`, as reported by `statvfs(2)`.
#[cfg(unix)]
pub fn block_size(path: &Path) -> io::Result<u64> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // SAFETY: c_path is NUL-terminated and stat points to writable storage
    // large enough for a statvfs struct.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: statvfs returned 0, so the struct has been filled in.
    let stat = unsafe { stat.assume_init() };

    #[allow(clippy::useless_conversion)]
    let bsize = u64::from(stat.f_bsize);
    if bsize == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "filesystem reported a zero block size",
        ));
    }
    Ok(bsize)
}

#[cfg(not(unix))]
pub fn block_size(_path: &Path) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "filesystem block size query is only supported on unix",
    ))
}
