use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by a shred invocation.
///
/// Every failure is terminal for the invocation that produced it. A target
/// whose shred failed is left partially overwritten and is never deleted.
#[derive(Debug, Error)]
pub enum ShredError {
    /// Path missing, permission denied, or the write-only open failed
    #[error("can't open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Metadata query on the open handle failed
    #[error("can't get info of {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directories are never shredded
    #[error("{} should be a file not a directory", path.display())]
    NotAFile { path: PathBuf },

    /// Seeking failed (pipes, FIFOs and sockets land here)
    #[error("can't seek {}: {source}", path.display())]
    Seek {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Filesystem statistics query failed
    #[error("can't get block size of {}: {source}", path.display())]
    BlockSize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Entropy source could not provide a full seed
    #[error("can't initialize randomness source {source_name}: {source}")]
    Entropy {
        source_name: String,
        #[source]
        source: io::Error,
    },

    #[error("can't write to {} at offset {offset}: {source}", path.display())]
    Write {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("can't sync {}: {source}", path.display())]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't close {}: {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't remove {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShredError {
    pub fn open(path: &Path, source: io::Error) -> Self {
        Self::Open { path: path.to_path_buf(), source }
    }

    pub fn stat(path: &Path, source: io::Error) -> Self {
        Self::Stat { path: path.to_path_buf(), source }
    }

    pub fn not_a_file(path: &Path) -> Self {
        Self::NotAFile { path: path.to_path_buf() }
    }

    pub fn seek(path: &Path, source: io::Error) -> Self {
        Self::Seek { path: path.to_path_buf(), source }
    }

    pub fn block_size(path: &Path, source: io::Error) -> Self {
        Self::BlockSize { path: path.to_path_buf(), source }
    }

    pub fn entropy(source_name: impl Into<String>, source: io::Error) -> Self {
        Self::Entropy {
            source_name: source_name.into(),
            source,
        }
    }

    pub fn write(path: &Path, offset: u64, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            offset,
            source,
        }
    }

    pub fn sync(path: &Path, source: io::Error) -> Self {
        Self::Sync { path: path.to_path_buf(), source }
    }

    pub fn close(path: &Path, source: io::Error) -> Self {
        Self::Close { path: path.to_path_buf(), source }
    }

    pub fn delete(path: &Path, source: io::Error) -> Self {
        Self::Delete { path: path.to_path_buf(), source }
    }

    /// Path of the target the failure relates to.
    ///
    /// `None` for entropy failures, which concern the randomness source
    /// rather than the target.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Open { path, .. }
            | Self::Stat { path, .. }
            | Self::NotAFile { path }
            | Self::Seek { path, .. }
            | Self::BlockSize { path, .. }
            | Self::Write { path, .. }
            | Self::Sync { path, .. }
            | Self::Close { path, .. }
            | Self::Delete { path, .. } => Some(path),
            Self::Entropy { .. } => None,
        }
    }
}

pub type Result<T, E = ShredError> = std::result::Result<T, E>;
