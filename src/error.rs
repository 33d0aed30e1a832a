//! Error taxonomy shared by every component.
//!
//! Filesystem failures are translated into these variants at each component boundary so that
//! callers can match on what went wrong rather than on raw `io::ErrorKind`s. Two variants,
//! [`Error::MissingReference`] and [`Error::WriteConflict`], describe per-item outcomes: batch
//! operations record them in their results and carry on instead of returning them.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
/// Every failure mode of splitting, indexing, writing and reconstructing.
pub enum Error {
    /// Input of the wrong shape: non-UTF-8 content, an empty path, a bad hash length.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The file or directory does not exist.
    #[error("Not found: {}", path.display())]
    NotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// The process lacks permission for the path.
    #[error("Permission denied: {}", path.display())]
    PermissionDenied {
        /// Path that was refused.
        path: PathBuf,
    },

    /// A file was expected but the path names a directory.
    #[error("Is a directory: {}", path.display())]
    IsADirectory {
        /// Offending directory path.
        path: PathBuf,
    },

    /// A single line exceeded the streaming line-length ceiling.
    #[error("Line {line} is {length} bytes long (max: {max})")]
    LineTooLong {
        /// 1-based line number of the offending line.
        line: usize,
        /// Bytes read before giving up.
        length: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// A 1-based inclusive line span that is empty or starts before line 1.
    #[error("Invalid line range: {start}..={end}")]
    InvalidRange {
        /// Requested first line.
        start: usize,
        /// Requested last line.
        end: usize,
    },

    /// A reference in an anchor document points at a hash with no file.
    #[error("Missing reference {hash}: {} does not exist", path.display())]
    MissingReference {
        /// Referenced content hash.
        hash: String,
        /// Where the section file was expected.
        path: PathBuf,
    },

    /// The target file exists and overwriting is disabled.
    #[error("File exists: {}", path.display())]
    WriteConflict {
        /// Existing file.
        path: PathBuf,
    },

    /// Any other filesystem failure.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    #[must_use]
    /// Translate an `io::Error` raised while touching `path` into the taxonomy.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::IsADirectory => Self::IsADirectory { path },
            io::ErrorKind::InvalidData => {
                Self::InvalidInput(format!("{} is not valid UTF-8 text", path.display()))
            }
            _ => Self::Io { path, source: err },
        }
    }

    #[must_use]
    /// Whether this error describes a per-item outcome that batches record instead of raising.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingReference { .. } | Self::WriteConflict { .. }
        )
    }
}

/// Reject empty paths before any filesystem call is attempted.
pub(crate) fn require_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidInput("path must not be empty".to_string()));
    }
    Ok(())
}

/// Ensure `path` names an existing regular file, returning its metadata.
pub(crate) fn require_file(path: &Path) -> Result<std::fs::Metadata> {
    require_path(path)?;
    let metadata = std::fs::metadata(path).map_err(|e| Error::from_io(e, path))?;
    if metadata.is_dir() {
        return Err(Error::IsADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(metadata)
}

#[cfg(test)]
#[path = "tests/error.rs"]
mod tests;
