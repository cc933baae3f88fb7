//! Error types for biggity.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during a backup, the [`Result`] type alias, and the
//! [`FailureKind`] classification used to decide whether a single failed
//! file aborts the run.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Validation | [`Error::SourceNotFound`], [`Error::NotADirectory`] |
//! | Per-file | [`Error::PathTooLong`], [`Error::CreateDir`], [`Error::Copy`] |
//! | Atomic write | [`Error::TempFile`], [`Error::Persist`] |
//! | Traversal | [`Error::ReadDir`] |
//! | IO | [`Error::Io`] |

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for biggity operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates that a path or file name is too long.
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENAMETOOLONG` |
/// | Windows | `ERROR_FILENAME_EXCED_RANGE` (206) |
///
/// # Example
///
/// ```no_run
/// use std::fs;
/// use biggity::is_name_too_long_error;
///
/// if let Err(e) = fs::create_dir_all("/some/very/deep/path") {
///     if is_name_too_long_error(&e) {
///         println!("path too long, skipping");
///     }
/// }
/// ```
pub fn is_name_too_long_error(error: &io::Error) -> bool {
    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == libc::ENAMETOOLONG;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_FILENAME_EXCED_RANGE: i32 = 206;
            return raw_error == ERROR_FILENAME_EXCED_RANGE;
        }
    }

    false
}

/// Errors that can occur during backup operations.
///
/// All errors include relevant path information so that the log shows
/// exactly which file or directory was involved.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source is not a directory
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Destination path exceeds the filesystem's length limits
    #[error("Path too long: {path}: {source}")]
    PathTooLong {
        /// Destination path that could not be created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to create a destination directory
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to copy a single file
    #[error("Failed to copy {src} to {dst}: {source}")]
    Copy {
        /// Source file
        src: PathBuf,
        /// Destination file
        dst: PathBuf,
        /// Underlying error
        source: Box<Error>,
    },

    /// Failed to list a source directory
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        /// Directory that could not be read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to create temporary file
    #[error("Failed to create temporary file in {path}: {source}")]
    TempFile {
        /// Directory where temp file creation was attempted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to persist temporary file
    #[error("Failed to persist temporary file to {path}: {source}")]
    Persist {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl Error {
    /// The underlying IO error, if this error wraps one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io(e) => Some(e),
            Self::PathTooLong { source, .. }
            | Self::CreateDir { source, .. }
            | Self::ReadDir { source, .. }
            | Self::TempFile { source, .. }
            | Self::Persist { source, .. } => Some(source),
            Self::Copy { source, .. } => source.io_error(),
            Self::SourceNotFound(_) | Self::NotADirectory(_) => None,
        }
    }

    /// Take ownership of the wrapped IO error, or hand `self` back.
    fn into_io_error(self) -> std::result::Result<io::Error, Self> {
        match self {
            Self::Io(e)
            | Self::PathTooLong { source: e, .. }
            | Self::CreateDir { source: e, .. }
            | Self::ReadDir { source: e, .. }
            | Self::TempFile { source: e, .. }
            | Self::Persist { source: e, .. } => Ok(e),
            Self::Copy { src, dst, source } => (*source).into_io_error().map_err(|inner| Self::Copy {
                src,
                dst,
                source: Box::new(inner),
            }),
            other => Err(other),
        }
    }

    /// Rewrap a too-long failure as [`Error::PathTooLong`] for `path`.
    ///
    /// Errors without an underlying IO error are returned unchanged.
    pub(crate) fn into_path_too_long(self, path: &Path) -> Self {
        if matches!(self, Self::PathTooLong { .. }) {
            return self;
        }
        match self.into_io_error() {
            Ok(source) => Self::PathTooLong {
                path: path.to_path_buf(),
                source,
            },
            Err(error) => error,
        }
    }
}

/// Classification of a failed per-file copy attempt.
///
/// The tree copier uses this to decide, per attempt, whether to keep going
/// or to stop the whole run (see [`FailurePolicy`](crate::FailurePolicy)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    /// The destination path is too long for the filesystem. Always tolerated.
    PathTooLong,
    /// A destination directory could not be created.
    DestinationUncreatable,
    /// A source directory could not be listed.
    Unreadable,
    /// Any other IO failure while copying.
    Io,
}

impl FailureKind {
    /// Classify an error produced while processing one entry.
    pub fn classify(error: &Error) -> Self {
        if error.io_error().is_some_and(is_name_too_long_error) {
            return Self::PathTooLong;
        }
        match error {
            Error::PathTooLong { .. } => Self::PathTooLong,
            Error::CreateDir { .. } => Self::DestinationUncreatable,
            Error::ReadDir { .. } => Self::Unreadable,
            Error::Copy { source, .. } => Self::classify(source),
            _ => Self::Io,
        }
    }

    /// Short label used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PathTooLong => "path too long",
            Self::DestinationUncreatable => "destination uncreatable",
            Self::Unreadable => "unreadable",
            Self::Io => "io error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
