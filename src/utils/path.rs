//! Path utilities for cross-platform compatibility.
//!
//! Windows refuses paths over 260 characters (MAX_PATH) unless they use the
//! extended-length `\\?\` syntax. Backups of deep user profiles hit that
//! limit routinely, so every destination path goes through [`safe_path`]
//! before it reaches the filesystem. Paths that are still too long after
//! that surface as a path-too-long failure and are skipped.

use std::path::{Path, PathBuf};

/// Convert a path to the extended-length format (`\\?\C:\...`).
///
/// - `C:\path` becomes `\\?\C:\path`
/// - `\\server\share\path` becomes `\\?\UNC\server\share\path`
/// - already-extended paths are returned unchanged
/// - relative paths are made absolute first
#[cfg(windows)]
pub(crate) fn to_extended_length_path(path: &Path) -> PathBuf {
    let path_str = path.as_os_str().to_string_lossy();
    if path_str.starts_with(r"\\?\") {
        return path.to_path_buf();
    }

    if let Some(unc) = path_str.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{}", unc));
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    PathBuf::from(format!(r"\\?\{}", absolute.display()))
}

/// Convert a path for use with file operations.
///
/// Extended-length format on Windows, unchanged elsewhere.
#[cfg(windows)]
pub(crate) fn safe_path(path: &Path) -> PathBuf {
    to_extended_length_path(path)
}

/// Convert a path for use with file operations.
///
/// On non-Windows platforms, this simply returns a clone of the input path.
#[cfg(not(windows))]
pub(crate) fn safe_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
