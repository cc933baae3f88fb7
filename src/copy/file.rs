//! Single file copy.
//!
//! Content is written to a temporary file next to the destination and then
//! renamed into place, so an interrupted backup never leaves a truncated
//! file under the final name.

use crate::error::{Error, Result};
use crate::options::BackupOptions;
use crate::utils::path::safe_path;
use std::fs::{self, File, Metadata};
use std::path::Path;

use super::utils::{copy_file_contents, preserve_timestamps};

/// Copy `src` to `dst`, replacing any file already at `dst`.
///
/// `src_meta` is the metadata the caller already read (following symlinks),
/// so the size reported to the log is the size accounted for.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// - Source cannot be opened or read ([`Error::Io`])
/// - Temp file creation fails ([`Error::TempFile`])
/// - The final rename fails ([`Error::Persist`])
pub(crate) fn copy_file(
    src: &Path,
    src_meta: &Metadata,
    dst: &Path,
    options: &BackupOptions,
) -> Result<u64> {
    let src_file = File::open(src)?;

    let dst_parent = dst.parent().unwrap_or(Path::new("."));
    let safe_dst_parent = safe_path(dst_parent);

    let temp_file = new_temp_file(&safe_dst_parent, options).map_err(|e| Error::TempFile {
        path: dst_parent.to_path_buf(),
        source: e,
    })?;

    let bytes_copied = copy_file_contents(&src_file, temp_file.as_file(), src_meta.len())?;

    if options.fsync {
        temp_file.as_file().sync_all()?;
    }

    if options.preserve_permissions {
        fs::set_permissions(temp_file.path(), src_meta.permissions())?;
    }

    // Plain rename: an existing destination file is replaced, never compared
    temp_file
        .persist(safe_path(dst))
        .map_err(|e| Error::Persist {
            path: dst.to_path_buf(),
            source: e.error,
        })?;

    if options.preserve_timestamps {
        // Best-effort only
        let _ = preserve_timestamps(src_meta, &safe_path(dst));
    }

    Ok(bytes_copied)
}

fn new_temp_file(dir: &Path, options: &BackupOptions) -> std::io::Result<tempfile::NamedTempFile> {
    #[cfg(unix)]
    if !options.preserve_permissions {
        use std::os::unix::fs::PermissionsExt;
        // 0o666 lets the umask decide, like a freshly created file
        return tempfile::Builder::new()
            .permissions(fs::Permissions::from_mode(0o666))
            .tempfile_in(dir);
    }
    #[cfg(not(unix))]
    let _ = options;

    tempfile::NamedTempFile::new_in(dir)
}

// =============================================================================
// Tests
// =============================================================================
