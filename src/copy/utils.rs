//! Helpers shared by the tree walk and the single-file copy.
//!
//! Entry classification, content copying and timestamp handling live here
//! so that `tree.rs` only deals with the walk itself.

use filetime::{FileTime, set_file_times};
use std::fs::{self, DirEntry, File, Metadata};
use std::io::{self, BufReader};
use std::path::Path;

use crate::report::SkipReason;

// =============================================================================
// Entry classification
// =============================================================================

/// What the walker should do with one directory entry.
#[derive(Debug)]
pub(crate) enum EntryKind {
    /// Real directory: recurse into it
    Directory,
    /// Regular file, or a symlink resolving to one: copy it
    File(Metadata),
    /// Anything else: report and move on
    Skip(SkipReason),
}

/// Classify a directory entry without following directory symlinks.
///
/// Symlinks are resolved once: a link to a regular file is treated as that
/// file, a link to a directory is never descended into.
pub(crate) fn classify_entry(entry: &DirEntry) -> io::Result<EntryKind> {
    let file_type = entry.file_type()?;

    if file_type.is_dir() {
        return Ok(EntryKind::Directory);
    }

    if file_type.is_symlink() {
        return Ok(match fs::metadata(entry.path()) {
            Ok(target) if target.is_file() => EntryKind::File(target),
            Ok(target) if target.is_dir() => EntryKind::Skip(SkipReason::SymlinkToDirectory),
            Ok(_) => EntryKind::Skip(SkipReason::SpecialFile),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                EntryKind::Skip(SkipReason::BrokenSymlink)
            }
            Err(e) => return Err(e),
        });
    }

    if file_type.is_file() {
        return Ok(EntryKind::File(entry.metadata()?));
    }

    Ok(EntryKind::Skip(SkipReason::SpecialFile))
}

// =============================================================================
// File content copying
// =============================================================================

/// Copy the whole content of `src` into `dst`.
///
/// On Linux this goes through `copy_file_range(2)` so data stays in the
/// kernel; other platforms (and filesystems that refuse the syscall) use a
/// buffered `io::copy`.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        match copy_file_range_all(src, dst, len) {
            Ok(Some(copied)) => return Ok(copied),
            Ok(None) => {}
            Err(e) => return Err(e),
        }
    }
    #[cfg(not(target_os = "linux"))]
    let _ = len;

    io::copy(&mut BufReader::new(src), &mut &*dst)
}

/// Returns `Ok(None)` when the kernel cannot do the copy and nothing has
/// been written yet, so the caller can fall back to userspace.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File, len: u64) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: u64 = 64 * 1024 * 1024;

    let mut copied: u64 = 0;
    while copied < len {
        let chunk = (len - copied).min(CHUNK) as usize;

        // SAFETY: both descriptors are open for the lifetime of the borrows
        // and null offsets mean "use and advance the file position".
        let n = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };

        if n < 0 {
            let err = io::Error::last_os_error();
            let unsupported = matches!(
                err.raw_os_error(),
                Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
            );
            if copied == 0 && unsupported {
                return Ok(None);
            }
            return Err(err);
        }

        // Source shrank under us
        if n == 0 {
            break;
        }
        copied += n as u64;
    }

    Ok(Some(copied))
}

// =============================================================================
// Metadata
// =============================================================================

/// Set `dst`'s access and modification times to those of the source.
pub(crate) fn preserve_timestamps(src_meta: &Metadata, dst: &Path) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(src_meta);
    let atime = FileTime::from_last_access_time(src_meta);
    set_file_times(dst, atime, mtime)
}
