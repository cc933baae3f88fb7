//! Post-backup cleanup of the destination tree.
//!
//! Copied files keep whatever restrictive bits they had on the source
//! volume (read-only profile files, hidden system files). [`fix_attributes`]
//! makes the whole backup readable and writable by its owner, and
//! [`sync_filesystems`] flushes pending writes before the drive is unplugged.

use crate::error::Result;
use crate::report::Reporter;
use std::fs;
use std::path::Path;

/// Make every entry under `dst` (including `dst`) accessible to its owner.
///
/// - Unix: adds `u+rw` to files and `u+rwx` to directories
/// - Windows: clears the READONLY, HIDDEN and SYSTEM attributes
///
/// Symlinks are left alone. Entries that cannot be read or changed are
/// reported through [`Reporter::attributes_failed`] and skipped.
///
/// Returns the number of entries that were changed.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if `dst` does not exist.
pub fn fix_attributes(dst: &Path, reporter: &dyn Reporter) -> Result<u64> {
    // Surface a missing destination instead of silently fixing nothing
    fs::symlink_metadata(dst)?;

    let mut changed = 0u64;
    fix_recursive(dst, reporter, &mut changed);
    Ok(changed)
}

fn fix_recursive(path: &Path, reporter: &dyn Reporter, changed: &mut u64) {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            reporter.attributes_failed(path, &e);
            return;
        }
    };
    if meta.file_type().is_symlink() {
        return;
    }

    // Fix the directory itself first so it can be listed
    match fix_one(path, &meta) {
        Ok(true) => *changed += 1,
        Ok(false) => {}
        Err(e) => reporter.attributes_failed(path, &e),
    }

    if !meta.is_dir() {
        return;
    }

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            reporter.attributes_failed(path, &e);
            return;
        }
    };
    for entry in entries {
        match entry {
            Ok(entry) => fix_recursive(&entry.path(), reporter, changed),
            Err(e) => reporter.attributes_failed(path, &e),
        }
    }
}

#[cfg(unix)]
fn fix_one(path: &Path, meta: &fs::Metadata) -> std::io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let wanted = if meta.is_dir() { 0o700 } else { 0o600 };
    let mode = meta.permissions().mode();
    if mode & wanted == wanted {
        return Ok(false);
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode | wanted))?;
    Ok(true)
}

#[cfg(windows)]
fn fix_one(path: &Path, _meta: &fs::Metadata) -> std::io::Result<bool> {
    crate::win_attrs::clear_attributes(path)
}

#[cfg(not(any(unix, windows)))]
fn fix_one(_path: &Path, _meta: &fs::Metadata) -> std::io::Result<bool> {
    Ok(false)
}

/// Flush unwritten filesystem data to disk.
///
/// Calls `sync(2)`.
#[cfg(unix)]
pub fn sync_filesystems() {
    // SAFETY: sync(2) takes no arguments and cannot fail
    unsafe { libc::sync() }
}

/// Flush unwritten filesystem data to disk.
///
/// Windows flushes on handle close, so this is a no-op.
#[cfg(not(unix))]
pub fn sync_filesystems() {}
