//! Windows file attribute clearing.
//!
//! Files copied off a Windows system volume often carry READONLY, HIDDEN or
//! SYSTEM attributes, which make the backup awkward to browse and restore.
//! After a backup those three bits are cleared on every entry, leaving
//! filesystem-managed attributes (DIRECTORY, COMPRESSED, ENCRYPTED, ...)
//! untouched.

use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use crate::utils::path::to_extended_length_path;

use windows::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_NORMAL, FILE_FLAGS_AND_ATTRIBUTES, GetFileAttributesW, SetFileAttributesW,
};

// INVALID_FILE_ATTRIBUTES is ((DWORD)-1); the `windows` crate does not export it.
const INVALID_FILE_ATTRIBUTES: u32 = u32::MAX;

/// READONLY (0x1) | HIDDEN (0x2) | SYSTEM (0x4)
const CLEAR_MASK: u32 = 0x1 | 0x2 | 0x4;

#[inline]
fn path_to_wide(path: &Path) -> Vec<u16> {
    to_extended_length_path(path)
        .as_os_str()
        .encode_wide()
        .chain(Some(0))
        .collect()
}

/// Raw attribute `DWORD` of `path`.
pub(crate) fn get_attributes(path: &Path) -> io::Result<u32> {
    let wide = path_to_wide(path);
    // SAFETY: `wide` is a valid null-terminated wide string
    let attrs = unsafe { GetFileAttributesW(windows::core::PCWSTR(wide.as_ptr())) };

    if attrs == INVALID_FILE_ATTRIBUTES {
        Err(io::Error::last_os_error())
    } else {
        Ok(attrs)
    }
}

fn set_raw_attributes(path: &Path, attrs: u32) -> io::Result<()> {
    let wide = path_to_wide(path);
    // SAFETY: `wide` is a valid null-terminated wide string
    let result = unsafe {
        SetFileAttributesW(
            windows::core::PCWSTR(wide.as_ptr()),
            FILE_FLAGS_AND_ATTRIBUTES(attrs),
        )
    };
    result.map_err(|_| io::Error::last_os_error())
}

/// Clear READONLY, HIDDEN and SYSTEM on `path`.
///
/// Returns `true` if anything changed.
pub(crate) fn clear_attributes(path: &Path) -> io::Result<bool> {
    let current = get_attributes(path)?;
    if current & CLEAR_MASK == 0 {
        return Ok(false);
    }

    let cleared = current & !CLEAR_MASK;
    // Windows wants at least one bit set
    let cleared = if cleared == 0 {
        FILE_ATTRIBUTE_NORMAL.0
    } else {
        cleared
    };

    set_raw_attributes(path, cleared)?;
    Ok(true)
}
