//! Reporting hooks for backup progress.
//!
//! The copy engine never writes log lines itself. Every event goes through a
//! [`Reporter`] supplied by the caller, who decides where the lines end up
//! (console, log file, progress bar, nowhere).

use crate::error::{Error, FailureKind};
use std::io;
use std::path::Path;

/// Why an entry was passed over without being copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry's relative path is in the ignore set (whole subtree pruned)
    Ignored,
    /// Symlink pointing at a directory; never followed
    SymlinkToDirectory,
    /// Symlink whose target does not exist
    BrokenSymlink,
    /// Socket, fifo, device node, ...
    SpecialFile,
}

impl SkipReason {
    /// Short label used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::SymlinkToDirectory => "symlink to directory",
            Self::BrokenSymlink => "broken symlink",
            Self::SpecialFile => "special file",
        }
    }
}

/// Sink for events emitted while backing up.
///
/// All methods default to doing nothing, so implementors only override what
/// they care about.
pub trait Reporter {
    /// A regular file is about to be copied.
    fn copy_started(&self, src: &Path, dst: &Path, size: u64) {
        let _ = (src, dst, size);
    }

    /// `src` was copied in full; `bytes` now count towards the total.
    fn copy_finished(&self, src: &Path, dst: &Path, bytes: u64) {
        let _ = (src, dst, bytes);
    }

    /// Copying `src` to `dst` failed. Called for tolerated failures and for
    /// the one that aborts a run.
    fn copy_failed(&self, src: &Path, dst: &Path, kind: FailureKind, error: &Error) {
        let _ = (src, dst, kind, error);
    }

    /// Owner access could not be restored on `path` after the backup.
    fn attributes_failed(&self, path: &Path, error: &io::Error) {
        let _ = (path, error);
    }

    /// An entry was not copied on purpose.
    fn entry_skipped(&self, path: &Path, reason: SkipReason) {
        let _ = (path, reason);
    }

    /// Free-form status line (mode detection, pass boundaries, ...).
    fn notice(&self, message: &str) {
        let _ = message;
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn copy_started(&self, src: &Path, dst: &Path, size: u64) {
        (**self).copy_started(src, dst, size);
    }

    fn copy_finished(&self, src: &Path, dst: &Path, bytes: u64) {
        (**self).copy_finished(src, dst, bytes);
    }

    fn copy_failed(&self, src: &Path, dst: &Path, kind: FailureKind, error: &Error) {
        (**self).copy_failed(src, dst, kind, error);
    }

    fn attributes_failed(&self, path: &Path, error: &io::Error) {
        (**self).attributes_failed(path, error);
    }

    fn entry_skipped(&self, path: &Path, reason: SkipReason) {
        (**self).entry_skipped(path, reason);
    }

    fn notice(&self, message: &str) {
        (**self).notice(message);
    }
}

/// Reporter that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Reporter that forwards events to the `tracing` macros.
///
/// Copy attempts and notices are logged at `INFO`, copy and attribute
/// failures at `WARN`, skipped entries at `DEBUG`.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

#[cfg(feature = "tracing")]
impl Reporter for TracingReporter {
    fn copy_started(&self, src: &Path, dst: &Path, size: u64) {
        tracing::info!("{} to {}, size {}", src.display(), dst.display(), size);
    }

    fn copy_failed(&self, src: &Path, dst: &Path, kind: FailureKind, error: &Error) {
        match kind {
            FailureKind::PathTooLong => {
                tracing::warn!("Error: filename {} too long, skipping...", dst.display());
            }
            _ => tracing::warn!(
                "Error: {} copying {} to {}: {}",
                kind,
                src.display(),
                dst.display(),
                error
            ),
        }
    }

    fn attributes_failed(&self, path: &Path, error: &io::Error) {
        tracing::warn!("Error: failed to fix attributes on {}: {}", path.display(), error);
    }

    fn entry_skipped(&self, path: &Path, reason: SkipReason) {
        tracing::debug!("skipping {} ({})", path.display(), reason.as_str());
    }

    fn notice(&self, message: &str) {
        tracing::info!("{}", message);
    }
}
