//! Builder API for configuring and running a backup.
//!
//! The builder is a fluent front end over [`BackupOptions`], [`backup`] and
//! [`copy_tree`].
//!
//! # Examples
//!
//! ## Profile-aware backup
//!
//! ```no_run
//! use biggity::BackupBuilder;
//!
//! let stats = BackupBuilder::new("/mnt/windows", "/zfspool/1234_Doe, John").run()?;
//! println!("Transferred {} bytes", stats.bytes_copied());
//! # Ok::<(), biggity::Error>(())
//! ```
//!
//! ## Single pass with an ignore set
//!
//! ```no_run
//! use biggity::{BackupBuilder, IgnoreSet};
//!
//! let ignore: IgnoreSet = ["Windows", "pagefile.sys"].into_iter().collect();
//! let stats = BackupBuilder::new("/mnt/windows", "/backup/system")
//!     .abort_on_error()
//!     .copy_only(&ignore)?;
//! println!("Copied {} files", stats.files_copied);
//! # Ok::<(), biggity::Error>(())
//! ```

use crate::backup::{BackupStats, backup};
use crate::copy::{CopyStats, IgnoreSet, copy_tree};
use crate::error::Result;
use crate::options::{BackupOptions, FailurePolicy};
use crate::report::{NullReporter, Reporter};
use std::path::{Path, PathBuf};

/// A builder for configuring and running a backup.
///
/// Events go to a [`NullReporter`] unless [`reporter`](Self::reporter) is
/// called.
pub struct BackupBuilder<'r> {
    src: PathBuf,
    dst: PathBuf,
    options: BackupOptions,
    reporter: &'r dyn Reporter,
}

impl std::fmt::Debug for BackupBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupBuilder")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl BackupBuilder<'static> {
    /// Create a new `BackupBuilder` with default options.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: BackupOptions::default(),
            reporter: &NullReporter,
        }
    }
}

impl<'r> BackupBuilder<'r> {
    /// Send copy events to `reporter`.
    #[must_use]
    pub fn reporter<'n>(self, reporter: &'n dyn Reporter) -> BackupBuilder<'n> {
        BackupBuilder {
            src: self.src,
            dst: self.dst,
            options: self.options,
            reporter,
        }
    }

    /// Stop the whole backup on the first failed file.
    ///
    /// Long destination paths are still skipped.
    #[must_use]
    pub fn abort_on_error(mut self) -> Self {
        self.options = self.options.with_failure_policy(FailurePolicy::Abort);
        self
    }

    /// Skip failed files and keep going (default behavior).
    #[must_use]
    pub fn skip_errors(mut self) -> Self {
        self.options = self.options.with_failure_policy(FailurePolicy::Skip);
        self
    }

    /// Disable fsync after each file.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Don't preserve file timestamps.
    #[must_use]
    pub fn no_timestamps(mut self) -> Self {
        self.options = self.options.without_timestamps();
        self
    }

    /// Don't preserve file permissions.
    #[must_use]
    pub fn no_permissions(mut self) -> Self {
        self.options = self.options.without_permissions();
        self
    }

    /// Get the current options (for inspection).
    pub fn options(&self) -> &BackupOptions {
        &self.options
    }

    /// Run the profile-aware backup.
    ///
    /// # Errors
    ///
    /// See [`backup`].
    pub fn run(self) -> Result<BackupStats> {
        backup(&self.src, &self.dst, &self.options, self.reporter)
    }

    /// Run a single copy pass, pruning `ignore`, with no profile detection.
    ///
    /// # Errors
    ///
    /// See [`copy_tree`].
    pub fn copy_only(self, ignore: &IgnoreSet) -> Result<CopyStats> {
        copy_tree(&self.src, &self.dst, ignore, &self.options, self.reporter)
    }
}
