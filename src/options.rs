//! Configuration options for backup operations.
//!
//! This module provides [`BackupOptions`] for configuring copy behavior and
//! [`FailurePolicy`] for deciding what happens when a single file fails.
//!
//! # Example
//!
//! ```
//! use biggity::{BackupOptions, FailurePolicy};
//!
//! let options = BackupOptions::default()
//!     .with_failure_policy(FailurePolicy::Abort)
//!     .without_fsync();
//! ```

/// Behavior when copying a single file fails.
///
/// A destination path that is too long for the filesystem is always
/// skipped, whatever the policy. The policy covers every other failure:
/// destination directories that cannot be created, unreadable source
/// directories, and IO errors while copying.
///
/// # Default
///
/// The default is [`FailurePolicy::Skip`]: a backup salvages as much as it
/// can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailurePolicy {
    /// Report the failure, leave the file out of the byte total and keep
    /// walking.
    #[default]
    Skip,
    /// Report the failure and stop the whole run with an error.
    Abort,
}

/// Options for backup operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `failure_policy` | `Skip` | Keep going past failed files |
/// | `preserve_permissions` | `true` | Copy file permissions |
/// | `preserve_timestamps` | `true` | Copy file timestamps (mtime/atime) |
/// | `fsync` | `true` | Sync to disk after write |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackupOptions {
    /// What to do when a file cannot be copied
    pub failure_policy: FailurePolicy,

    /// Whether to preserve file permissions (default: true)
    pub preserve_permissions: bool,

    /// Whether to preserve file timestamps (default: true)
    ///
    /// Timestamps are applied after the copy and failures to set them are
    /// ignored.
    pub preserve_timestamps: bool,

    /// Whether to sync files to disk after writing (default: true)
    pub fsync: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Skip,
            preserve_permissions: true,
            preserve_timestamps: true,
            fsync: true,
        }
    }
}

impl BackupOptions {
    /// Set the failure policy
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Disable timestamp preservation
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Disable permission preservation
    ///
    /// Copied files then get the default umask permissions.
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }
}
