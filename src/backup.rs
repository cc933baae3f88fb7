//! Profile-aware backup.
//!
//! A source volume with a `Users` directory at its root is treated as a
//! Windows system volume: user profiles are copied first into `7Profiles`,
//! then everything else into `Root`. Any other source is mirrored as is.
//!
//! The destination names are what earlier backups used and what downstream
//! tooling expects; they are not configurable.

use crate::copy::{CopyStats, IgnoreSet, copy_subtree, copy_tree, validate_source};
use crate::error::{Error, Result};
use crate::options::BackupOptions;
use crate::report::Reporter;
use crate::utils::path::safe_path;
use std::fs;
use std::path::Path;

/// Directory at the source root whose presence triggers a profile backup.
pub const USERS_SRC_DIR: &str = "Users";

/// Destination subdirectory receiving the contents of `Users`.
pub const PROFILES_DEST_DIR: &str = "7Profiles";

/// Destination subdirectory receiving everything outside `Users`.
pub const ROOT_DEST_DIR: &str = "Root";

/// Which layout a backup used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackupMode {
    /// `Users` found: two passes into `7Profiles` and `Root`
    Profile,
    /// Single mirror of the source root
    Basic,
}

impl BackupMode {
    /// Lowercase name, used in summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Basic => "basic",
        }
    }
}

/// Statistics from [`backup`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackupStats {
    /// Layout that was detected
    pub mode: BackupMode,
    /// The `Users` -> `7Profiles` pass (profile mode only)
    pub profile: Option<CopyStats>,
    /// The root pass (the only pass in basic mode)
    pub root: CopyStats,
}

impl BackupStats {
    /// Both passes added together.
    pub fn total(&self) -> CopyStats {
        match &self.profile {
            Some(profile) => profile.merge(&self.root),
            None => self.root.clone(),
        }
    }

    /// Total bytes transferred across passes.
    pub fn bytes_copied(&self) -> u64 {
        self.total().bytes_copied
    }

    /// Total files copied across passes.
    pub fn files_copied(&self) -> u64 {
        self.total().files_copied
    }

    /// Total failed (skipped) files across passes.
    pub fn files_failed(&self) -> u64 {
        self.total().files_failed
    }
}

/// Decide the layout from the source's contents.
///
/// This looks at the volume being backed up, not at the host running the
/// backup: a Windows disk mounted on Linux is still a profile backup.
pub fn detect_mode(src: &Path) -> BackupMode {
    if src.join(USERS_SRC_DIR).is_dir() {
        BackupMode::Profile
    } else {
        BackupMode::Basic
    }
}

/// Back up `src` into `dst`.
///
/// In [`BackupMode::Profile`] the `Users` tree is copied to
/// `dst/7Profiles` first, then the rest of the root to `dst/Root` with
/// `Users` pruned, so profile data is never copied twice. In
/// [`BackupMode::Basic`] this is a plain [`copy_tree`] with nothing ignored.
///
/// # Example
///
/// ```no_run
/// use biggity::{backup, BackupOptions, NullReporter};
/// use std::path::Path;
///
/// let stats = backup(
///     Path::new("/mnt/windows"),
///     Path::new("/zfspool/1234_Doe, John"),
///     &BackupOptions::default(),
///     &NullReporter,
/// )?;
/// println!("Transferred {} bytes", stats.bytes_copied());
/// # Ok::<(), biggity::Error>(())
/// ```
///
/// # Errors
///
/// - Source does not exist or is not a directory (checked before anything
///   is written)
/// - `7Profiles` or `Root` cannot be created ([`Error::CreateDir`])
/// - Any error returned by [`copy_tree`]; under [`FailurePolicy::Abort`]
///   this includes an unreadable `Users` directory
///
/// [`FailurePolicy::Abort`]: crate::FailurePolicy::Abort
pub fn backup(
    src: &Path,
    dst: &Path,
    options: &BackupOptions,
    reporter: &dyn Reporter,
) -> Result<BackupStats> {
    let src = validate_source(src)?;

    match detect_mode(&src) {
        BackupMode::Profile => {
            reporter.notice("Windows primary partition detected, performing Windows backup...");

            let profiles_dst = dst.join(PROFILES_DEST_DIR);
            let root_dst = dst.join(ROOT_DEST_DIR);
            create_dir(&profiles_dst)?;
            create_dir(&root_dst)?;

            // Profiles first: they matter most to the customer. An unreadable
            // `Users` counts as one failure, like any other subdirectory.
            let profile = copy_subtree(
                &src.join(USERS_SRC_DIR),
                &profiles_dst,
                &IgnoreSet::new(),
                options,
                reporter,
            )?;

            let ignore: IgnoreSet = [USERS_SRC_DIR].into_iter().collect();
            let root = copy_tree(&src, &root_dst, &ignore, options, reporter)?;

            Ok(BackupStats {
                mode: BackupMode::Profile,
                profile: Some(profile),
                root,
            })
        }
        BackupMode::Basic => {
            reporter.notice(
                "Windows primary partition not detected, performing basic backup...",
            );
            let root = copy_tree(&src, dst, &IgnoreSet::new(), options, reporter)?;
            Ok(BackupStats {
                mode: BackupMode::Basic,
                profile: None,
                root,
            })
        }
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(safe_path(dir)).map_err(|e| Error::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })
}
