//! # biggity
//!
//! Best-effort file-tree backup with Windows user-profile detection.
//!
//! ## Core Features
//!
//! - **Mirror copy**: every regular file lands at the same relative path under the destination
//! - **Pruning**: subpaths in an [`IgnoreSet`] are skipped without being read
//! - **No empty directories**: destination directories are created only for files actually copied
//! - **Best effort**: too-long destination paths are always skipped, other failures per [`FailurePolicy`]
//! - **Byte accounting**: only files that were fully copied count towards the total
//! - **Profile backups**: a `Users` directory at the source root splits the backup into `7Profiles` and `Root`
//! - **Atomic writes**: temp file + rename, so no partial files under their final name
//! - **Append-only destination**: nothing already in the destination is deleted
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use biggity::BackupBuilder;
//!
//! let stats = BackupBuilder::new("/mnt/windows", "/zfspool/1234_Doe, John").run()?;
//! println!("Transferred {} MB", stats.bytes_copied() / 1024 / 1024);
//! # Ok::<(), biggity::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use biggity::{backup, BackupOptions, FailurePolicy, NullReporter};
//! use std::path::Path;
//!
//! let options = BackupOptions::default()
//!     .with_failure_policy(FailurePolicy::Abort)
//!     .without_fsync();
//!
//! let stats = backup(Path::new("/mnt/src"), Path::new("/backup"), &options, &NullReporter)?;
//! println!("{:?} backup: {} files", stats.mode, stats.files_copied());
//! # Ok::<(), biggity::Error>(())
//! ```
//!
//! ## Reporting
//!
//! The library never logs on its own. Pass a [`Reporter`] to receive one
//! event per attempted file, per failure and per skipped entry. With the
//! `tracing` feature, [`TracingReporter`] forwards them to `tracing`.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Spinner support with indicatif |
//! | `tracing` | [`Reporter`] backed by the tracing crate |
//! | `serde` | Serialize/Deserialize for options and stats |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod backup;
mod builder;
mod copy;
mod error;
mod finalize;
mod options;
mod report;
mod utils;

#[cfg(feature = "progress")]
mod progress;

#[cfg(windows)]
mod win_attrs;

pub use backup::{
    BackupMode, BackupStats, PROFILES_DEST_DIR, ROOT_DEST_DIR, USERS_SRC_DIR, backup, detect_mode,
};
pub use builder::BackupBuilder;
pub use copy::{CopyStats, IgnoreSet, copy_tree};
pub use error::{Error, FailureKind, Result, is_name_too_long_error};
pub use finalize::{fix_attributes, sync_filesystems};
pub use options::{BackupOptions, FailurePolicy};
pub use report::{NullReporter, Reporter, SkipReason};

#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub use report::TracingReporter;

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::create_spinner;
