//! Recursive directory copy.
//!
//! The walk is sequential and depth-first: each entry of a directory is
//! handled as soon as it is read, subdirectories are descended into when
//! met. Ignored subpaths are pruned before their directory is ever opened,
//! and destination directories are only created as parents of a file that
//! is actually copied, so empty source directories leave no trace.

use crate::error::{Error, FailureKind, Result};
use crate::options::{BackupOptions, FailurePolicy};
use crate::report::{Reporter, SkipReason};
use crate::utils::path::safe_path;
use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::file::copy_file;
use super::utils::{EntryKind, classify_entry};

/// Paths, relative to the source root, whose whole subtree is left out.
///
/// Matching is exact and component-wise (`Users` matches `Users/` but not
/// `users` or `Users/Public`); there is no glob syntax.
///
/// # Example
///
/// ```
/// use biggity::IgnoreSet;
/// use std::path::Path;
///
/// let ignore: IgnoreSet = ["Users", "Windows/Temp"].into_iter().collect();
/// assert!(ignore.contains(Path::new("Windows/Temp")));
/// assert!(!ignore.contains(Path::new("Windows")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet(HashSet<PathBuf>);

impl IgnoreSet {
    /// Create an empty ignore set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relative path. Returns `false` if it was already present.
    pub fn insert<P: Into<PathBuf>>(&mut self, rel: P) -> bool {
        self.0.insert(rel.into())
    }

    /// Whether `rel` is ignored.
    pub fn contains(&self, rel: &Path) -> bool {
        self.0.contains(rel)
    }

    /// Whether nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ignored paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Statistics from one copy pass.
///
/// Returned by [`copy_tree`]. `bytes_copied` only counts files whose copy
/// finished; failed files are never included, whatever the failure.
///
/// # Example
///
/// ```no_run
/// use biggity::{copy_tree, BackupOptions, IgnoreSet, NullReporter};
/// use std::path::Path;
///
/// let stats = copy_tree(
///     Path::new("/mnt/source"),
///     Path::new("/backup/1234_Doe, John"),
///     &IgnoreSet::new(),
///     &BackupOptions::default(),
///     &NullReporter,
/// )?;
/// println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
/// # Ok::<(), biggity::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyStats {
    /// Number of files successfully copied
    pub files_copied: u64,
    /// Number of files (or unreadable directories) that failed and were skipped
    pub files_failed: u64,
    /// Number of destination directories created
    pub dirs_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Duration of the copy pass
    pub duration: Duration,
}

impl CopyStats {
    /// Combine the counters of two passes.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            files_copied: self.files_copied + other.files_copied,
            files_failed: self.files_failed + other.files_failed,
            dirs_created: self.dirs_created + other.dirs_created,
            bytes_copied: self.bytes_copied + other.bytes_copied,
            duration: self.duration + other.duration,
        }
    }
}

/// Copy every regular file under `src` to the same relative location under
/// `dst`.
///
/// # Arguments
///
/// * `src` - Source root, must be an existing directory
/// * `dst` - Destination root, created on demand
/// * `ignore` - Paths relative to `src` to prune
/// * `options` - Copy options
/// * `reporter` - Receives one event per attempted file and per failure
///
/// # Behavior
///
/// - Only regular files (and symlinks to regular files) are copied
/// - Directories are created lazily, as parents of copied files
/// - A destination path that is too long is always skipped
/// - Other per-file failures follow [`BackupOptions::failure_policy`]
/// - Existing destination files not in the source are left alone
///
/// # Errors
///
/// Returns an error if:
/// - Source does not exist ([`Error::SourceNotFound`])
/// - Source is not a directory ([`Error::NotADirectory`])
/// - The source root cannot be listed ([`Error::ReadDir`])
/// - A file fails under [`FailurePolicy::Abort`] ([`Error::Copy`],
///   [`Error::CreateDir`] or [`Error::ReadDir`])
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    ignore: &IgnoreSet,
    options: &BackupOptions,
    reporter: &dyn Reporter,
) -> Result<CopyStats> {
    let src = validate_source(src)?;
    run_pass(&src, dst, ignore, options, reporter, RootRead::Fatal)
}

/// Copy a subtree of an already validated source.
///
/// Unlike [`copy_tree`], a root that cannot be listed is treated like any
/// other unreadable directory: reported, then skipped or fatal per
/// [`BackupOptions::failure_policy`].
pub(crate) fn copy_subtree(
    src: &Path,
    dst: &Path,
    ignore: &IgnoreSet,
    options: &BackupOptions,
    reporter: &dyn Reporter,
) -> Result<CopyStats> {
    let src = std::path::absolute(src)?;
    run_pass(&src, dst, ignore, options, reporter, RootRead::PerPolicy)
}

/// How a failure to list the pass root is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootRead {
    Fatal,
    PerPolicy,
}

fn run_pass(
    src: &Path,
    dst: &Path,
    ignore: &IgnoreSet,
    options: &BackupOptions,
    reporter: &dyn Reporter,
    root_read: RootRead,
) -> Result<CopyStats> {
    let start_time = Instant::now();
    let dst = std::path::absolute(dst)?;

    let mut walk = TreeWalk {
        root: src,
        dst_root: &dst,
        ignore,
        options,
        reporter,
        stats: CopyStats::default(),
    };

    match root_read {
        RootRead::Fatal => {
            let entries = fs::read_dir(src).map_err(|e| Error::ReadDir {
                path: src.to_path_buf(),
                source: e,
            })?;
            walk.walk_entries(src, entries)?;
        }
        RootRead::PerPolicy => walk.walk_dir(src)?,
    }

    let mut stats = walk.stats;
    stats.duration = start_time.elapsed();
    Ok(stats)
}

/// Check the source preconditions and return it as an absolute path.
pub(crate) fn validate_source(src: &Path) -> Result<PathBuf> {
    if !src.exists() {
        return Err(Error::SourceNotFound(src.to_path_buf()));
    }

    if !src.is_dir() {
        return Err(Error::NotADirectory(src.to_path_buf()));
    }

    Ok(std::path::absolute(src)?)
}

/// State of one copy pass.
struct TreeWalk<'a> {
    root: &'a Path,
    dst_root: &'a Path,
    ignore: &'a IgnoreSet,
    options: &'a BackupOptions,
    reporter: &'a dyn Reporter,
    stats: CopyStats,
}

impl TreeWalk<'_> {
    fn walk_entries(&mut self, dir: &Path, entries: fs::ReadDir) -> Result<()> {
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let error = Error::ReadDir {
                        path: dir.to_path_buf(),
                        source: e,
                    };
                    self.failed(dir, &self.dst_path(dir), error)?;
                    continue;
                }
            };
            let path = entry.path();
            let rel = self.relative(&path);

            if self.ignore.contains(&rel) {
                self.reporter.entry_skipped(&path, SkipReason::Ignored);
                continue;
            }

            match classify_entry(&entry) {
                Ok(EntryKind::Directory) => self.walk_dir(&path)?,
                Ok(EntryKind::File(meta)) => self.copy_one(&path, &rel, &meta)?,
                Ok(EntryKind::Skip(reason)) => self.reporter.entry_skipped(&path, reason),
                Err(e) => self.failed(&path, &self.dst_root.join(&rel), Error::Io(e))?,
            }
        }

        Ok(())
    }

    fn walk_dir(&mut self, dir: &Path) -> Result<()> {
        match fs::read_dir(dir) {
            Ok(entries) => self.walk_entries(dir, entries),
            Err(e) => {
                let error = Error::ReadDir {
                    path: dir.to_path_buf(),
                    source: e,
                };
                self.failed(dir, &self.dst_path(dir), error)
            }
        }
    }

    fn copy_one(&mut self, src: &Path, rel: &Path, meta: &Metadata) -> Result<()> {
        let dst = self.dst_root.join(rel);
        let dst_parent = match rel.parent() {
            Some(parent) => self.dst_root.join(parent),
            None => self.dst_root.to_path_buf(),
        };

        if let Err(error) = self.ensure_dir(&dst_parent) {
            return self.failed(src, &dst, error);
        }

        let size = meta.len();
        self.reporter.copy_started(src, &dst, size);

        match copy_file(src, meta, &dst, self.options) {
            Ok(_) => {
                self.reporter.copy_finished(src, &dst, size);
                self.stats.files_copied += 1;
                self.stats.bytes_copied += size;
                Ok(())
            }
            Err(e) => {
                let error = Error::Copy {
                    src: src.to_path_buf(),
                    dst: dst.clone(),
                    source: Box::new(e),
                };
                self.failed(src, &dst, error)
            }
        }
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<()> {
        let safe_dir = safe_path(dir);
        if safe_dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&safe_dir).map_err(|e| Error::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        self.stats.dirs_created += 1;
        Ok(())
    }

    /// Report a failure and decide whether the walk goes on.
    fn failed(&mut self, src: &Path, dst: &Path, error: Error) -> Result<()> {
        let kind = FailureKind::classify(&error);
        let error = match kind {
            FailureKind::PathTooLong => error.into_path_too_long(dst),
            _ => error,
        };
        self.reporter.copy_failed(src, dst, kind, &error);

        if kind != FailureKind::PathTooLong && self.options.failure_policy == FailurePolicy::Abort {
            return Err(error);
        }

        self.stats.files_failed += 1;
        Ok(())
    }

    fn dst_path(&self, src: &Path) -> PathBuf {
        self.dst_root.join(self.relative(src))
    }

    /// Paths handed out by `read_dir` on an absolute root are absolute and
    /// always under the root.
    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

// =============================================================================
// Tests
// =============================================================================
