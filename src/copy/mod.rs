//! Core copy operations.
//!
//! This module provides the sequential tree walk that mirrors a source
//! directory into a destination directory, and the atomic single-file copy
//! it is built on.

mod file;
mod tree;
mod utils;

// Re-export public API
pub use tree::{CopyStats, IgnoreSet, copy_tree};

pub(crate) use tree::{copy_subtree, validate_source};
