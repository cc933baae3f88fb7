//! Progress reporting support (requires `progress` feature)

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for a backup whose total size is not known up front.
///
/// The position is meant to be the number of bytes copied so far.
#[must_use]
pub fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {bytes} copied ({bytes_per_sec}) {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
