//! Common test utilities for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TICKET: &str = "1234";
pub const NAME: &str = "Doe, John";

/// A source volume and a destination root, both temporary.
pub struct BackupFixture {
    pub src: TempDir,
    pub root: TempDir,
}

impl BackupFixture {
    /// Create a new fixture with an empty source and destination root.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            root: TempDir::new().expect("Failed to create temp dest root"),
        }
    }

    /// Write `content` to `rel` under the source, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.src.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
        self
    }

    /// Lay out a small Windows system volume with two user profiles.
    pub fn windows_volume(&self) -> &Self {
        self.write("Users/alice/Documents/report.docx", "quarterly")
            .write("Users/bob/Desktop/todo.txt", "call mom")
            .write("Windows/System32/drivers/etc/hosts", "127.0.0.1 localhost")
            .write("bootmgr", "boot")
    }

    /// Ticket directory the backup ends up in.
    pub fn backup_dir(&self) -> PathBuf {
        self.root.path().join(format!("{TICKET}_{NAME}"))
    }

    pub fn log_contents(&self) -> String {
        fs::read_to_string(self.backup_dir().join("backup.log")).expect("Failed to read log")
    }

    /// `biggity` with every value on the command line, so nothing is
    /// prompted for.
    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("biggity");
        cmd.arg(self.src.path())
            .arg("--dest-root")
            .arg(self.root.path())
            .arg("--ticket")
            .arg(TICKET)
            .arg("--name")
            .arg(NAME)
            .arg("--no-fsync")
            .arg("--no-wait");
        cmd
    }
}

/// Read a file under `base` as a string.
pub fn read(base: &Path, rel: &str) -> String {
    fs::read_to_string(base.join(rel)).expect("Failed to read file")
}

/// Count all files in a directory recursively.
pub fn count_files_recursive(dir: &Path) -> usize {
    let mut count = 0;
    if dir.is_dir() {
        for entry in fs::read_dir(dir).expect("Failed to read directory") {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                count += count_files_recursive(&path);
            } else {
                count += 1;
            }
        }
    }
    count
}
