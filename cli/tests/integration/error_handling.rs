//! Error handling integration tests for the biggity CLI.
//!
//! These tests verify:
//! - Unreadable files are skipped by default and logged
//! - `--abort-on-error` turns the first failure into a fatal error
//! - Fatal errors exit with code 1 and an `error:` line

#[path = "../common/mod.rs"]
mod common;

use common::BackupFixture;
use predicates::prelude::*;

#[test]
fn test_unknown_flag_is_rejected() {
    let fx = BackupFixture::new();

    fx.command()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn test_invalid_output_mode_is_rejected() {
    let fx = BackupFixture::new();

    fx.command()
        .args(["--output", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_unusable_log_location_is_fatal() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    std::fs::create_dir_all(fx.backup_dir().join("backup.log")).unwrap();

    fx.command()
        .arg("--yes")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: Failed to open log file"));

    assert!(!fx.backup_dir().join("a.txt").exists());
}

/// A file in the ticket directory where `sub/` has to be created. This
/// fails for every user, root included.
fn block_sub_directory(fx: &BackupFixture) {
    fx.write("top.txt", "ok").write("sub/a.txt", "blocked");
    std::fs::create_dir_all(fx.backup_dir()).unwrap();
    std::fs::write(fx.backup_dir().join("sub"), "not a directory").unwrap();
}

#[test]
fn test_uncreatable_directory_skipped_by_default() {
    let fx = BackupFixture::new();
    block_sub_directory(&fx);

    let output = fx
        .command()
        .args(["--yes", "--output", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Error: destination uncreatable"))
        .stderr(predicate::str::contains("1 file(s) could not be copied"))
        .stderr(predicate::str::contains("Backup complete, verify size!"))
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["files_copied"], 1);
    assert_eq!(value["files_failed"], 1);
    assert_eq!(value["bytes_copied"], 2);
    assert!(fx.backup_dir().join("top.txt").is_file());
    assert!(fx.log_contents().contains("destination uncreatable"));
}

#[test]
fn test_abort_on_error_stops_at_uncreatable_directory() {
    let fx = BackupFixture::new();
    block_sub_directory(&fx);

    fx.command()
        .args(["--yes", "--abort-on-error"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: Backup failed"))
        .stderr(predicate::str::contains("Failed to create directory"))
        .stderr(predicate::str::contains("Backup complete").not());

    assert!(fx.log_contents().contains("error: Backup failed"));
}

#[cfg(unix)]
mod unreadable {
    use super::common::BackupFixture;
    use predicates::prelude::*;
    use serde_json::Value;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Lock `secret.txt` down. Returns `false` when running as root, where
    /// permission bits don't stop reads.
    fn lock_secret(fx: &BackupFixture) -> bool {
        let path = fx.src.path().join("secret.txt");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read(&path).is_err()
    }

    #[test]
    fn test_unreadable_file_skipped_by_default() {
        let fx = BackupFixture::new();
        fx.write("ok.txt", "fine").write("secret.txt", "hidden");
        if !lock_secret(&fx) {
            return;
        }

        let output = fx
            .command()
            .args(["--output", "json"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Error: io error copying"))
            .stderr(predicate::str::contains("1 file(s) could not be copied"))
            .stderr(predicate::str::contains("Backup complete, verify size!"))
            .get_output()
            .stdout
            .clone();

        let value: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["files_copied"], 1);
        assert_eq!(value["files_failed"], 1);
        assert_eq!(value["bytes_copied"], 4);

        assert!(fx.backup_dir().join("ok.txt").exists());
        assert!(!fx.backup_dir().join("secret.txt").exists());
        assert!(fx.log_contents().contains("secret.txt"));
    }

    #[test]
    fn test_abort_on_error_stops_backup() {
        let fx = BackupFixture::new();
        fx.write("secret.txt", "hidden");
        if !lock_secret(&fx) {
            return;
        }

        fx.command()
            .arg("--abort-on-error")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("error: Backup failed"))
            .stderr(predicate::str::contains("Backup complete").not());

        assert!(fx.log_contents().contains("error: Backup failed"));
    }
}
