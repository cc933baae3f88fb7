//! Basic functionality integration tests for the biggity CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{BackupFixture, count_files_recursive, read};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

#[test]
fn test_basic_backup_mirrors_source() {
    let fx = BackupFixture::new();
    fx.write("file1.txt", "content1")
        .write("subdir/file2.txt", "content2")
        .write("subdir/nested/file3.txt", "content3");

    fx.command()
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Windows primary partition not detected, performing basic backup...",
        ))
        .stderr(predicate::str::contains("Transferred 0MB(s)"))
        .stderr(predicate::str::contains("Backup complete, verify size!"));

    let dir = fx.backup_dir();
    assert_eq!(read(&dir, "file1.txt"), "content1");
    assert_eq!(read(&dir, "subdir/file2.txt"), "content2");
    assert_eq!(read(&dir, "subdir/nested/file3.txt"), "content3");
}

#[test]
fn test_transferred_megabytes_rounds_down() {
    let fx = BackupFixture::new();
    let big = "x".repeat(3 * 1024 * 1024 + 512 * 1024);
    fx.write("big.bin", &big);

    fx.command()
        .assert()
        .success()
        .stderr(predicate::str::contains("Transferred 3MB(s)"));
}

#[test]
fn test_empty_directories_are_not_created() {
    let fx = BackupFixture::new();
    fx.write("keep/file.txt", "data");
    fs::create_dir_all(fx.src.path().join("empty/deeper")).unwrap();

    fx.command().assert().success();

    assert!(fx.backup_dir().join("keep/file.txt").exists());
    assert!(!fx.backup_dir().join("empty").exists());
}

#[test]
fn test_log_file_records_every_copy() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello").write("sub/b.txt", "hi");

    fx.command().assert().success();

    let log = fx.log_contents();
    assert!(log.contains("a.txt to "));
    assert!(log.contains("size 5"));
    assert!(log.contains("size 2"));
    assert!(log.contains("Transferred 0MB(s)"));
    assert!(log.contains("Backup complete, verify size!"));
}

#[test]
fn test_log_file_is_appended_across_runs() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");

    fx.command().assert().success();
    fx.command().arg("--yes").assert().success();

    assert_eq!(
        fx.log_contents()
            .matches("Backup complete, verify size!")
            .count(),
        2
    );
}

#[test]
fn test_existing_destination_files_survive() {
    let fx = BackupFixture::new();
    fx.write("new.txt", "new");
    fs::create_dir_all(fx.backup_dir()).unwrap();
    fs::write(fx.backup_dir().join("old.txt"), "old").unwrap();

    fx.command().arg("--yes").assert().success();

    assert_eq!(read(&fx.backup_dir(), "old.txt"), "old");
    assert_eq!(read(&fx.backup_dir(), "new.txt"), "new");
}

#[test]
fn test_json_summary_on_stdout() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "12345").write("b/c.txt", "123");

    let output = fx
        .command()
        .arg("--output")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["mode"], "basic");
    assert_eq!(value["ticket"], "1234");
    assert_eq!(value["name"], "Doe, John");
    assert_eq!(value["bytes_copied"], 8);
    assert_eq!(value["files_copied"], 2);
    assert_eq!(value["files_failed"], 0);
    assert!(value["passes"]["profile"].is_null());
    assert_eq!(value["passes"]["root"]["files_copied"], 2);
}

#[test]
fn test_human_output_keeps_stdout_empty() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "data");

    fx.command().assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn test_no_fix_attrs_skips_attribute_pass() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "data");

    fx.command()
        .assert()
        .success()
        .stderr(predicate::str::contains("Fixing file attributes..."));

    fx.command()
        .arg("--yes")
        .arg("--no-fix-attrs")
        .assert()
        .success()
        .stderr(predicate::str::contains("Fixing file attributes...").not());
}

#[cfg(unix)]
#[test]
fn test_read_only_files_become_writable() {
    use std::os::unix::fs::PermissionsExt;

    let fx = BackupFixture::new();
    fx.write("locked.txt", "secret");
    fs::set_permissions(
        fx.src.path().join("locked.txt"),
        fs::Permissions::from_mode(0o400),
    )
    .unwrap();

    fx.command()
        .assert()
        .success()
        .stderr(predicate::str::contains("Syncing unwritten data..."));

    let mode = fs::metadata(fx.backup_dir().join("locked.txt"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o600, 0o600);
}

#[test]
fn test_progress_keeps_copy_lines_out_of_console() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");

    fx.command()
        .arg("--progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("size 5").not());

    assert!(fx.log_contents().contains("size 5"));
}

#[test]
fn test_waits_for_enter_before_exit() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("biggity");
    cmd.arg(fx.src.path())
        .arg("--dest-root")
        .arg(fx.root.path())
        .arg("--ticket")
        .arg(common::TICKET)
        .arg("--name")
        .arg(common::NAME)
        .write_stdin("\n")
        .assert()
        .success();

    assert_eq!(count_files_recursive(&fx.backup_dir()), 2);
}
