//! Interactive prompting integration tests for the biggity CLI.
//!
//! Answers are fed through stdin; prompts and complaints go to stderr.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{BackupFixture, NAME, TICKET, read};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_all_values_prompted() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");

    let input = format!(
        "{}\n{}\n{TICKET}\n{NAME}\n",
        fx.src.path().display(),
        fx.root.path().display()
    );

    cargo_bin_cmd!("biggity")
        .args(["--no-wait", "--no-fsync"])
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Source mountpoint ("))
        .stderr(predicate::str::contains("Location ("))
        .stderr(predicate::str::contains("Ticket number: "))
        .stderr(predicate::str::contains("Customer name (last, first): "));

    assert_eq!(read(&fx.backup_dir(), "a.txt"), "hello");
}

#[test]
fn test_positional_source_is_the_prompt_default() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    let missing = fx.src.path().join("not-mounted");

    // Empty answer takes the (missing) default, so the prompt repeats.
    let input = format!("\n{}\n", fx.src.path().display());

    cargo_bin_cmd!("biggity")
        .arg(&missing)
        .arg("--dest-root")
        .arg(fx.root.path())
        .args(["--ticket", TICKET, "--name", NAME, "--no-wait", "--no-fsync"])
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Source {} does not exist",
            missing.display()
        )))
        .stderr(predicate::str::contains(format!(
            "Source mountpoint ({}): ",
            missing.display()
        )));

    assert_eq!(read(&fx.backup_dir(), "a.txt"), "hello");
}

#[test]
fn test_missing_destination_root_reprompts() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    let missing = fx.root.path().join("nowhere");
    let input = format!("{}\n{}\n", missing.display(), fx.root.path().display());

    cargo_bin_cmd!("biggity")
        .arg(fx.src.path())
        .args(["--ticket", TICKET, "--name", NAME, "--no-wait", "--no-fsync"])
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Destination {} does not exist",
            missing.display()
        )));

    assert!(fx.backup_dir().join("a.txt").exists());
    assert!(!missing.exists());
}

#[test]
fn test_blank_ticket_and_name_are_rejected() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    let input = format!("\n{TICKET}\n   \n{NAME}\n");

    cargo_bin_cmd!("biggity")
        .arg(fx.src.path())
        .arg("--dest-root")
        .arg(fx.root.path())
        .args(["--no-wait", "--no-fsync"])
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Input must not be blank").count(2));

    assert!(fx.backup_dir().join("a.txt").exists());
}

#[test]
fn test_existing_ticket_directory_declined() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    fs::create_dir_all(fx.backup_dir()).unwrap();

    fx.command()
        .write_stdin("n\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists, continue? (y/N)"))
        .stderr(predicate::str::contains("error: Terminating..."));

    assert!(!fx.backup_dir().join("a.txt").exists());
    assert!(!fx.backup_dir().join("backup.log").exists());
}

#[test]
fn test_existing_ticket_directory_confirmed() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    fs::create_dir_all(fx.backup_dir()).unwrap();

    fx.command()
        .write_stdin("y\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists, continue? (y/N)"));

    assert_eq!(read(&fx.backup_dir(), "a.txt"), "hello");
}

#[test]
fn test_yes_skips_confirmation() {
    let fx = BackupFixture::new();
    fx.write("a.txt", "hello");
    fs::create_dir_all(fx.backup_dir()).unwrap();

    fx.command()
        .arg("--yes")
        .assert()
        .success()
        .stderr(predicate::str::contains("continue? (y/N)").not());
}

#[test]
fn test_closed_input_fails() {
    let fx = BackupFixture::new();

    cargo_bin_cmd!("biggity")
        .arg(fx.src.path())
        .arg("--dest-root")
        .arg(fx.root.path())
        .args(["--no-wait", "--no-fsync"])
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "error: No input left while asking for Ticket number",
        ));

    assert_eq!(fs::read_dir(fx.root.path()).unwrap().count(), 0);
}
