use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn sortfiles() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sortfiles"))
}

#[test]
fn test_no_argument_is_usage_error() {
    sortfiles().assert().code(2);
}

#[test]
fn test_extra_argument_is_usage_error() {
    let dir = tempdir().unwrap();
    sortfiles()
        .arg(dir.path())
        .arg(dir.path())
        .assert()
        .code(2);
}

#[test]
fn test_missing_target_exits_with_failure() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    sortfiles()
        .arg(&missing)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("does not exist"));

    assert!(!missing.exists());
}

#[test]
fn test_file_target_exits_with_failure() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    sortfiles()
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not a directory"));
}

#[test]
fn test_organizes_folder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.mp4"), "video").unwrap();
    fs::write(dir.path().join("b.xlsx"), "sheet").unwrap();

    sortfiles()
        .arg(dir.path())
        .env("RUST_LOG", "off")
        .assert()
        .success()
        .stdout(predicate::str::contains("sort known categories"));

    assert!(dir.path().join("video/a.mp4").exists());
    assert!(dir.path().join("unknowns/b.xlsx").exists());
}
