//! CLI end-to-end tests
//!
//! Tests for the datamosh command-line interface. Input files are synthesized
//! with `AviBuilder` into a temp dir.

use assert_cmd::prelude::*;
use datamosh_avi::{AviBuilder, AviFile, FrameKind};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

use FrameKind::{Delta, Sync};

/// Get a command for the datamosh binary
#[allow(deprecated)]
fn datamosh_cmd() -> Command {
    Command::cargo_bin("datamosh").unwrap()
}

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("clip.avi");
    let data = AviBuilder::new()
        .frames(&[Sync, Delta, Delta, Sync, Delta, Delta, Sync, Delta], 32)
        .build();
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = datamosh_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = datamosh_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("datamosh"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = datamosh_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("datamosh"));
}

#[test]
fn test_cli_mosh_help() {
    let mut cmd = datamosh_cmd();
    cmd.args(["mosh", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("START:END"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = datamosh_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"));
}

#[test]
fn test_cli_inspect() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let mut cmd = datamosh_cmd();
    cmd.arg("inspect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stream: vids XVID, 23.976 fps (1 total)"))
        .stdout(predicate::str::contains("Frames: 8 (3 sync, 5 delta, 0 other)"))
        .stdout(predicate::str::contains("Index: 8 entries (3 keyframes)"));
}

#[test]
fn test_cli_inspect_json() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let output = datamosh_cmd()
        .args(["inspect", "--json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["frame_count"], 8);
    assert_eq!(json["sync_frames"], 3);
    assert_eq!(json["header"]["main"]["total_frames"], 8);
}

#[test]
fn test_cli_inspect_nonexistent_file() {
    let mut cmd = datamosh_cmd();
    cmd.args(["inspect", "/nonexistent/clip.avi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_inspect_not_avi() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.avi");
    fs::write(&path, b"just some text, not a container").unwrap();

    let mut cmd = datamosh_cmd();
    cmd.arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_cli_mosh_without_edits_is_identity() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());
    let output = dir.path().join("same.avi");

    let mut cmd = datamosh_cmd();
    cmd.arg("mosh")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
}

#[test]
fn test_cli_mosh_window_default_output() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let mut cmd = datamosh_cmd();
    cmd.arg("mosh")
        .arg(&input)
        .args(["--window", "1:7", "--duplicate", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frames: 8 -> 10"))
        .stdout(predicate::str::contains("Keyframes substituted: 2"));

    let output = dir.path().join("clip_glitched.avi");
    let data = fs::read(&output).unwrap();
    let avi = AviFile::parse(&data).unwrap();
    assert_eq!(avi.catalog.len(), 10);
    assert_eq!(avi.catalog.count(Sync), 1);
}

#[test]
fn test_cli_mosh_transition() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());
    let output = dir.path().join("cut.avi");

    let mut cmd = datamosh_cmd();
    cmd.arg("mosh")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--transition", "2", "--transition", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transition frames dropped: 2"));

    let avi = AviFile::parse(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(avi.header.total_frames(), 6);
}

#[test]
fn test_cli_mosh_no_reference_frame_fails() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());
    let output = dir.path().join("bad.avi");

    let mut cmd = datamosh_cmd();
    cmd.arg("mosh")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--window", "0:4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no delta frame"));

    assert!(!output.exists());
}

#[test]
fn test_cli_mosh_rejects_bad_window() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let mut cmd = datamosh_cmd();
    cmd.arg("mosh")
        .arg(&input)
        .args(["--window", "9:3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end"));
}

#[test]
fn test_cli_mosh_refuses_input_as_output() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let mut cmd = datamosh_cmd();
    cmd.arg("mosh")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .args(["--window", "1:7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must differ"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("datamosh.toml");
    fs::write(&config, "[transcode]\nquality = 5\n\n[mosh]\ntrail_frames = 30\n").unwrap();

    let mut cmd = datamosh_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("trail=30"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("datamosh.toml");
    fs::write(&config, "[transcode]\nquality = 99\n").unwrap();

    let mut cmd = datamosh_cmd();
    cmd.arg("validate").arg(&config).assert().failure();
}
