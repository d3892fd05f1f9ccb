//! Integration tests for the camweb binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn camweb(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("camweb").expect("binary builds");
    cmd.arg("--data-dir").arg(data_dir.path()).arg("--log-stderr");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("camweb")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("set-tool"))
        .stdout(predicate::str::contains("--recordings-dir"));
}

#[test]
fn test_serve_accepts_its_options_after_the_subcommand() {
    let dir = TempDir::new().unwrap();

    // An unparsable port proves the option reached serve's parser
    camweb(&dir)
        .args(["serve", "--cors-permissive", "--host", "127.0.0.1"])
        .args(["--recordings-dir", "/tmp", "--port", "notaport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'notaport'"))
        .stderr(predicate::str::contains("unexpected argument").not());
}

#[test]
fn test_tools_reports_every_tool() {
    let dir = TempDir::new().unwrap();

    camweb(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("rpicam-still"))
        .stdout(predicate::str::contains("rpicam-vid"))
        .stdout(predicate::str::contains("ffmpeg"));

    // First run writes the example config
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_set_tool_rejects_unknown_tool() {
    let dir = TempDir::new().unwrap();

    camweb(&dir)
        .args(["set-tool", "libcamera-vid", "/bin/sh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool"));
}

#[test]
fn test_set_tool_rejects_missing_path() {
    let dir = TempDir::new().unwrap();

    camweb(&dir)
        .args(["set-tool", "ffmpeg", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[cfg(unix)]
#[test]
fn test_set_tool_writes_config() {
    let dir = TempDir::new().unwrap();

    camweb(&dir)
        .args(["set-tool", "ffmpeg", "/bin/sh"])
        .assert()
        .success();

    let config = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(config.contains("[tools]"));
    assert!(config.contains("ffmpeg = "));
}
