//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, validates its
//! arguments and fails with a non-zero exit code on fatal render errors.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `srtdub` binary.
fn srtdub() -> Command {
    let mut cmd = Command::cargo_bin("srtdub").expect("binary 'srtdub' should be built");
    // Keep the user's config file out of the way
    cmd.env("XDG_CONFIG_HOME", scratch_dir());
    cmd
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("srtdub-cli-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:02,500
Hello there.

2
00:00:03,000 --> 00:00:04,000
<i>General Kenobi.</i>

3
00:00:05,000 --> 00:00:06,000
<b></b>
";

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    srtdub()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: srtdub"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn version_flag_shows_semver() {
    srtdub()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^srtdub \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    srtdub()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: srtdub"));
}

#[test]
fn invalid_subcommand_fails() {
    srtdub()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn render_help() {
    srtdub()
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<URL>"))
        .stdout(predicate::str::contains("<SRT>"))
        .stdout(predicate::str::contains("<REFERENCE>"))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--gap-ms"))
        .stdout(predicate::str::contains("--emo-vector"))
        .stdout(predicate::str::contains("output.wav"));
}

#[test]
fn inspect_help() {
    srtdub()
        .args(["inspect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<SRT>"));
}

// ─── Argument validation ─────────────────────────────────────────────────────

#[test]
fn render_missing_args_fails() {
    srtdub()
        .args(["render", "http://localhost:8000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<SRT>"));
}

#[test]
fn render_rejects_unknown_mode() {
    srtdub()
        .args(["render", "http://localhost:8000", "a.srt", "b.wav", "--mode", "fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode"));
}

// ─── Inspect ─────────────────────────────────────────────────────────────────

#[test]
fn inspect_lists_cues() {
    let dir = scratch_dir();
    let srt = dir.join("sample.srt");
    std::fs::write(&srt, SAMPLE_SRT).unwrap();

    srtdub()
        .arg("inspect")
        .arg(&srt)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 segments"))
        .stdout(predicate::str::contains("00:00:01,000 --> 00:00:02,500"))
        .stdout(predicate::str::contains("<i>General Kenobi.</i>"))
        .stdout(predicate::str::contains("1 without speakable text"));
}

#[test]
fn inspect_json_output() {
    let dir = scratch_dir();
    let srt = dir.join("sample.srt");
    std::fs::write(&srt, SAMPLE_SRT).unwrap();

    let output = srtdub()
        .args(["inspect", "--json"])
        .arg(&srt)
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(rows[1]["spoken"], "General Kenobi.");
    assert_eq!(rows[0]["start"], 1.0);
}

#[test]
fn inspect_empty_file_fails() {
    let dir = scratch_dir();
    let srt = dir.join("empty.srt");
    std::fs::write(&srt, "not a subtitle file").unwrap();

    srtdub()
        .arg("inspect")
        .arg(&srt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No subtitle segments"));
}

// ─── Render failures ─────────────────────────────────────────────────────────

#[test]
fn render_missing_reference_exits_nonzero() {
    let dir = scratch_dir();
    let srt = dir.join("sample.srt");
    std::fs::write(&srt, SAMPLE_SRT).unwrap();
    let output = dir.join("out.wav");

    srtdub()
        .args(["render", "http://127.0.0.1:9"])
        .arg(&srt)
        .arg(dir.join("missing.wav"))
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reference audio not found"));

    assert!(!output.exists());
}

#[test]
fn render_unreachable_service_writes_nothing() {
    let dir = scratch_dir();
    let srt = dir.join("sample.srt");
    std::fs::write(&srt, SAMPLE_SRT).unwrap();
    let reference = dir.join("voice.wav");
    std::fs::write(&reference, b"RIFF").unwrap();
    let output = dir.join("out.wav");

    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    srtdub()
        .args(["render", &url])
        .arg(&srt)
        .arg(&reference)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No audio was generated"));

    assert!(!output.exists());
    assert!(!dir.join("out.srt").exists());
}
