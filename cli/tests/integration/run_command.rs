//! Integration tests for `nxbootstrap run` that stop before touching the device.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::cli_tests::nxbootstrap;

#[test]
fn test_run_without_settings_lists_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    nxbootstrap()
        .args(["run", "--yes", "--log-dir"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required setting(s)"))
        .stderr(predicate::str::contains("DOMAIN, RPM_URI, RPM_NAME, PUPPET_MASTER"));

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read")
        .collect::<Result<_, _>>()
        .expect("entries");
    assert_eq!(entries.len(), 1, "expected a single transcript");
    let transcript = std::fs::read_to_string(entries[0].path()).expect("transcript");
    assert!(transcript.contains("Configuration error"), "got: {transcript}");
    assert!(transcript.contains("PUPPET_MASTER"), "got: {transcript}");
}

#[test]
fn test_run_with_unwritable_log_dir_fails_before_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let not_a_dir = dir.path().join("plain-file");
    std::fs::write(&not_a_dir, "").expect("write");
    nxbootstrap()
        .args(["run", "--yes", "--log-dir"])
        .arg(&not_a_dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot create log directory"))
        .stderr(predicate::str::contains("Missing required setting(s)").not());
}

#[test]
fn test_run_help_lists_no_vrf() {
    nxbootstrap()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-vrf"));
}

#[test]
fn test_run_rejects_unknown_target() {
    nxbootstrap()
        .args(["run", "--yes", "--target", "bash"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid target 'bash'"));
}

#[test]
fn test_run_missing_settings_json_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = nxbootstrap()
        .args(["run", "--json", "--log-dir"])
        .arg(dir.path())
        .env("DOMAIN", "example.com")
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(v["code"], "config");
    assert!(
        v["message"].as_str().is_some_and(|m| m.contains("PUPPET_MASTER")),
        "got: {v}"
    );
}
