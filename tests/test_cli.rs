//! CLI argument and exit status tests

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{run, run_script, ExitStatus};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("quicpulse-exec").unwrap();
    cmd.env("QUICPULSE_CONFIG_DIR", tempfile::tempdir().unwrap().keep());
    cmd
}

#[test]
fn test_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SCRIPT").and(predicate::str::contains("--auth-type")));
}

#[test]
fn test_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_script_argument() {
    let r = run(&[]);
    assert_eq!(r.exit_status, ExitStatus::Error);
}

#[test]
fn test_unknown_script_type() {
    let r = run(&["--type", "yaml", "api.http"]);
    assert_eq!(r.exit_status, ExitStatus::Error);
}

#[test]
fn test_zero_timeout() {
    let r = run_script("t.http", "GET https://example.com\n", &["--timeout", "0"]);
    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("Timeout must be a positive number"), "stderr: {}", r.stderr);
}

#[test]
fn test_unknown_tls_version() {
    let r = run_script("t.http", "GET https://example.com\n", &["--ssl", "tls9"]);
    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("Unknown TLS version"), "stderr: {}", r.stderr);
}

#[test]
fn test_list_rejects_curl_scripts() {
    let r = run_script("get.curl", "curl https://example.com\n", &["--list"]);
    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("--list only applies"), "stderr: {}", r.stderr);
}

#[test]
fn test_debug_prints_error_details() {
    let r = run_script("bad.curl", "curl -d x\n", &["--debug"]);
    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("Error: Format"), "stderr: {}", r.stderr);
}

#[test]
fn test_empty_batch_succeeds() {
    let r = run_script("empty.http", "# only comments\n", &[]);
    assert_eq!(r.exit_status, ExitStatus::Success, "stderr: {}", r.stderr);
    assert!(r.stdout.is_empty());
}
