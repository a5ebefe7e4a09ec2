//! SSL/TLS option tests

mod common;

use common::{run_script, ExitStatus};

#[test]
fn test_missing_ca_bundle() {
    let r = run_script(
        "ca.http",
        "GET https://127.0.0.1:1/\n",
        &["--verify", "/nonexistent/ca-bundle.pem"],
    );

    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("SSL error"), "stderr: {}", r.stderr);
}

#[test]
fn test_invalid_ca_bundle() {
    let r = run_script(
        "ca.http",
        "GET https://127.0.0.1:1/\n",
        &["--verify", "ca.http"],
    );

    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("SSL error"), "stderr: {}", r.stderr);
}

#[test]
fn test_tls_version_accepted() {
    let r = run_script("tls.http", "GET https://example.com/\n", &["--ssl", "tls1.3", "--list"]);
    assert_eq!(r.exit_status, ExitStatus::Success, "stderr: {}", r.stderr);
}
