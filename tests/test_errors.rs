//! Error handling tests

mod common;

use common::{run_script, ExitStatus};

#[test]
fn test_connection_refused() {
    // Nothing listens on port 1
    let r = run_script("refused.curl", "curl http://127.0.0.1:1/get", &[]);

    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.starts_with("Error:") || r.stderr.contains("\nError:"), "stderr: {}", r.stderr);
    assert!(r.stdout.is_empty());
}

#[test]
fn test_unterminated_quote() {
    let r = run_script("quote.curl", "curl -d 'oops http://127.0.0.1:1/", &[]);

    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("Unterminated quote"), "stderr: {}", r.stderr);
}

#[test]
fn test_format_error_before_network() {
    // The second block is malformed, so the first is never sent
    let r = run_script(
        "partial.http",
        "### ok\nGET http://127.0.0.1:1/ok\n\n### bad\nGET /relative\n",
        &[],
    );

    assert_eq!(r.exit_status, ExitStatus::Error);
    assert!(r.stderr.contains("Format error"), "stderr: {}", r.stderr);
    assert!(!r.stderr.contains("Transport error"), "stderr: {}", r.stderr);
}
