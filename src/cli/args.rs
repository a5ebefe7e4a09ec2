//! CLI argument definitions using clap

use clap::{ArgAction, Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::client::DEFAULT_MAX_REDIRECTS;
use crate::executor::ScriptType;
use crate::middleware::AuthType;

/// A string that redacts its value in Debug output to prevent credential leakage
#[derive(Clone, Default)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

/// Log format for diagnostics on stderr
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

/// Run a batch (.http) or curl script
#[derive(Parser, Debug, Clone)]
#[command(name = "quicpulse-exec", version, about, long_about = None, args_override_self = true)]
pub struct Args {
    /// Script file to execute
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Script format; guessed from the file extension when omitted
    #[arg(short = 't', long = "type", value_name = "TYPE", value_enum)]
    pub script_type: Option<ScriptType>,

    /// List the requests of a batch script without sending them
    #[arg(long = "list", action = ArgAction::SetTrue)]
    pub list: bool,

    // =========================================================================
    // NETWORK
    // =========================================================================

    /// Follow redirects
    #[arg(short = 'F', long = "follow", action = ArgAction::SetTrue)]
    pub follow: bool,

    /// Maximum number of redirects (default: 30)
    #[arg(long = "max-redirects", value_name = "NUM", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    // =========================================================================
    // SSL
    // =========================================================================

    /// SSL certificate verification: yes/no/path-to-CA-bundle
    #[arg(long = "verify", value_name = "VERIFY", default_value = "yes")]
    pub verify: String,

    /// Minimum TLS version (tls1.2, tls1.3)
    #[arg(long = "ssl", value_name = "VERSION")]
    pub ssl: Option<String>,

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    /// Authentication credentials (user:password or token)
    #[arg(short = 'a', long = "auth", value_name = "CREDENTIALS")]
    pub auth: Option<SecretString>,

    /// Authentication type
    #[arg(short = 'A', long = "auth-type", value_name = "TYPE", value_enum, default_value = "basic")]
    pub auth_type: AuthType,

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Download mode: save each response body to a file
    #[arg(short = 'd', long = "download", action = ArgAction::SetTrue)]
    pub download: bool,

    /// Output file for downloads (implies --download)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Append to the download target instead of overwriting it
    #[arg(short = 'c', long = "continue", action = ArgAction::SetTrue)]
    pub continue_download: bool,

    /// Do not print requests and responses
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    pub quiet: bool,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Output format for logs on stderr
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Debug logging and detailed errors
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}

impl Args {
    /// Whether response bodies are saved to disk
    pub fn downloads(&self) -> bool {
        self.download || self.output.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("quicpulse-exec").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["api.http"]);
        assert_eq!(args.script, PathBuf::from("api.http"));
        assert_eq!(args.script_type, None);
        assert_eq!(args.verify, "yes");
        assert_eq!(args.max_redirects, 30);
        assert_eq!(args.auth_type, AuthType::Basic);
        assert!(!args.downloads());
        assert!(!args.quiet);
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "-t", "curl", "-F", "--max-redirects", "3", "--verify", "no", "--ssl", "tls1.2",
            "-a", "token", "-A", "bearer", "-o", "out.bin", "-c", "-q", "--timeout", "2.5",
            "script.txt",
        ]);
        assert_eq!(args.script_type, Some(ScriptType::Curl));
        assert!(args.follow);
        assert_eq!(args.max_redirects, 3);
        assert_eq!(args.ssl.as_deref(), Some("tls1.2"));
        assert_eq!(args.auth_type, AuthType::Bearer);
        assert!(args.downloads());
        assert!(args.continue_download);
        assert_eq!(args.timeout, Some(2.5));
    }

    #[test]
    fn test_secret_redacted() {
        let args = parse(&["-a", "user:hunter2", "api.http"]);
        assert!(!format!("{:?}", args).contains("hunter2"));
    }

    #[test]
    fn test_later_flag_wins() {
        let args = parse(&["--timeout", "5", "--timeout", "1", "api.http"]);
        assert_eq!(args.timeout, Some(1.0));
    }

    #[test]
    fn test_script_required() {
        assert!(Args::try_parse_from(["quicpulse-exec"]).is_err());
    }
}
