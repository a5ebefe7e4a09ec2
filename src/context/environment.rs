//! Terminal environment of the running process

/// Execution environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub stdout_isatty: bool,
    pub stderr_isatty: bool,
    /// ANSI colors are allowed on stderr
    pub colors: bool,
    pub program_name: String,
}

impl Environment {
    pub fn init() -> Self {
        Self::default()
    }
}

impl Default for Environment {
    fn default() -> Self {
        let stderr_isatty = atty::is(atty::Stream::Stderr);
        Self {
            stdout_isatty: atty::is(atty::Stream::Stdout),
            stderr_isatty,
            colors: stderr_isatty && std::env::var_os("NO_COLOR").is_none(),
            program_name: "quicpulse-exec".to_string(),
        }
    }
}
