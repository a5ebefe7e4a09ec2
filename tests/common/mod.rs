//! Common test utilities for quicpulse-exec integration tests
//!
//! - Script file creation in a temp directory
//! - CLI invocation helpers with an isolated config directory

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Exit status codes matching the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    Interrupted = 130,
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            130 => ExitStatus::Interrupted,
            _ => ExitStatus::Error,
        }
    }
}

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: ExitStatus,
    pub exit_code: i32,
}

impl CliResponse {
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Number of printed responses
    pub fn responses(&self) -> usize {
        self.stdout.matches("Duration: ").count()
    }
}

/// Isolated environment for one CLI invocation
pub struct MockEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    /// Directory scripts are written to and the working directory of the process
    pub work_dir: TempDir,
    pub env_vars: HashMap<String, String>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().expect("Failed to create temp config dir"),
            work_dir: TempDir::new().expect("Failed to create temp work dir"),
            env_vars: HashMap::new(),
        }
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Write `config.toml` into the config directory
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_dir.path().join("config.toml"), content)
            .expect("Failed to write config");
    }

    /// Write a script into the work directory and return its path
    pub fn script(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write script");
        path
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }
}

/// Run the CLI with the given arguments (excluding the program name)
pub fn run(args: &[&str]) -> CliResponse {
    run_with_env(args, &MockEnvironment::new())
}

/// Run the CLI in `env`; a 5s timeout keeps tests from hanging
pub fn run_with_env(args: &[&str], env: &MockEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_quicpulse-exec"));
    cmd.args(["--timeout", "5"]);
    cmd.args(args);

    cmd.current_dir(env.work_path());
    cmd.env("QUICPULSE_CONFIG_DIR", env.config_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().expect("Failed to execute command");
    parse_output(output)
}

/// Write `content` as `name` in a fresh environment and run it
pub fn run_script(name: &str, content: &str, extra_args: &[&str]) -> CliResponse {
    let env = MockEnvironment::new();
    let path = env.script(name, content);
    let path = path.to_str().expect("Non-UTF-8 temp path");

    let mut args: Vec<&str> = extra_args.to_vec();
    args.push(path);
    run_with_env(&args, &env)
}

fn parse_output(output: Output) -> CliResponse {
    let exit_code = output.status.code().unwrap_or(1);
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_status: ExitStatus::from(exit_code),
        exit_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_from_i32() {
        assert_eq!(ExitStatus::from(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from(1), ExitStatus::Error);
        assert_eq!(ExitStatus::from(2), ExitStatus::Error);
        assert_eq!(ExitStatus::from(130), ExitStatus::Interrupted);
    }
}
