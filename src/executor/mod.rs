//! Script execution
//!
//! An [`Executor`] owns the three pipelines and a [`Connector`]. Each run connects once, then
//! sends its requests strictly in order. The first failure aborts the run, and every retained
//! response is released before the run returns, whatever the outcome.

mod runner;

pub use runner::{Executor, RunSummary};

use clap::ValueEnum;
use std::path::Path;

/// Script file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScriptType {
    /// `.http`/`.rest` batch script
    #[default]
    Http,
    /// Single `curl` command
    Curl,
}

impl ScriptType {
    /// Guess the format from the file extension; anything unrecognized is a batch script
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
            Some("curl") | Some("sh") => ScriptType::Curl,
            _ => ScriptType::Http,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(ScriptType::detect(Path::new("api.http")), ScriptType::Http);
        assert_eq!(ScriptType::detect(Path::new("api.rest")), ScriptType::Http);
        assert_eq!(ScriptType::detect(Path::new("create.CURL")), ScriptType::Curl);
        assert_eq!(ScriptType::detect(Path::new("noext")), ScriptType::Http);
    }
}
