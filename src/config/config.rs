//! Config file handling

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{QuicpulseError, Result};

/// Overrides the config directory
pub const CONFIG_DIR_ENV: &str = "QUICPULSE_CONFIG_DIR";

/// Settings read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Flags prepended to the command line
    pub default_options: Vec<String>,
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            default_options: Vec::new(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Load configuration from the config file (TOML format)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_dir())
    }

    /// Load `config.toml` from `config_dir`; a missing file yields the defaults
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join("config.toml");

        if !config_file.exists() {
            return Ok(Self {
                config_dir: config_dir.to_path_buf(),
                ..Self::default()
            });
        }

        debug!(path = %config_file.display(), "Loading config");
        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| QuicpulseError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content, config_dir)
    }

    fn parse(content: &str, config_dir: &Path) -> Result<Self> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| QuicpulseError::Config(format!("Invalid config TOML: {}", e)))?;

        let defaults = toml_value.get("defaults");

        let default_options = defaults
            .and_then(|d| d.get("options"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let user_agent = defaults
            .and_then(|d| d.get("user_agent"))
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(Self {
            config_dir: config_dir.to_path_buf(),
            default_options,
            user_agent,
        })
    }

    /// Get the default config directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("quicpulse"))
            .unwrap_or_else(|| PathBuf::from(".quicpulse"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert!(config.default_options.is_empty());
        assert_eq!(config.user_agent, None);
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn test_parse_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[defaults]\noptions = [\"--follow\", \"--timeout\", \"5\"]\nuser_agent = \"tester/1\"\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.default_options, vec!["--follow", "--timeout", "5"]);
        assert_eq!(config.user_agent.as_deref(), Some("tester/1"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("[defaults\n", Path::new(".")).unwrap_err();
        assert!(matches!(err, QuicpulseError::Config(_)));
    }
}
