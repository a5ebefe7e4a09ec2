//! Per-run configuration resolved from the command line and the config file

use std::path::PathBuf;
use std::time::Duration;

use super::Config;
use crate::cli::Args;
use crate::client::{TlsVersion, Verify, USER_AGENT_STRING};
use crate::errors::{QuicpulseError, Result};
use crate::executor::ScriptType;
use crate::middleware::{Auth, DownloadStage};

/// Everything a run needs, built once and passed by reference
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub script: PathBuf,
    pub script_type: ScriptType,
    /// Only list the requests of a batch script
    pub list_only: bool,
    pub verify: Verify,
    pub tls_version: Option<TlsVersion>,
    /// Redirect limit when following redirects
    pub follow_redirects: Option<usize>,
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub auth: Option<Auth>,
    pub download: Option<DownloadStage>,
    pub print: bool,
}

impl RunConfig {
    pub fn from_args(args: &Args, config: &Config) -> Result<Self> {
        let tls_version = args
            .ssl
            .as_deref()
            .map(|v| {
                TlsVersion::parse(v)
                    .ok_or_else(|| QuicpulseError::Argument(format!("Unknown TLS version: {}", v)))
            })
            .transpose()?;

        let timeout = match args.timeout {
            Some(seconds) if seconds > 0.0 => Some(Duration::try_from_secs_f64(seconds).map_err(|e| {
                QuicpulseError::Argument(format!("Timeout out of range: {} ({})", seconds, e))
            })?),
            Some(seconds) => {
                return Err(QuicpulseError::Argument(format!(
                    "Timeout must be a positive number of seconds, got {}",
                    seconds
                )))
            }
            None => None,
        };

        let auth = args
            .auth
            .as_ref()
            .map(|credentials| Auth::from_credentials(args.auth_type, credentials.as_str()))
            .transpose()?;

        let download = args.downloads().then(|| DownloadStage {
            output: args.output.clone(),
            append: args.continue_download,
        });

        Ok(Self {
            script: args.script.clone(),
            script_type: args
                .script_type
                .unwrap_or_else(|| ScriptType::detect(&args.script)),
            list_only: args.list,
            verify: Verify::parse(&args.verify),
            tls_version,
            follow_redirects: args.follow.then_some(args.max_redirects),
            timeout,
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| USER_AGENT_STRING.to_string()),
            auth,
            download,
            print: !args.quiet,
        })
    }
}
