use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, LogFormat};
use crate::client::{ClientSettings, Connector, ReqwestConnector};
use crate::config::{Config, RunConfig};
use crate::context::Environment;
use crate::devexp::{list_requests, parse_http_file};
use crate::errors::{QuicpulseError, Result};
use crate::executor::{Executor, ScriptType};
use crate::middleware::{
    DefaultHeadersStage, FollowRedirectStage, HandlerPipeline, Pipeline, PrintRequestStage, PrintStage,
    RequestPipeline, ResponsePipeline, SslStage, TimeoutStage,
};
use crate::status::ExitStatus;

/// Main entry point for the CLI.
///
/// Loads the config file, parses arguments, sets up logging and runs the script on a tokio
/// runtime. `cancel` is fired by the Ctrl+C handler.
pub fn run(args: Vec<String>, mut env: Environment, cancel: CancellationToken) -> ExitStatus {
    if let Some(name) = args.first() {
        if let Some(basename) = std::path::Path::new(name).file_stem() {
            env.program_name = basename.to_string_lossy().to_string();
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            Config::default()
        }
    };

    let merged_args = merge_default_options(args, &config);
    let debug = merged_args.iter().any(|a| a == "--debug");

    let parsed = match Args::try_parse_from(&merged_args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_logging(&parsed, &env);
    debug!(program = %env.program_name, args = ?parsed, "Starting");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(e.into(), debug),
    };

    match runtime.block_on(program(parsed, &config, &cancel)) {
        Ok(status) => status,
        Err(e) => handle_error(e, debug),
    }
}

pub async fn program(args: Args, config: &Config, cancel: &CancellationToken) -> Result<ExitStatus> {
    let run_config = RunConfig::from_args(&args, config)?;

    if run_config.list_only {
        return list_script(&run_config, cancel).await;
    }

    let executor = build_executor(&run_config, Arc::new(ReqwestConnector));
    let summary = executor
        .run_script_file(&run_config.script, run_config.script_type, cancel)
        .await?;

    info!(
        script = %run_config.script.display(),
        executed = summary.executed,
        released = summary.released,
        "Script finished"
    );
    Ok(ExitStatus::Success)
}

async fn list_script(run_config: &RunConfig, cancel: &CancellationToken) -> Result<ExitStatus> {
    if run_config.script_type != ScriptType::Http {
        return Err(QuicpulseError::Argument("--list only applies to batch scripts".to_string()));
    }

    let requests = list_requests(&parse_http_file(&run_config.script, cancel).await?);
    if requests.is_empty() {
        eprintln!("No requests found in {}", run_config.script.display());
        return Ok(ExitStatus::Error);
    }

    println!("Requests in {}:", run_config.script.display());
    for (idx, name, method, url) in &requests {
        println!("  [{}] {} {} - {}", idx, method, name, url);
    }
    Ok(ExitStatus::Success)
}

/// Handler stages: redirects, then SSL, then timeout
pub fn build_handler_pipeline(run_config: &RunConfig) -> HandlerPipeline {
    Pipeline::builder()
        .with_optional(
            run_config
                .follow_redirects
                .map(|max_redirects| FollowRedirectStage { max_redirects }),
        )
        .with(SslStage {
            verify: run_config.verify.clone(),
            tls_version: run_config.tls_version,
        })
        .with_optional(run_config.timeout.map(TimeoutStage))
        .build()
}

/// Request stages: default headers, then authentication, then the request echo
pub fn build_request_pipeline(run_config: &RunConfig) -> RequestPipeline {
    Pipeline::builder()
        .with(DefaultHeadersStage::new(run_config.user_agent.as_str()).with_header("Accept", "*/*"))
        .with_optional(run_config.auth.clone())
        .with_optional(run_config.print.then_some(PrintRequestStage))
        .build()
}

/// Response stages: download, then print
pub fn build_response_pipeline(run_config: &RunConfig) -> ResponsePipeline {
    Pipeline::builder()
        .with_optional(run_config.download.clone())
        .with_optional(run_config.print.then_some(PrintStage))
        .build()
}

pub fn build_executor(run_config: &RunConfig, connector: Arc<dyn Connector>) -> Executor {
    let settings = ClientSettings {
        user_agent: run_config.user_agent.clone(),
        ..ClientSettings::default()
    };

    Executor::new(connector)
        .with_settings(settings)
        .with_handler_pipeline(build_handler_pipeline(run_config))
        .with_request_pipeline(build_request_pipeline(run_config))
        .with_response_pipeline(build_response_pipeline(run_config))
}

/// stderr logging; `RUST_LOG` wins over `--debug`
fn init_logging(args: &Args, env: &Environment) {
    let level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,quicpulse_exec={}", level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match args.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(env.colors).try_init(),
    };

    if let Err(e) = result {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
}

/// Prepend flags from `[defaults] options` to the command line
fn merge_default_options(args: Vec<String>, config: &Config) -> Vec<String> {
    if config.default_options.is_empty() {
        return args;
    }

    let (flags, positional): (Vec<_>, Vec<_>) = config
        .default_options
        .iter()
        .partition(|opt| opt.starts_with('-'));

    if !positional.is_empty() {
        eprintln!(
            "Warning: Positional arguments in default_options are ignored: {:?}",
            positional
        );
    }

    if flags.is_empty() {
        return args;
    }

    let mut merged = Vec::with_capacity(args.len() + flags.len());

    if let Some(program) = args.first() {
        merged.push(program.clone());
    }

    merged.extend(flags.into_iter().cloned());
    merged.extend(args.into_iter().skip(1));
    merged
}

fn handle_error(error: QuicpulseError, debug: bool) -> ExitStatus {
    let status = ExitStatus::from(&error);
    if status == ExitStatus::Interrupted {
        return status;
    }

    if debug {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_config(argv: &[&str]) -> RunConfig {
        let args = Args::try_parse_from(std::iter::once("quicpulse-exec").chain(argv.iter().copied())).unwrap();
        RunConfig::from_args(&args, &Config::default()).unwrap()
    }

    #[test]
    fn test_merge_default_options() {
        let config = Config {
            default_options: vec!["--follow".to_string(), "positional".to_string()],
            ..Config::default()
        };
        let merged = merge_default_options(
            vec!["quicpulse-exec".to_string(), "api.http".to_string()],
            &config,
        );
        assert_eq!(merged, vec!["quicpulse-exec", "--follow", "api.http"]);
    }

    #[test]
    fn test_pipeline_order() {
        let rc = run_config(&["--follow", "--timeout", "3", "-a", "tok", "-A", "bearer", "-d", "a.http"]);

        assert_eq!(
            build_handler_pipeline(&rc).stage_names(),
            vec!["follow-redirect", "ssl", "timeout"]
        );
        assert_eq!(
            build_request_pipeline(&rc).stage_names(),
            vec!["default-headers", "authentication", "print-request"]
        );
        assert_eq!(build_response_pipeline(&rc).stage_names(), vec!["download", "print"]);
    }

    #[test]
    fn test_minimal_pipelines() {
        let rc = run_config(&["-q", "a.http"]);

        assert_eq!(build_handler_pipeline(&rc).stage_names(), vec!["ssl"]);
        assert_eq!(build_request_pipeline(&rc).stage_names(), vec!["default-headers"]);
        assert!(build_response_pipeline(&rc).is_empty());
    }

    #[test]
    fn test_cancelled_is_interrupted() {
        assert_eq!(handle_error(QuicpulseError::Cancelled, false), ExitStatus::Interrupted);
        assert_eq!(handle_error(QuicpulseError::format("bad"), false), ExitStatus::Error);
    }
}
