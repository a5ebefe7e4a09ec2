mod cli;
mod client;
mod config;
mod context;
mod core;
mod devexp;
mod downloads;
mod errors;
mod executor;
mod http;
mod middleware;
mod models;
mod signals;
mod status;
mod variables;

use context::Environment;
use status::ExitStatus;
use tokio_util::sync::CancellationToken;

/// Entry point - installs the Ctrl+C handler and calls core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let cancel = CancellationToken::new();
    signals::install_handler(cancel.clone());

    let args: Vec<String> = std::env::args().collect();
    let env = Environment::init();

    let status = core::run(args, env, cancel);

    if signals::was_interrupted() {
        return ExitStatus::Interrupted;
    }

    status
}
