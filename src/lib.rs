//! quicpulse-exec library interface
//!
//! Runs `.http` batch scripts and curl scripts through async middleware pipelines.
//!
//! # Module Organization
//!
//! - [`middleware`] - Generic pipeline and the built-in handler/request/response stages
//! - [`devexp`] - Curl and batch script parsers
//! - [`variables`] - `{{name.request|response.headers|body}}` back-references
//! - [`executor`] - Runs scripts in order and releases retained responses
//! - [`client`] - Transport boundary and the reqwest implementation
//! - [`errors`] - Error types (QuicpulseError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod core;
pub mod devexp;
pub mod downloads;
pub mod errors;
pub mod executor;
pub mod http;
pub mod middleware;
pub mod models;
pub mod signals;
pub mod status;
pub mod variables;
