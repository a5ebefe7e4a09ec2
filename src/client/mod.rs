//! Transport boundary
//!
//! The executor only talks to a [`Transport`]: `execute(request) -> status, headers, body`.
//! A [`Connector`] builds one from the [`ClientSettings`] produced by the handler pipeline.

pub mod http;
pub mod ssl;

pub use self::http::ReqwestConnector;
pub use ssl::{TlsVersion, Verify};

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::http::HeaderList;
use crate::models::{BodyStream, RequestDescriptor};

pub const USER_AGENT_STRING: &str = concat!("quicpulse-exec/", env!("CARGO_PKG_VERSION"));

/// Default redirect limit when following redirects
pub const DEFAULT_MAX_REDIRECTS: usize = 30;

/// Redirect handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectPolicy {
    /// Return 3xx responses as-is
    #[default]
    None,
    /// Follow up to the given number of redirects
    Limited(usize),
}

/// Handler/connection configuration, mutated by the handler pipeline before connecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub verify: Verify,
    pub tls_version: TlsVersion,
    pub redirect: RedirectPolicy,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            verify: Verify::System,
            tls_version: TlsVersion::Auto,
            redirect: RedirectPolicy::None,
            timeout: None,
            user_agent: USER_AGENT_STRING.to_string(),
        }
    }
}

/// Response head plus a body stream, as returned by a transport
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderList,
    pub body: BodyStream,
}

/// Executes a single request
pub trait Transport: Send + Sync {
    fn execute<'a>(&'a self, request: &'a RequestDescriptor) -> BoxFuture<'a, Result<TransportResponse>>;
}

/// Builds a transport from the final client settings
pub trait Connector: Send + Sync {
    fn connect(&self, settings: &ClientSettings) -> Result<Arc<dyn Transport>>;
}
