//! Handler stages: shape [`ClientSettings`] before the transport is connected

use futures::future::BoxFuture;
use std::time::Duration;

use super::pipeline::{Middleware, Next};
use crate::client::{ClientSettings, RedirectPolicy, TlsVersion, Verify};
use crate::errors::Result;

/// Certificate verification and minimum TLS version
#[derive(Debug, Clone, Default)]
pub struct SslStage {
    pub verify: Verify,
    pub tls_version: Option<TlsVersion>,
}

impl Middleware<ClientSettings> for SslStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut ClientSettings,
        next: Next<'a, ClientSettings>,
    ) -> BoxFuture<'a, Result<()>> {
        ctx.verify = self.verify.clone();
        if let Some(version) = self.tls_version {
            ctx.tls_version = version;
        }
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "ssl"
    }
}

/// Follow redirects up to a limit
#[derive(Debug, Clone, Copy)]
pub struct FollowRedirectStage {
    pub max_redirects: usize,
}

impl Middleware<ClientSettings> for FollowRedirectStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut ClientSettings,
        next: Next<'a, ClientSettings>,
    ) -> BoxFuture<'a, Result<()>> {
        ctx.redirect = RedirectPolicy::Limited(self.max_redirects);
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "follow-redirect"
    }
}

/// Per-request timeout
#[derive(Debug, Clone, Copy)]
pub struct TimeoutStage(pub Duration);

impl Middleware<ClientSettings> for TimeoutStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut ClientSettings,
        next: Next<'a, ClientSettings>,
    ) -> BoxFuture<'a, Result<()>> {
        ctx.timeout = Some(self.0);
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "timeout"
    }
}
