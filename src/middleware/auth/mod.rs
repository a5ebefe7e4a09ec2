//! Authentication request stage
//!
//! Credentials are a sum type over the supported schemes rather than trait objects.

mod basic;
mod bearer;

pub use basic::BasicAuth;
pub use bearer::BearerAuth;

use clap::ValueEnum;
use futures::future::BoxFuture;
use tracing::debug;

use super::pipeline::{Middleware, Next};
use crate::errors::Result;
use crate::models::RequestDescriptor;

/// Supported authentication schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AuthType {
    #[default]
    Basic,
    Bearer,
}

/// Authentication method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic Authentication (RFC 7617)
    Basic(BasicAuth),
    /// Bearer token authentication (RFC 6750)
    Bearer(BearerAuth),
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic(BasicAuth::new(username, password))
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(BearerAuth::new(token))
    }

    /// Build credentials from the `--auth` value for the chosen scheme
    pub fn from_credentials(auth_type: AuthType, credentials: &str) -> Result<Self> {
        match auth_type {
            AuthType::Basic => Ok(Auth::Basic(BasicAuth::from_credentials(credentials)?)),
            AuthType::Bearer => Ok(Auth::bearer(credentials)),
        }
    }

    /// Add the Authorization header; an explicit one in the script wins
    pub fn apply(&self, request: &mut RequestDescriptor) -> bool {
        match self {
            Auth::Basic(auth) => auth.apply(&mut request.headers),
            Auth::Bearer(auth) => auth.apply(&mut request.headers),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Auth::Basic(_) => "basic",
            Auth::Bearer(_) => "bearer",
        }
    }
}

impl Middleware<RequestDescriptor> for Auth {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestDescriptor,
        next: Next<'a, RequestDescriptor>,
    ) -> BoxFuture<'a, Result<()>> {
        if !self.apply(ctx) {
            debug!(request = %ctx.display_name(), "Keeping explicit Authorization header");
        }
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "authentication"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequestDescriptor {
        RequestDescriptor::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_basic_auth() {
        let mut req = request();
        assert!(Auth::basic("user", "pass").apply(&mut req));

        let value = req.headers.get("Authorization").unwrap();
        assert!(value.starts_with("Basic "));

        let decoded = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            &value[6..],
        )
        .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "user:pass");
    }

    #[test]
    fn test_bearer_auth() {
        let mut req = request();
        Auth::from_credentials(AuthType::Bearer, "my-token").unwrap().apply(&mut req);
        assert_eq!(req.headers.get("authorization"), Some("Bearer my-token"));
    }

    #[test]
    fn test_explicit_header_wins() {
        let mut req = request().with_header("Authorization", "Token abc");
        assert!(!Auth::bearer("other").apply(&mut req));
        assert_eq!(req.headers.get("Authorization"), Some("Token abc"));
    }
}
