//! reqwest-backed transport

use futures::future::BoxFuture;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::sync::Arc;
use tracing::debug;

use super::ssl::{load_ca_bundle, Verify};
use super::{ClientSettings, Connector, RedirectPolicy, Transport, TransportResponse};
use crate::errors::{QuicpulseError, Result};
use crate::http::HeaderList;
use crate::models::{BodyData, RequestDescriptor};

/// Connects by building a [`reqwest::Client`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestConnector;

impl Connector for ReqwestConnector {
    fn connect(&self, settings: &ClientSettings) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(ReqwestTransport {
            client: build_client(settings)?,
        }))
    }
}

/// Sends requests through a shared [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute<'a>(&'a self, request: &'a RequestDescriptor) -> BoxFuture<'a, Result<TransportResponse>> {
        Box::pin(async move {
            let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
                QuicpulseError::Argument(format!("Invalid HTTP method: {}", request.method))
            })?;

            let mut builder = self
                .client
                .request(method, request.url.clone())
                .headers(to_header_map(&request.headers)?);

            if let Some(body) = &request.body {
                if let Some(content_type) = &body.content_type {
                    if !request.headers.contains("Content-Type") {
                        builder = builder.header(CONTENT_TYPE, content_type.as_str());
                    }
                }
                builder = match &body.data {
                    BodyData::Text(text) => builder.body(text.clone()),
                    BodyData::Binary(bytes) => builder.body(bytes.clone()),
                };
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = from_header_map(response.headers());
            debug!(status, url = %request.url, "Response head received");

            let body = response
                .bytes_stream()
                .map_err(QuicpulseError::from)
                .boxed();

            Ok(TransportResponse { status, headers, body })
        })
    }
}

/// Build the HTTP client from the final handler settings
pub fn build_client(settings: &ClientSettings) -> Result<Client> {
    let mut builder = Client::builder().user_agent(settings.user_agent.as_str());

    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(min_version) = settings.tls_version.min_tls_version() {
        builder = builder.min_tls_version(min_version);
    }

    match &settings.verify {
        Verify::System => {}
        Verify::Disabled => builder = builder.danger_accept_invalid_certs(true),
        Verify::CaBundle(path) => {
            for cert in load_ca_bundle(path)? {
                builder = builder.add_root_certificate(cert);
            }
        }
    }

    builder = match settings.redirect {
        RedirectPolicy::None => builder.redirect(reqwest::redirect::Policy::none()),
        RedirectPolicy::Limited(max) => builder.redirect(reqwest::redirect::Policy::limited(max)),
    };

    // Disable automatic Referer header on redirects
    builder = builder.referer(false);

    builder
        .build()
        .map_err(|e| QuicpulseError::Connection(format!("Failed to build HTTP client: {}", e)))
}

fn to_header_map(headers: &HeaderList) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| QuicpulseError::InvalidHeader(format!("Invalid header name: {}", name)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            QuicpulseError::InvalidHeader(format!("Invalid value for header {}: {}", name, value))
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

fn from_header_map(map: &HeaderMap) -> HeaderList {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map_keeps_repeated_values() {
        let headers: HeaderList = vec![("Accept", "a"), ("accept", "b")].into_iter().collect();
        let map = to_header_map(&headers).unwrap();
        assert_eq!(map.get_all("accept").iter().count(), 2);
    }

    #[test]
    fn test_invalid_header_name() {
        let headers: HeaderList = vec![("Bad Name", "x")].into_iter().collect();
        assert!(matches!(to_header_map(&headers), Err(QuicpulseError::InvalidHeader(_))));
    }

    #[test]
    fn test_build_client_with_defaults() {
        assert!(build_client(&ClientSettings::default()).is_ok());
    }

    #[test]
    fn test_build_client_missing_ca_bundle() {
        let settings = ClientSettings {
            verify: Verify::CaBundle("/nonexistent/ca.pem".into()),
            ..Default::default()
        };
        assert!(matches!(build_client(&settings), Err(QuicpulseError::Ssl(_))));
    }
}
