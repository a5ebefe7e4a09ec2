//! Request descriptor produced by the script parsers

use bytes::Bytes;
use std::fmt;
use url::Url;

use crate::errors::{QuicpulseError, Result};
use crate::http::{HeaderList, GET};

/// Payload of a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyData {
    /// Text body; the only kind variable references are resolved in
    Text(String),
    /// Opaque bytes sent as-is
    Binary(Bytes),
}

/// Request body with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub data: BodyData,
    pub content_type: Option<String>,
}

impl RequestBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            data: BodyData::Text(content.into()),
            content_type: None,
        }
    }

    pub fn binary(content: impl Into<Bytes>) -> Self {
        Self {
            data: BodyData::Binary(content.into()),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Text payload, if this is a text body
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            BodyData::Text(text) => Some(text),
            BodyData::Binary(_) => None,
        }
    }

    /// Body rendered as text; binary payloads are decoded lossily
    pub fn to_text(&self) -> String {
        match &self.data {
            BodyData::Text(text) => text.clone(),
            BodyData::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match &self.data {
            BodyData::Text(text) => Bytes::from(text.clone()),
            BodyData::Binary(bytes) => bytes.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            BodyData::Text(text) => text.len(),
            BodyData::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single HTTP request to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Name used by later requests to reference this one; batch scripts only
    pub name: Option<String>,
    pub method: String,
    pub url: Url,
    pub headers: HeaderList,
    pub body: Option<RequestBody>,
}

impl RequestDescriptor {
    /// Create a `GET` request for an absolute URL
    pub fn new(url: Url) -> Self {
        Self {
            name: None,
            method: GET.to_string(),
            url,
            headers: HeaderList::new(),
            body: None,
        }
    }

    /// Parse `url` as an absolute URI and create a `GET` request for it
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(parse_absolute_url(url)?))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Name for log output
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

impl fmt::Display for RequestDescriptor {
    /// Raw HTTP/1.1-style message
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        };
        writeln!(f, "{} {} HTTP/1.1", self.method, target)?;
        if let Some(host) = self.url.host_str() {
            if !self.headers.contains("Host") {
                match self.url.port() {
                    Some(port) => writeln!(f, "Host: {}:{}", host, port)?,
                    None => writeln!(f, "Host: {}", host)?,
                }
            }
        }
        write!(f, "{}", self.headers)?;
        if let Some(body) = &self.body {
            if let Some(content_type) = &body.content_type {
                if !self.headers.contains("Content-Type") {
                    writeln!(f, "Content-Type: {}", content_type)?;
                }
            }
            writeln!(f)?;
            write!(f, "{}", body.to_text())?;
        }
        Ok(())
    }
}

/// Parse an absolute URI, rejecting relative references
pub fn parse_absolute_url(url: &str) -> Result<Url> {
    Url::parse(url.trim())
        .map_err(|e| QuicpulseError::format(format!("Invalid URL '{}': {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_get() {
        let request = RequestDescriptor::parse("https://example.com/users").unwrap();
        assert_eq!(request.method, "GET");
        assert!(request.name.is_none());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_relative_url_is_format_error() {
        let err = RequestDescriptor::parse("/api/users").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_raw_message() {
        let request = RequestDescriptor::parse("http://localhost:8080/items?page=2")
            .unwrap()
            .with_method("POST")
            .with_header("Accept", "application/json")
            .with_body(RequestBody::text("{}").with_content_type("application/json"));

        let raw = request.to_string();
        assert!(raw.starts_with("POST /items?page=2 HTTP/1.1\n"));
        assert!(raw.contains("Host: localhost:8080\n"));
        assert!(raw.contains("Content-Type: application/json\n"));
        assert!(raw.ends_with("\n{}"));
    }

    #[test]
    fn test_binary_body_text() {
        let body = RequestBody::binary(vec![b'h', b'i']);
        assert_eq!(body.as_text(), None);
        assert_eq!(body.to_text(), "hi");
        assert_eq!(body.len(), 2);
    }
}
