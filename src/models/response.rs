//! Response descriptor and the execution records retained during a script run

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use indexmap::IndexMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{QuicpulseError, Result};
use crate::http::HeaderList;
use crate::models::request::RequestDescriptor;

/// Byte stream handed over by the transport
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Response body, readable once from the wire and buffered afterwards
pub enum ResponseBody {
    /// Not read yet
    Streaming(BodyStream),
    /// Read and cached
    Buffered(Bytes),
    /// Reading from the wire failed part way; the message is kept for later reads
    Failed(String),
    /// Disposed at the end of a run
    Released,
}

impl ResponseBody {
    pub fn from_stream(stream: BodyStream) -> Self {
        ResponseBody::Streaming(stream)
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self, ResponseBody::Buffered(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self, ResponseBody::Released)
    }

    /// Read the body, draining the stream on the first call
    pub async fn bytes(&mut self) -> Result<Bytes> {
        match self {
            ResponseBody::Buffered(bytes) => Ok(bytes.clone()),
            ResponseBody::Released => Err(QuicpulseError::Release(
                "response body read after release".to_string(),
            )),
            ResponseBody::Failed(message) => Err(QuicpulseError::Connection(format!(
                "response body unavailable: {}",
                message
            ))),
            ResponseBody::Streaming(stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(chunk) => buffer.extend_from_slice(&chunk),
                        Err(e) => {
                            *self = ResponseBody::Failed(e.to_string());
                            return Err(e);
                        }
                    }
                }
                let bytes = buffer.freeze();
                *self = ResponseBody::Buffered(bytes.clone());
                Ok(bytes)
            }
        }
    }

    /// Drop the underlying stream or buffer
    pub fn release(&mut self) -> Result<()> {
        match std::mem::replace(self, ResponseBody::Released) {
            ResponseBody::Released => Err(QuicpulseError::Release(
                "response body already released".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        ResponseBody::Buffered(bytes)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Streaming(_) => write!(f, "ResponseBody::Streaming"),
            ResponseBody::Buffered(bytes) => write!(f, "ResponseBody::Buffered({} bytes)", bytes.len()),
            ResponseBody::Failed(message) => write!(f, "ResponseBody::Failed({})", message),
            ResponseBody::Released => write!(f, "ResponseBody::Released"),
        }
    }
}

/// A completed exchange: the response plus an echo of the request as it was sent
#[derive(Debug)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub headers: HeaderList,
    /// The request after every request stage ran
    pub request: RequestDescriptor,
    pub elapsed: Duration,
    pub body: ResponseBody,
}

impl ResponseDescriptor {
    pub fn new(status: u16, headers: HeaderList, request: RequestDescriptor, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            request,
            elapsed: Duration::ZERO,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// Body bytes, cached after the first read
    pub async fn bytes(&mut self) -> Result<Bytes> {
        self.body.bytes().await
    }

    /// Body decoded as UTF-8 (lossy)
    pub async fn text(&mut self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Raw HTTP/1.1-style message; reads (and caches) the body
    pub async fn to_raw_message(&mut self) -> Result<String> {
        let mut raw = format!(
            "HTTP/1.1 {} {}\n{}",
            self.status,
            status_reason(self.status),
            self.headers
        );
        let body = self.text().await?;
        if !body.is_empty() {
            raw.push('\n');
            raw.push_str(&body);
        }
        Ok(raw)
    }
}

fn status_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// A named response retained for later back-references
#[derive(Debug)]
pub struct ExecutionRecord {
    pub name: String,
    pub response: ResponseDescriptor,
}

impl ExecutionRecord {
    pub fn new(name: impl Into<String>, response: ResponseDescriptor) -> Self {
        Self {
            name: name.into(),
            response,
        }
    }

    pub fn release(&mut self) -> Result<()> {
        self.response.body.release()
    }
}

/// Name-keyed records of one script run, in execution order.
///
/// Owned by a single run. Every record still held is released when the log is drained or
/// dropped.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    records: IndexMap<String, ExecutionRecord>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain a record; a previous record with the same name is released first
    pub fn insert(&mut self, record: ExecutionRecord) {
        if let Some(mut previous) = self.records.shift_remove(&record.name) {
            debug!(name = %previous.name, "Replacing retained response");
            if let Err(e) = previous.release() {
                warn!(name = %previous.name, error = %e, "Failed to release response");
            }
        }
        self.records.insert(record.name.clone(), record);
    }

    pub fn get(&self, name: &str) -> Option<&ExecutionRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ExecutionRecord> {
        self.records.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Release every record, continuing past individual failures.
    ///
    /// Returns the number of records released without error.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for (name, mut record) in self.records.drain(..) {
            match record.release() {
                Ok(()) => released += 1,
                Err(e) => warn!(name = %name, error = %e, "Failed to release response"),
            }
        }
        released
    }
}

impl Drop for ExecutionLog {
    fn drop(&mut self) {
        if !self.records.is_empty() {
            self.release_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn streaming(chunks: Vec<&'static str>) -> ResponseBody {
        let stream = stream::iter(chunks.into_iter().map(|c| Ok::<_, QuicpulseError>(Bytes::from(c))));
        ResponseBody::from_stream(stream.boxed())
    }

    fn response(body: ResponseBody) -> ResponseDescriptor {
        let request = RequestDescriptor::parse("https://example.com/").unwrap();
        ResponseDescriptor::new(200, HeaderList::new(), request, body)
    }

    #[tokio::test]
    async fn test_body_is_cached_after_first_read() {
        let mut body = streaming(vec!["{\"a\":", "1}"]);
        assert_eq!(body.bytes().await.unwrap(), Bytes::from("{\"a\":1}"));
        assert!(body.is_buffered());
        assert_eq!(body.bytes().await.unwrap(), Bytes::from("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_read_after_release_fails() {
        let mut body = streaming(vec!["x"]);
        body.release().unwrap();
        assert!(body.bytes().await.is_err());
        assert!(body.release().is_err());
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let chunks = vec![Ok(Bytes::from("a")), Err(QuicpulseError::Connection("reset".into()))];
        let mut body = ResponseBody::from_stream(stream::iter(chunks).boxed());
        assert!(matches!(body.bytes().await, Err(QuicpulseError::Connection(_))));
    }

    #[tokio::test]
    async fn test_failed_stream_is_not_cached_partially() {
        let chunks = vec![
            Ok(Bytes::from("{\"a\":")),
            Err(QuicpulseError::Connection("reset".into())),
            Ok(Bytes::from("1}")),
        ];
        let mut body = ResponseBody::from_stream(stream::iter(chunks).boxed());

        assert!(body.bytes().await.is_err());
        let err = body.bytes().await.unwrap_err();
        assert!(err.to_string().contains("reset"), "{}", err);
        assert!(!body.is_buffered());
        assert!(body.release().is_ok());
    }

    #[tokio::test]
    async fn test_raw_message() {
        let mut headers = HeaderList::new();
        headers.append("Content-Type", "text/plain");
        let request = RequestDescriptor::parse("https://example.com/").unwrap();
        let mut response = ResponseDescriptor::new(404, headers, request, Bytes::from("nope").into());

        let raw = response.to_raw_message().await.unwrap();
        assert_eq!(raw, "HTTP/1.1 404 Not Found\nContent-Type: text/plain\n\nnope");
    }

    #[test]
    fn test_log_release_all_continues_past_failures() {
        let mut log = ExecutionLog::new();
        log.insert(ExecutionRecord::new("a", response(streaming(vec!["1"]))));
        log.insert(ExecutionRecord::new("b", response(streaming(vec!["2"]))));
        log.insert(ExecutionRecord::new("c", response(streaming(vec!["3"]))));
        log.get_mut("b").unwrap().release().unwrap();

        assert_eq!(log.release_all(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_log_insert_replaces_same_name() {
        let mut log = ExecutionLog::new();
        log.insert(ExecutionRecord::new("a", response(streaming(vec!["1"]))));
        log.insert(ExecutionRecord::new("b", response(streaming(vec!["2"]))));
        log.insert(ExecutionRecord::new("a", response(streaming(vec!["3"]))));

        assert_eq!(log.len(), 2);
        assert_eq!(log.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
