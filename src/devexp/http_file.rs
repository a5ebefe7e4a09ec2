//! .http/.rest batch script parser
//!
//! Parses the REST Client format used by VS Code into [`RequestDescriptor`]s, in file order.
//!
//! Format:
//! ```http
//! @baseUrl = https://api.example.com
//!
//! ### login
//! POST {{baseUrl}}/login
//! Content-Type: application/json
//!
//! {"user": "alice"}
//!
//! ###
//! # @name profile
//! GET {{baseUrl}}/me
//! Authorization: Bearer {{login.response.body.$.token}}
//! ```
//!
//! `{{name}}` file variables and `{{$env.NAME}}` environment variables are expanded while
//! parsing. Anything else in braces, including request references, is left for the executor.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::errors::{QuicpulseError, Result};
use crate::http::{self, HeaderList, GET};
use crate::models::{RequestBody, RequestDescriptor};

/// `{{name}}` or `{{$env.NAME}}`
static FILE_VARIABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(\$env\.)?([A-Za-z_][\w-]*)\s*\}\}").expect("Invalid file variable regex")
});

/// `# @name value` or `// @name value`
static NAME_DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#+|//)\s*@name\s+(\S+)").expect("Invalid name directive regex")
});

/// Read and parse a batch script; the read is abandoned if `cancel` fires
pub async fn parse_http_file(path: &Path, cancel: &CancellationToken) -> Result<Vec<RequestDescriptor>> {
    let content = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(QuicpulseError::Cancelled),
        read = tokio::fs::read_to_string(path) => read.map_err(|e| {
            QuicpulseError::Io(std::io::Error::new(
                e.kind(),
                format!("Cannot read '{}': {}", path.display(), e),
            ))
        })?,
    };

    parse_http_content(&content)
}

/// A request block before variable expansion
#[derive(Debug, Default)]
struct RawRequest {
    name: Option<String>,
    method: String,
    url: String,
    line_number: usize,
    headers: Vec<(String, String)>,
    body_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before the request line of the current block
    Preamble,
    Headers,
    Body,
}

/// Parse batch script text into requests
pub fn parse_http_content(content: &str) -> Result<Vec<RequestDescriptor>> {
    let mut raw_requests: Vec<RawRequest> = Vec::new();
    let mut definitions: Vec<(String, String)> = Vec::new();

    let mut section = Section::Preamble;
    let mut pending_name: Option<String> = None;
    let mut current: Option<RawRequest> = None;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.starts_with("###") {
            raw_requests.extend(current.take());
            let name = trimmed.trim_start_matches('#').trim();
            pending_name = (!name.is_empty()).then(|| name.to_string());
            section = Section::Preamble;
            continue;
        }

        match section {
            Section::Preamble => {
                if trimmed.is_empty() {
                    continue;
                }
                if let Some(name) = name_directive(trimmed) {
                    pending_name = Some(name);
                    continue;
                }
                if is_comment(trimmed) {
                    continue;
                }
                if let Some(definition) = parse_variable_line(trimmed) {
                    definitions.push(definition);
                    continue;
                }

                let (method, url) = parse_request_line(trimmed).ok_or_else(|| {
                    QuicpulseError::format(format!(
                        "Invalid request line at line {}: '{}'",
                        line_number, trimmed
                    ))
                })?;
                current = Some(RawRequest {
                    name: pending_name.take(),
                    method,
                    url,
                    line_number,
                    ..Default::default()
                });
                section = Section::Headers;
            }
            Section::Headers => {
                if trimmed.is_empty() {
                    section = Section::Body;
                    continue;
                }
                if let Some(name) = name_directive(trimmed) {
                    if let Some(request) = current.as_mut() {
                        request.name = Some(name);
                    }
                    continue;
                }
                if is_comment(trimmed) {
                    continue;
                }
                if let Some((method, url)) = parse_method_line(trimmed) {
                    // Another request without a separator
                    raw_requests.extend(current.take());
                    current = Some(RawRequest {
                        method,
                        url,
                        line_number,
                        ..Default::default()
                    });
                    continue;
                }

                let (name, value) = parse_header_line(trimmed).ok_or_else(|| {
                    QuicpulseError::format(format!(
                        "Invalid header at line {}: '{}'",
                        line_number, trimmed
                    ))
                })?;
                if let Some(request) = current.as_mut() {
                    request.headers.push((name, value));
                }
            }
            Section::Body => {
                let body_started = current
                    .as_ref()
                    .is_some_and(|r| r.body_lines.iter().any(|l| !l.trim().is_empty()));
                if !body_started {
                    if let Some((method, url)) = parse_method_line(trimmed) {
                        raw_requests.extend(current.take());
                        current = Some(RawRequest {
                            method,
                            url,
                            line_number,
                            ..Default::default()
                        });
                        section = Section::Headers;
                        continue;
                    }
                }
                if let Some(request) = current.as_mut() {
                    request.body_lines.push(line.to_string());
                }
            }
        }
    }
    raw_requests.extend(current.take());

    let variables = resolve_definitions(definitions);
    raw_requests
        .into_iter()
        .map(|raw| build_request(raw, &variables))
        .collect()
}

/// Summaries for `--list`: (index, name, method, url)
pub fn list_requests(requests: &[RequestDescriptor]) -> Vec<(usize, String, String, String)> {
    requests
        .iter()
        .enumerate()
        .map(|(i, req)| {
            let name = req.name.clone().unwrap_or_else(|| format!("Request {}", i + 1));
            (i + 1, name, req.method.clone(), req.url.to_string())
        })
        .collect()
}

fn build_request(raw: RawRequest, variables: &HashMap<String, String>) -> Result<RequestDescriptor> {
    let url_text = expand_variables(&raw.url, variables);
    let url = Url::parse(url_text.trim()).map_err(|e| {
        QuicpulseError::format(format!(
            "Invalid URL '{}' at line {}: {}",
            url_text, raw.line_number, e
        ))
    })?;

    let mut request = RequestDescriptor::new(url).with_method(raw.method);
    request.name = raw.name;
    request.headers = raw
        .headers
        .into_iter()
        .map(|(name, value)| (name, expand_variables(&value, variables)))
        .collect::<HeaderList>();

    let body = trim_blank_lines(&raw.body_lines).join("\n");
    if !body.is_empty() {
        let mut body = RequestBody::text(expand_variables(&body, variables));
        body.content_type = request.headers.get("Content-Type").map(str::to_string);
        request.body = Some(body);
    }

    Ok(request)
}

fn trim_blank_lines(lines: &[String]) -> &[String] {
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.trim().is_empty()).map_or(start, |i| i + 1);
    &lines[start..end]
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

fn name_directive(line: &str) -> Option<String> {
    NAME_DIRECTIVE_RE
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Parse `METHOD URL [HTTP/version]` or a bare URL
fn parse_request_line(line: &str) -> Option<(String, String)> {
    if let Some(parsed) = parse_method_line(line) {
        return Some(parsed);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [url] => Some((GET.to_string(), url.to_string())),
        [url, version] if version.starts_with("HTTP/") => Some((GET.to_string(), url.to_string())),
        _ => None,
    }
}

/// Parse a request line that starts with a known method
fn parse_method_line(line: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [method, url] | [method, url, _] if http::is_standard(method) => {
            Some((method.to_uppercase(), url.to_string()))
        }
        _ => None,
    }
}

/// Parse a header line like "Content-Type: application/json"
fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Parse `@name = value`
fn parse_variable_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('@')?;
    let (name, value) = rest.split_once('=')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Values may use variables defined before them
fn resolve_definitions(definitions: Vec<(String, String)>) -> HashMap<String, String> {
    let mut variables = HashMap::new();
    for (name, value) in definitions {
        let value = expand_variables(&value, &variables);
        variables.insert(name, value);
    }
    variables
}

/// Expand `{{name}}` from `variables` and `{{$env.NAME}}` from the environment.
///
/// Unknown names are left untouched.
pub fn expand_variables(s: &str, variables: &HashMap<String, String>) -> String {
    FILE_VARIABLE_RE
        .replace_all(s, |caps: &Captures| {
            let name = &caps[2];
            let value = if caps.get(1).is_some() {
                std::env::var(name).ok()
            } else {
                variables.get(name).cloned()
            };
            value.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
