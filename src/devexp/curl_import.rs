//! cURL script import
//!
//! Parses a single `curl ...` command into a [`RequestDescriptor`]. Only the URL, `-X`, `-d`
//! and `-H` are understood; every other flag is skipped.
//!
//! ```text
//! curl -X POST \
//!   -H 'Content-Type: application/json' \
//!   -d '{"name":"John"}' \
//!   https://api.example.com/users
//! ```

use tracing::debug;

use crate::errors::{QuicpulseError, Result};
use crate::http::{self, HeaderList, GET};
use crate::models::{RequestBody, RequestDescriptor};

/// Parse a curl script into a request
pub fn parse_curl_script(script: &str) -> Result<RequestDescriptor> {
    if script.trim().is_empty() {
        return Err(QuicpulseError::format("Empty curl script"));
    }

    let normalized = normalize(script);
    if !starts_with_curl(&normalized) {
        return Err(QuicpulseError::format(format!("Invalid curl script: {}", script)));
    }

    let tokens = tokenize_curl(&normalized)?;
    parse_tokens(&tokens[1..])
}

/// Join continuation lines into a single command line
fn normalize(script: &str) -> String {
    script
        .replace("\\\r\n", " ")
        .replace("\\\n", " ")
        .replace("\r\n", " ")
        .replace('\n', " ")
        .trim()
        .to_string()
}

fn starts_with_curl(line: &str) -> bool {
    line.strip_prefix("curl")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}

/// Split a command line into shell words; quoted text stays in one word
fn tokenize_curl(cmd: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in cmd.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
                in_word = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                in_word = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                in_word = true;
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if in_word {
                    tokens.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            _ => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_single_quote || in_double_quote {
        return Err(QuicpulseError::format("Unterminated quote in curl command"));
    }
    if in_word {
        tokens.push(current);
    }

    Ok(tokens)
}

fn unquote(token: &str) -> &str {
    token.trim_matches(|c| c == '\'' || c == '"')
}

/// Scan the words following `curl`
fn parse_tokens(tokens: &[String]) -> Result<RequestDescriptor> {
    let mut url = None;
    let mut method = None;
    let mut body: Option<String> = None;
    let mut headers: Vec<(String, String)> = Vec::new();

    let mut args = tokens.iter().map(|t| unquote(t));
    while let Some(token) = args.next() {
        if url.is_none() {
            if let Ok(parsed) = url::Url::parse(token) {
                url = Some(parsed);
                continue;
            }
        }

        match token {
            "-X" => {
                if let Some(value) = args.next() {
                    match http::canonical(value) {
                        Some(m) => method = Some(m),
                        None => debug!(method = value, "Ignoring unsupported curl method"),
                    }
                }
            }
            "-d" => {
                if let Some(value) = args.next() {
                    body = Some(value.to_string());
                }
            }
            "-H" => {
                if let Some(value) = args.next() {
                    let (name, value) = value.split_once(':').unwrap_or((value, ""));
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                }
            }
            other => debug!(token = other, "Skipping curl argument"),
        }
    }

    let url = url.ok_or_else(|| QuicpulseError::format("Url info not found"))?;
    let mut request = RequestDescriptor::new(url).with_method(method.unwrap_or(GET));
    request.headers = group_headers(headers);
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        request.body = Some(RequestBody::text(body));
    }

    Ok(request)
}

/// Merge repeated header names into one entry at the first occurrence
fn group_headers(pairs: Vec<(String, String)>) -> HeaderList {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (name, value) in pairs {
        match grouped.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name, vec![value])),
        }
    }
    grouped
        .into_iter()
        .map(|(name, values)| (name, values.join(",")))
        .collect()
}
