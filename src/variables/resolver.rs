//! Substitutes reference tokens in a request with values from earlier exchanges

use jsonpath_rust::JsonPath;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::token::{Part, Side, TokenMatch, VariableToken};
use crate::models::{BodyData, ExecutionLog, RequestDescriptor};

/// Upper bound on distinct tokens resolved in a single field
pub const MAX_SUBSTITUTIONS: usize = 64;

/// Content type given to a body that gained resolved values but declared none
pub const DEFAULT_BODY_CONTENT_TYPE: &str = "application/json";

/// Resolve every reference token in the headers, the body content type and a text body.
///
/// Fields without tokens are left exactly as they were. Returns the number of substitutions.
pub async fn resolve_request(request: &mut RequestDescriptor, log: &mut ExecutionLog) -> usize {
    let mut total = 0;

    for name in request.headers.names() {
        let Some(joined) = request.headers.get_joined(&name) else {
            continue;
        };
        let (value, count) = resolve_text(&joined, log).await;
        if count > 0 {
            debug!(request = %request.display_name(), header = %name, count, "Resolved header references");
            request.headers.set(&name, value);
            total += count;
        }
    }

    if let Some(body) = request.body.as_mut() {
        if let Some(content_type) = body.content_type.clone() {
            let (value, count) = resolve_text(&content_type, log).await;
            if count > 0 {
                body.content_type = Some(value);
                total += count;
            }
        }

        if let BodyData::Text(text) = &body.data {
            let (value, count) = resolve_text(text, log).await;
            if count > 0 {
                body.data = BodyData::Text(value);
                if body.content_type.is_none() {
                    body.content_type = Some(DEFAULT_BODY_CONTENT_TYPE.to_string());
                }
                total += count;
            }
        }
    }

    total
}

/// Replace the tokens found in `text`, returning the result and the number of distinct tokens resolved.
///
/// Only tokens present in the original text are resolved; inserted values are copied verbatim and
/// never scanned again. At most `MAX_SUBSTITUTIONS` distinct tokens are resolved per field.
pub async fn resolve_text(text: &str, log: &mut ExecutionLog) -> (String, usize) {
    let matches: Vec<TokenMatch> = VariableToken::find_all(text).collect();
    if matches.is_empty() {
        return (text.to_string(), 0);
    }

    let mut values: HashMap<String, Option<String>> = HashMap::new();
    let mut count = 0;
    for found in &matches {
        if values.contains_key(&found.text) {
            continue;
        }
        let value = if count < MAX_SUBSTITUTIONS {
            count += 1;
            Some(lookup(&found.token, log).await)
        } else {
            warn!(limit = MAX_SUBSTITUTIONS, token = %found.text, "Substitution limit reached, leaving reference as written");
            None
        };
        values.insert(found.text.clone(), value);
    }

    let mut resolved = String::with_capacity(text.len());
    let mut last = 0;
    for found in &matches {
        resolved.push_str(&text[last..found.span.start]);
        match values.get(&found.text).and_then(Option::as_deref) {
            Some(value) => resolved.push_str(value),
            None => resolved.push_str(&found.text),
        }
        last = found.span.end;
    }
    resolved.push_str(&text[last..]);

    (resolved, count)
}

/// Value of a single token; misses resolve to an empty string
pub async fn lookup(token: &VariableToken, log: &mut ExecutionLog) -> String {
    let Some(record) = log.get_mut(&token.request_name) else {
        debug!(name = %token.request_name, "Reference to unknown request");
        return String::new();
    };
    let response = &mut record.response;

    match (token.side, token.part) {
        (Side::Request, Part::Headers) => token
            .selector
            .as_deref()
            .and_then(|name| response.request.headers.get_joined(name))
            .unwrap_or_default(),
        (Side::Response, Part::Headers) => token
            .selector
            .as_deref()
            .and_then(|name| response.headers.get_joined(name))
            .unwrap_or_default(),
        (Side::Request, Part::Body) => {
            let body = response
                .request
                .body
                .as_ref()
                .map(|b| b.to_text())
                .unwrap_or_default();
            select_body(&body, token.selector.as_deref())
        }
        (Side::Response, Part::Body) => match response.text().await {
            Ok(body) => select_body(&body, token.selector.as_deref()),
            Err(e) => {
                debug!(name = %token.request_name, error = %e, "Response body unavailable");
                String::new()
            }
        },
    }
}

fn select_body(body: &str, selector: Option<&str>) -> String {
    match selector {
        None => body.to_string(),
        Some(path) => select_json(body, path).unwrap_or_default(),
    }
}

/// First JSONPath match, as text
pub fn select_json(body: &str, path: &str) -> Option<String> {
    let value: JsonValue = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Body is not JSON");
            return None;
        }
    };

    let path = if path.starts_with('$') {
        path.to_string()
    } else {
        format!("$.{}", path)
    };

    match value.query(&path) {
        Ok(results) => results.first().map(|v| json_to_text(v)),
        Err(e) => {
            debug!(path = %path, error = %e, "Invalid JSONPath");
            None
        }
    }
}

fn json_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
