//! `{{name.request|response.headers|body[.selector]}}` reference tokens

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::ops::Range;

/// Reference token; the selector runs up to the first closing `}}`
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s?([A-Za-z_]\w*)\.(request|response)\.(headers|body)(?:\.(.*?))?\s?\}\}")
        .expect("Invalid reference token regex")
});

/// Which half of a recorded exchange a token reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Headers,
    Body,
}

/// A parsed back-reference to an earlier named request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableToken {
    pub request_name: String,
    pub side: Side,
    pub part: Part,
    /// Header name or JSONPath; `None` when absent or empty
    pub selector: Option<String>,
}

/// A token found in a field, with the exact text it was written as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    pub text: String,
    pub span: Range<usize>,
    pub token: VariableToken,
}

impl VariableToken {
    /// Parse text that is exactly one token
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TOKEN_RE.captures(text)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != text.len() {
            return None;
        }
        Some(Self::from_captures(&caps))
    }

    /// Every token in `text`, left to right
    pub fn find_all(text: &str) -> impl Iterator<Item = TokenMatch> + '_ {
        TOKEN_RE.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(TokenMatch {
                text: whole.as_str().to_string(),
                span: whole.range(),
                token: Self::from_captures(&caps),
            })
        })
    }

    /// Whether `text` contains at least one token
    pub fn contains_token(text: &str) -> bool {
        TOKEN_RE.is_match(text)
    }

    fn from_captures(caps: &Captures<'_>) -> Self {
        let side = match &caps[2] {
            "request" => Side::Request,
            _ => Side::Response,
        };
        let part = match &caps[3] {
            "headers" => Part::Headers,
            _ => Part::Body,
        };
        let selector = caps
            .get(4)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            request_name: caps[1].to_string(),
            side,
            part,
            selector,
        }
    }
}

impl fmt::Display for VariableToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Request => "request",
            Side::Response => "response",
        };
        let part = match self.part {
            Part::Headers => "headers",
            Part::Body => "body",
        };
        write!(f, "{{{{{}.{}.{}", self.request_name, side, part)?;
        if let Some(selector) = &self.selector {
            write!(f, ".{}", selector)?;
        }
        write!(f, "}}}}")
    }
}
