//! Request back-references
//!
//! A later request in a batch script can read parts of an earlier named request or its
//! response:
//!
//! ```http
//! Authorization: Bearer {{login.response.body.$.token}}
//! X-Request-Id: {{login.request.headers.X-Request-Id}}
//! ```
//!
//! References to unknown requests, headers or paths resolve to an empty string.

pub mod resolver;
pub mod token;

pub use resolver::{lookup, resolve_request, resolve_text, select_json, MAX_SUBSTITUTIONS};
pub use token::{Part, Side, TokenMatch, VariableToken};
