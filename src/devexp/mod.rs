//! Script formats
//!
//! - **Curl scripts**: a single `curl ...` command
//! - **Batch scripts**: `.http`/`.rest` files with one or more named request blocks
//!
//! ```bash
//! quicpulse-exec --type curl request.curl
//! quicpulse-exec api.http
//! ```

pub mod curl_import;
pub mod http_file;

pub use curl_import::parse_curl_script;
pub use http_file::{expand_variables, list_requests, parse_http_content, parse_http_file};
