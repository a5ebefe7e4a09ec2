//! HTTP protocol types and constants

mod headers;
mod method;

pub use headers::HeaderList;
pub use method::*;
