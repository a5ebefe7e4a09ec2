//! Request/response models shared by the parsers, the resolver and the executor

pub mod request;
pub mod response;

pub use request::{parse_absolute_url, BodyData, RequestBody, RequestDescriptor};
pub use response::{BodyStream, ExecutionLog, ExecutionRecord, ResponseBody, ResponseDescriptor};
