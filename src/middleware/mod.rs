//! Async middleware pipelines
//!
//! One generic [`Pipeline`] type is instantiated three times:
//! - `Pipeline<ClientSettings>` shapes the transport before it is connected
//! - `Pipeline<RequestDescriptor>` shapes each outgoing request
//! - `Pipeline<ResponseDescriptor>` acts on each response

pub mod auth;
pub mod handler;
pub mod pipeline;
pub mod request;
pub mod response;

pub use auth::{Auth, AuthType};
pub use handler::{FollowRedirectStage, SslStage, TimeoutStage};
pub use pipeline::{Middleware, Next, Pipeline, PipelineBuilder};
pub use request::{DefaultHeadersStage, PrintRequestStage};
pub use response::{DownloadStage, PrintStage};

use crate::client::ClientSettings;
use crate::models::{RequestDescriptor, ResponseDescriptor};

pub type HandlerPipeline = Pipeline<ClientSettings>;
pub type RequestPipeline = Pipeline<RequestDescriptor>;
pub type ResponsePipeline = Pipeline<ResponseDescriptor>;
