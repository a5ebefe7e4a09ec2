use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ScriptType;
use crate::client::{ClientSettings, Connector, Transport, TransportResponse};
use crate::devexp::{parse_curl_script, parse_http_file};
use crate::errors::{QuicpulseError, Result};
use crate::middleware::{HandlerPipeline, Pipeline, RequestPipeline, ResponsePipeline};
use crate::models::{ExecutionLog, ExecutionRecord, RequestDescriptor, ResponseBody, ResponseDescriptor};
use crate::variables::resolve_request;

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests sent
    pub executed: usize,
    /// Responses released, whether at once (unnamed) or at run end
    pub released: usize,
}

/// Runs scripts through the handler, request and response pipelines
pub struct Executor {
    connector: Arc<dyn Connector>,
    settings: ClientSettings,
    handler: HandlerPipeline,
    request: RequestPipeline,
    response: ResponsePipeline,
}

impl Executor {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            settings: ClientSettings::default(),
            handler: Pipeline::empty(),
            request: Pipeline::empty(),
            response: Pipeline::empty(),
        }
    }

    /// Settings the handler pipeline starts from
    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_handler_pipeline(mut self, pipeline: HandlerPipeline) -> Self {
        self.handler = pipeline;
        self
    }

    pub fn with_request_pipeline(mut self, pipeline: RequestPipeline) -> Self {
        self.request = pipeline;
        self
    }

    pub fn with_response_pipeline(mut self, pipeline: ResponsePipeline) -> Self {
        self.response = pipeline;
        self
    }

    /// Read a script file and run it
    pub async fn run_script_file(
        &self,
        path: &Path,
        script_type: ScriptType,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        match script_type {
            ScriptType::Http => {
                let requests = parse_http_file(path, cancel).await?;
                self.run_batch(requests, cancel).await
            }
            ScriptType::Curl => {
                let script = cancellable(cancel, async {
                    tokio::fs::read_to_string(path).await.map_err(QuicpulseError::from)
                })
                .await?;
                self.run_curl_script(&script, cancel).await
            }
        }
    }

    /// Parse and send a single curl command
    pub async fn run_curl_script(&self, script: &str, cancel: &CancellationToken) -> Result<RunSummary> {
        let request = parse_curl_script(script)?;
        self.run_batch(vec![request], cancel).await
    }

    /// Send `requests` in order, stopping at the first failure
    pub async fn run_batch(
        &self,
        requests: Vec<RequestDescriptor>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        if requests.is_empty() {
            warn!("Script contains no requests");
            return Ok(summary);
        }

        let mut log = ExecutionLog::new();
        let result = self.execute_all(requests, &mut log, &mut summary, cancel).await;

        summary.released += log.release_all();
        debug!(executed = summary.executed, released = summary.released, "Run finished");

        result.map(|()| summary)
    }

    async fn execute_all(
        &self,
        requests: Vec<RequestDescriptor>,
        log: &mut ExecutionLog,
        summary: &mut RunSummary,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let transport = self.connect(cancel).await?;

        for request in requests {
            if cancel.is_cancelled() {
                return Err(QuicpulseError::Cancelled);
            }

            let name = request.display_name().to_string();
            let mut response = self
                .execute_one(transport.as_ref(), request, log, cancel)
                .await
                .inspect_err(|e| debug!(request = %name, error = %e, "Request failed, aborting run"))?;
            summary.executed += 1;

            match response.request.name.clone() {
                Some(name) => log.insert(ExecutionRecord::new(name, response)),
                None => match response.body.release() {
                    Ok(()) => summary.released += 1,
                    Err(e) => warn!(request = %name, error = %e, "Failed to release response"),
                },
            }
        }

        Ok(())
    }

    /// Run the handler pipeline over a fresh copy of the settings and connect
    async fn connect(&self, cancel: &CancellationToken) -> Result<Arc<dyn Transport>> {
        let mut settings = self.settings.clone();
        cancellable(cancel, self.handler.invoke(&mut settings)).await?;
        debug!(?settings, "Connecting transport");
        self.connector.connect(&settings)
    }

    async fn execute_one(
        &self,
        transport: &dyn Transport,
        mut request: RequestDescriptor,
        log: &mut ExecutionLog,
        cancel: &CancellationToken,
    ) -> Result<ResponseDescriptor> {
        let substitutions = resolve_request(&mut request, log).await;
        if substitutions > 0 {
            debug!(request = %request.display_name(), substitutions, "Resolved references");
        }

        cancellable(cancel, self.request.invoke(&mut request)).await?;

        let started = Instant::now();
        let TransportResponse { status, headers, body } =
            cancellable(cancel, transport.execute(&request)).await?;
        let elapsed = started.elapsed();

        info!(
            request = %request.display_name(),
            method = %request.method,
            url = %request.url,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        let mut response = ResponseDescriptor::new(status, headers, request, ResponseBody::from_stream(body));
        response.elapsed = elapsed;

        if let Err(e) = cancellable(cancel, self.response.invoke(&mut response)).await {
            if let Err(release_error) = response.body.release() {
                warn!(error = %release_error, "Failed to release response");
            }
            return Err(e);
        }

        Ok(response)
    }
}

/// Race `future` against the cancellation token
async fn cancellable<T>(cancel: &CancellationToken, future: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QuicpulseError::Cancelled),
        result = future => result,
    }
}
