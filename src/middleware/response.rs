//! Response stages: act on each [`ResponseDescriptor`] after the transport returns

use futures::future::BoxFuture;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::pipeline::{Middleware, Next};
use crate::downloads::{resolve_target, write_body};
use crate::errors::Result;
use crate::models::ResponseDescriptor;

/// Save the response body to a file
#[derive(Debug, Clone, Default)]
pub struct DownloadStage {
    /// Explicit target; otherwise derived from the response
    pub output: Option<PathBuf>,
    /// Append instead of truncating
    pub append: bool,
}

impl Middleware<ResponseDescriptor> for DownloadStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut ResponseDescriptor,
        next: Next<'a, ResponseDescriptor>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let target = resolve_target(self.output.as_deref(), &ctx.request.url, &ctx.headers);
            let body = ctx.bytes().await?;
            write_body(&target, &body, self.append).await?;
            info!(path = %target.display(), bytes = body.len(), append = self.append, "Saved response body");
            next.run(ctx).await
        })
    }

    fn name(&self) -> &str {
        "download"
    }
}

/// Print the raw response message and timing to stdout
///
/// The request echo is printed by [`PrintRequestStage`](super::PrintRequestStage) before sending.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintStage;

impl PrintStage {
    /// Response and timing, as printed
    pub async fn render(response: &mut ResponseDescriptor) -> Result<String> {
        let elapsed_ms = response.elapsed.as_millis();
        let raw = response.to_raw_message().await?;

        let mut out = String::new();
        out.push_str(raw.trim_end());
        out.push_str(&format!("\n\nDuration: {}ms\n", elapsed_ms));
        Ok(out)
    }
}

impl Middleware<ResponseDescriptor> for PrintStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut ResponseDescriptor,
        next: Next<'a, ResponseDescriptor>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let rendered = Self::render(ctx).await?;
            {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", rendered)?;
                stdout.flush()?;
            }
            next.run(ctx).await
        })
    }

    fn name(&self) -> &str {
        "print"
    }
}
