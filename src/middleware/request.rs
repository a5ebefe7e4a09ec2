//! Request stages: shape each outgoing [`RequestDescriptor`]

use futures::future::BoxFuture;
use std::io::Write;

use super::pipeline::{Middleware, Next};
use crate::errors::Result;
use crate::http::HeaderList;
use crate::models::RequestDescriptor;

/// Headers every request carries unless the script sets them itself
#[derive(Debug, Clone, Default)]
pub struct DefaultHeadersStage {
    headers: HeaderList,
}

impl DefaultHeadersStage {
    pub fn new(user_agent: impl Into<String>) -> Self {
        let mut headers = HeaderList::new();
        headers.append("User-Agent", user_agent);
        Self { headers }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }
}

impl Middleware<RequestDescriptor> for DefaultHeadersStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestDescriptor,
        next: Next<'a, RequestDescriptor>,
    ) -> BoxFuture<'a, Result<()>> {
        for (name, value) in &self.headers {
            ctx.headers.set_if_absent(name, value);
        }
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "default-headers"
    }
}

/// Print the raw request message to stdout before it goes out
///
/// Runs the remaining request stages first, so the echo shows the request as it is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintRequestStage;

impl PrintRequestStage {
    /// Optional `### name` line, the raw request and a separating blank line
    pub fn render(request: &RequestDescriptor) -> String {
        let mut out = String::new();
        if let Some(name) = &request.name {
            out.push_str(&format!("### {}\n", name));
        }
        out.push_str(request.to_string().trim_end());
        out.push_str("\n\n");
        out
    }
}

impl Middleware<RequestDescriptor> for PrintRequestStage {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestDescriptor,
        next: Next<'a, RequestDescriptor>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            next.run(ctx).await?;
            let rendered = Self::render(ctx);
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{}", rendered)?;
            stdout.flush()?;
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "print-request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Auth, Pipeline};

    #[tokio::test]
    async fn test_user_agent_only_when_absent() {
        let pipeline = Pipeline::<RequestDescriptor>::builder()
            .with(DefaultHeadersStage::new("agent/1.0").with_header("Accept", "*/*"))
            .build();

        let mut plain = RequestDescriptor::parse("https://example.com/").unwrap();
        pipeline.invoke(&mut plain).await.unwrap();
        assert_eq!(plain.headers.get("User-Agent"), Some("agent/1.0"));
        assert_eq!(plain.headers.get("Accept"), Some("*/*"));

        let mut custom = RequestDescriptor::parse("https://example.com/")
            .unwrap()
            .with_header("user-agent", "mine");
        pipeline.invoke(&mut custom).await.unwrap();
        assert_eq!(custom.headers.get_all("User-Agent").collect::<Vec<_>>(), vec!["mine"]);
    }

    #[test]
    fn test_render_request_echo() {
        let request = RequestDescriptor::parse("https://example.com/report?x=1")
            .unwrap()
            .with_name("report")
            .with_header("Accept", "*/*");

        assert_eq!(
            PrintRequestStage::render(&request),
            "### report\nGET /report?x=1 HTTP/1.1\nHost: example.com\nAccept: */*\n\n"
        );
    }

    #[tokio::test]
    async fn test_echo_sees_later_stages() {
        let pipeline = Pipeline::<RequestDescriptor>::builder()
            .with(PrintRequestStage)
            .with(Auth::bearer("t0ken"))
            .build();

        let mut request = RequestDescriptor::parse("https://example.com/").unwrap();
        pipeline.invoke(&mut request).await.unwrap();

        assert!(PrintRequestStage::render(&request).contains("Authorization: Bearer t0ken\n"));
    }

    #[tokio::test]
    async fn test_defaults_then_auth() {
        let pipeline = Pipeline::<RequestDescriptor>::builder()
            .with(DefaultHeadersStage::new("agent/1.0"))
            .with(Auth::bearer("t0ken"))
            .build();

        let mut request = RequestDescriptor::parse("https://example.com/").unwrap();
        pipeline.invoke(&mut request).await.unwrap();

        assert_eq!(
            request.headers.names(),
            vec!["User-Agent".to_string(), "Authorization".to_string()]
        );
    }
}
