//! Ordered async middleware chain over a single mutable context
//!
//! Each stage receives the context and a [`Next`] continuation. A stage can work on the
//! context before continuing, after continuing (around-advice), or not continue at all.
//! `Next::run` consumes the continuation, so the rest of the chain runs at most once per stage.

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

use crate::errors::Result;

/// One stage of a [`Pipeline`]
pub trait Middleware<C>: Send + Sync {
    /// Process `ctx`, optionally handing it on to the rest of the chain
    fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C>) -> BoxFuture<'a, Result<()>>;

    /// Stage name for diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Continuation over the stages that follow the current one
pub struct Next<'a, C> {
    rest: &'a [Arc<dyn Middleware<C>>],
}

impl<'a, C: Send> Next<'a, C> {
    /// Run the remaining stages
    pub fn run<'b>(self, ctx: &'b mut C) -> BoxFuture<'b, Result<()>>
    where
        'a: 'b,
    {
        match self.rest.split_first() {
            Some((stage, rest)) => stage.handle(ctx, Next { rest }),
            None => Box::pin(async { Ok(()) }),
        }
    }

    /// Number of stages left in the chain
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

/// Stage built from a closure
struct FnMiddleware<F> {
    name: String,
    f: F,
}

impl<C, F> Middleware<C> for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C>) -> BoxFuture<'a, Result<()>> {
        (self.f)(ctx, next)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Collects stages in registration order
pub struct PipelineBuilder<C> {
    stages: Vec<Arc<dyn Middleware<C>>>,
}

impl<C: Send + 'static> PipelineBuilder<C> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage
    pub fn with<M>(mut self, stage: M) -> Self
    where
        M: Middleware<C> + 'static,
    {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append a shared stage
    pub fn with_shared(mut self, stage: Arc<dyn Middleware<C>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a closure stage
    pub fn with_fn<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, Next<'a, C>) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        self.stages.push(Arc::new(FnMiddleware { name: name.into(), f }));
        self
    }

    /// Append a stage when `stage` is `Some`
    pub fn with_optional<M>(self, stage: Option<M>) -> Self
    where
        M: Middleware<C> + 'static,
    {
        match stage {
            Some(stage) => self.with(stage),
            None => self,
        }
    }

    pub fn build(self) -> Pipeline<C> {
        Pipeline {
            stages: self.stages.into(),
        }
    }
}

impl<C: Send + 'static> Default for PipelineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Composed, immutable chain of stages
pub struct Pipeline<C> {
    stages: Arc<[Arc<dyn Middleware<C>>]>,
}

impl<C: Send + 'static> Pipeline<C> {
    pub fn builder() -> PipelineBuilder<C> {
        PipelineBuilder::new()
    }

    /// A pipeline without stages; invoking it leaves the context untouched
    pub fn empty() -> Self {
        PipelineBuilder::new().build()
    }

    /// Run every stage over `ctx`; the first error stops the chain and is returned as-is
    pub async fn invoke(&self, ctx: &mut C) -> Result<()> {
        Next { rest: &self.stages[..] }.run(ctx).await
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl<C> Clone for Pipeline<C> {
    fn clone(&self) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
        }
    }
}

impl<C: Send + 'static> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
