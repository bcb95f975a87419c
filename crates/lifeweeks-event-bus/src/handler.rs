//! Event handler abstraction.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::event::Event;

/// A subscriber that reacts to published events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used to identify the handler in logs.
    fn name(&self) -> &str;

    /// Processes one event. An error is logged by the bus and does not
    /// affect other handlers.
    async fn handle(&self, event: &Event) -> Result<(), DomainError>;
}

/// Adapts an async closure into an [`EventHandler`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &Event) -> Result<(), DomainError> {
        (self.f)(event.clone()).await
    }
}

/// Wraps `f` as a shareable handler named `name`.
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn EventHandler>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    Arc::new(FnHandler {
        name: name.into(),
        f,
    })
}
