//! Domain-side request handlers.

use crate::auth::CallContext;
use crate::error::Result;
use crate::value::Message;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Business logic for one method, operating on domain values only.
///
/// Returning `Ok(None)` is a contract violation that the adapter reports to
/// the caller as a null response.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &CallContext, request: Message) -> Result<Option<Message>>;
}

/// Handler backed by an async closure, see [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure returning a future as a [`Handler`].
///
/// The closure receives an owned copy of the call context so the returned
/// future does not borrow from the adapter.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(CallContext, Message) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Message>>> + Send,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(CallContext, Message) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Message>>> + Send,
{
    async fn handle(&self, ctx: &CallContext, request: Message) -> Result<Option<Message>> {
        (self.f)(ctx.clone(), request).await
    }
}

/// Handlers keyed by method name (`Method`, not the full route).
#[derive(Default, Clone)]
pub struct Handlers {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.insert(method, Arc::new(handler));
        self
    }

    pub fn insert(&mut self, method: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.insert(method.into(), handler);
    }

    pub fn get(&self, method: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(method).cloned()
    }

    /// Names of the methods that have a handler.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
