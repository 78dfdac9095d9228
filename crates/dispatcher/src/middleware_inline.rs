//! InlineMiddleware - middleware assembled from closures
//!
//! Each hook receives the next sink and decides whether and how to delegate.
//! Hooks that are not set delegate unchanged, so a middleware that only
//! rewrites records needs nothing but `on_handle`.

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};

use crate::middleware::Middleware;

type EnabledHook = Arc<dyn Fn(&Context, Level, &SinkRef) -> bool + Send + Sync>;
type HandleHook = Arc<dyn Fn(&Context, Record, &SinkRef) -> Result<(), SinkError> + Send + Sync>;
type WithAttrsHook = Arc<dyn Fn(Vec<Attr>, &SinkRef) -> SinkRef + Send + Sync>;
type WithGroupHook = Arc<dyn Fn(&str, &SinkRef) -> SinkRef + Send + Sync>;

/// Closure-based middleware
#[derive(Clone, Default)]
pub struct InlineMiddleware {
    enabled: Option<EnabledHook>,
    handle: Option<HandleHook>,
    with_attrs: Option<WithAttrsHook>,
    with_group: Option<WithGroupHook>,
}

impl InlineMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enabled<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, Level, &SinkRef) -> bool + Send + Sync + 'static,
    {
        self.enabled = Some(Arc::new(f));
        self
    }

    pub fn on_handle<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, Record, &SinkRef) -> Result<(), SinkError> + Send + Sync + 'static,
    {
        self.handle = Some(Arc::new(f));
        self
    }

    pub fn on_with_attrs<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<Attr>, &SinkRef) -> SinkRef + Send + Sync + 'static,
    {
        self.with_attrs = Some(Arc::new(f));
        self
    }

    pub fn on_with_group<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &SinkRef) -> SinkRef + Send + Sync + 'static,
    {
        self.with_group = Some(Arc::new(f));
        self
    }
}

impl Middleware for InlineMiddleware {
    fn wrap(&self, next: SinkRef) -> SinkRef {
        Arc::new(InlineMiddlewareSink {
            next,
            hooks: self.clone(),
        })
    }
}

/// Sink produced by [`InlineMiddleware`]
pub struct InlineMiddlewareSink {
    next: SinkRef,
    hooks: InlineMiddleware,
}

impl Sink for InlineMiddlewareSink {
    fn name(&self) -> &str {
        self.next.name()
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        match &self.hooks.enabled {
            Some(hook) => hook(ctx, level, &self.next),
            None => self.next.enabled(ctx, level),
        }
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        match &self.hooks.handle {
            Some(hook) => hook(ctx, record, &self.next),
            None => self.next.handle(ctx, record),
        }
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        let next = match &self.hooks.with_attrs {
            Some(hook) => hook(attrs, &self.next),
            None => self.next.clone().with_attrs(attrs),
        };
        self.hooks.wrap(next)
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        let next = match &self.hooks.with_group {
            Some(hook) => hook(name, &self.next),
            None => self.next.clone().with_group(name),
        };
        self.hooks.wrap(next)
    }
}
