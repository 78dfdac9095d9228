//! InlineSink - leaf sink assembled from two closures
//!
//! Both closures receive the [`AttrScope`] accumulated through `with_attrs`
//! and `with_group`, so an inline sink can render bound attributes without
//! implementing derivation itself.

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};

use crate::scope::AttrScope;

type EnabledFn = Arc<dyn Fn(&Context, &AttrScope, Level) -> bool + Send + Sync>;
type HandleFn = Arc<dyn Fn(&Context, &AttrScope, Record) -> Result<(), SinkError> + Send + Sync>;

/// Closure-based leaf sink
#[derive(Clone)]
pub struct InlineSink {
    name: Arc<str>,
    scope: AttrScope,
    enabled: EnabledFn,
    handle: HandleFn,
}

impl InlineSink {
    pub fn new<E, H>(name: impl Into<String>, enabled: E, handle: H) -> Self
    where
        E: Fn(&Context, &AttrScope, Level) -> bool + Send + Sync + 'static,
        H: Fn(&Context, &AttrScope, Record) -> Result<(), SinkError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            scope: AttrScope::new(),
            enabled: Arc::new(enabled),
            handle: Arc::new(handle),
        }
    }

    pub fn scope(&self) -> &AttrScope {
        &self.scope
    }

    fn derive(&self, scope: AttrScope) -> SinkRef {
        Arc::new(Self {
            scope,
            ..self.clone()
        })
    }
}

impl Sink for InlineSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        (self.enabled)(ctx, &self.scope, level)
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        (self.handle)(ctx, &self.scope, record)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        self.derive(self.scope.with_attrs(attrs))
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        self.derive(self.scope.with_group(name))
    }
}
