//! LogSink - emits records as tracing events

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};
use tracing::{debug, error, info, trace, warn};

use crate::scope::{walk_attrs, AttrScope};

/// Sink that forwards records to the installed `tracing` subscriber
#[derive(Debug, Clone)]
pub struct LogSink {
    name: Arc<str>,
    min_level: Level,
    scope: AttrScope,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            min_level: Level::Info,
            scope: AttrScope::new(),
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Effective attributes as `a=1 g.b=2`, groups flattened to dotted keys
    pub fn render_attrs(&self, record: &Record) -> String {
        let merged = self.scope.merged_attrs(record);
        let mut parts = Vec::new();
        walk_attrs(&merged, &mut |path, value| {
            if value.as_group().is_none() {
                parts.push(format!("{path}={value}"));
            }
            true
        });
        parts.join(" ")
    }

    fn derive(&self, scope: AttrScope) -> SinkRef {
        Arc::new(Self {
            name: Arc::clone(&self.name),
            min_level: self.min_level,
            scope,
        })
    }
}

impl Sink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.min_level
    }

    fn handle(&self, _ctx: &Context, record: Record) -> Result<(), SinkError> {
        let attrs = self.render_attrs(&record);
        let sink = self.name.as_ref();
        let message = record.message.as_str();
        match record.level {
            Level::Trace => trace!(sink, attrs = %attrs, "{message}"),
            Level::Debug => debug!(sink, attrs = %attrs, "{message}"),
            Level::Info => info!(sink, attrs = %attrs, "{message}"),
            Level::Warn => warn!(sink, attrs = %attrs, "{message}"),
            Level::Error => error!(sink, attrs = %attrs, "{message}"),
        }
        Ok(())
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
