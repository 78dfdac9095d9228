//! Sink metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};

use crate::fault::try_handle;
use crate::middleware::Middleware;

/// Counters for one sink (shared by every derivation of it)
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Records handled successfully
    handled_count: AtomicU64,
    /// Records whose handling returned an error
    failure_count: AtomicU64,
    /// Records handed to `handle` that the wrapped sink's level gate rejected
    filtered_count: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handled_count(&self) -> u64 {
        self.handled_count.load(Ordering::Relaxed)
    }

    pub fn inc_handled_count(&self) {
        self.handled_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    pub fn inc_filtered_count(&self) {
        self.filtered_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            handled_count: self.handled_count(),
            failure_count: self.failure_count(),
            filtered_count: self.filtered_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub handled_count: u64,
    pub failure_count: u64,
    pub filtered_count: u64,
}

/// Middleware counting calls into a shared [`SinkMetrics`]
#[derive(Debug, Clone, Default)]
pub struct Metered {
    metrics: Arc<SinkMetrics>,
}

impl Metered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> Arc<SinkMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Middleware for Metered {
    fn wrap(&self, next: SinkRef) -> SinkRef {
        Arc::new(MeteredSink {
            sink: next,
            metrics: Arc::clone(&self.metrics),
        })
    }
}

/// Sink wrapped by [`Metered`]
///
/// All counting happens in `handle`, once per record. `enabled` is a plain
/// pass-through since composites may ask it more than once for one record.
pub struct MeteredSink {
    sink: SinkRef,
    metrics: Arc<SinkMetrics>,
}

impl MeteredSink {
    fn rewrap(&self, sink: SinkRef) -> SinkRef {
        Arc::new(MeteredSink {
            sink,
            metrics: Arc::clone(&self.metrics),
        })
    }
}

impl Sink for MeteredSink {
    fn name(&self) -> &str {
        self.sink.name()
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sink.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        if !self.sink.enabled(ctx, record.level) {
            self.metrics.inc_filtered_count();
            return Ok(());
        }
        let result = try_handle(self.sink.as_ref(), ctx, record);
        match &result {
            Ok(()) => self.metrics.inc_handled_count(),
            Err(_) => self.metrics.inc_failure_count(),
        }
        result
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        self.rewrap(self.sink.clone().with_attrs(attrs))
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        self.rewrap(self.sink.clone().with_group(name))
    }
}
