//! Recovery wrapper
//!
//! Shields the caller from a panicking sink and reports every failure to a
//! callback. The failure is still returned: recovery is for observability,
//! not suppression.

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};

use crate::fault::try_handle;
use crate::middleware::Middleware;

/// Callback invoked with the original record and the normalized error
pub type RecoveryFn = Arc<dyn Fn(&Context, &Record, &SinkError) + Send + Sync>;

/// Middleware installing a [`RecoverSink`]
#[derive(Clone)]
pub struct Recover {
    callback: RecoveryFn,
}

impl Recover {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Context, &Record, &SinkError) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Recovery that reports failures through `tracing`
    pub fn logging() -> Self {
        Self::new(|_ctx, record, err| {
            tracing::error!(
                level = %record.level,
                message = %record.message,
                error = %err,
                "Sink failed to handle record"
            );
        })
    }
}

impl Middleware for Recover {
    fn wrap(&self, next: SinkRef) -> SinkRef {
        Arc::new(RecoverSink {
            sink: next,
            callback: Arc::clone(&self.callback),
        })
    }
}

/// Sink wrapped by [`Recover`]
pub struct RecoverSink {
    sink: SinkRef,
    callback: RecoveryFn,
}

impl RecoverSink {
    fn rewrap(&self, sink: SinkRef) -> SinkRef {
        Arc::new(RecoverSink {
            sink,
            callback: Arc::clone(&self.callback),
        })
    }
}

impl Sink for RecoverSink {
    fn name(&self) -> &str {
        self.sink.name()
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sink.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        let original = record.clone();
        let result = try_handle(self.sink.as_ref(), ctx, record);
        if let Err(e) = &result {
            (self.callback)(ctx, &original, e);
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
