//! Failover - forward to the first child that succeeds

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};
use tracing::debug;

use crate::fault::try_handle;

/// Children are tried in priority order until one succeeds
pub struct Failover {
    sinks: Vec<SinkRef>,
}

impl Failover {
    pub fn new(sinks: Vec<SinkRef>) -> Self {
        Self { sinks }
    }

    pub fn sinks(&self) -> &[SinkRef] {
        &self.sinks
    }
}

/// Build a failover composite
pub fn failover(sinks: Vec<SinkRef>) -> SinkRef {
    Arc::new(Failover::new(sinks))
}

/// Try `sinks` in the given order. Returns on the first success; otherwise
/// the last error, or `Ok` when no child was enabled.
pub(crate) fn first_success<'a>(
    sinks: impl IntoIterator<Item = &'a SinkRef>,
    ctx: &Context,
    record: &Record,
) -> Result<(), SinkError> {
    let mut last_error = None;
    for sink in sinks {
        if !sink.enabled(ctx, record.level) {
            continue;
        }
        match try_handle(sink.as_ref(), ctx, record.clone()) {
            Ok(()) => return Ok(()),
            Err(e) => {
                debug!(sink = %sink.name(), error = %e, "Sink failed, trying next");
                last_error = Some(e);
            }
        }
    }
    last_error.map_or(Ok(()), Err)
}

impl Sink for Failover {
    fn name(&self) -> &str {
        "failover"
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sinks.iter().any(|s| s.enabled(ctx, level))
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        first_success(&self.sinks, ctx, &record)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        failover(
            self.sinks
                .iter()
                .map(|s| s.clone().with_attrs(attrs.clone()))
                .collect(),
        )
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        failover(self.sinks.iter().map(|s| s.clone().with_group(name)).collect())
    }
}
