//! Fanout - every enabled child gets its own copy of the record
//!
//! ```text
//!   handle(record)
//!       │              (clone per child)
//!       ├──────────► child 1 ─┐
//!       ├──────────► child 2 ─┼─► errors joined into SinkError::Aggregate
//!       └──────────► child N ─┘
//! ```

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};
use tracing::warn;

use crate::fault::try_handle;

/// Composite that forwards each record to all enabled children
pub struct Fanout {
    sinks: Vec<SinkRef>,
}

/// Build a fan-out over `sinks`.
///
/// Nested fan-outs are flattened in order, so `fanout([fanout([a, b]), c])`
/// is the same composite as `fanout([a, b, c])`. A single sink is returned
/// as-is.
pub fn fanout(sinks: Vec<SinkRef>) -> SinkRef {
    let mut flat: Vec<SinkRef> = Vec::with_capacity(sinks.len());
    for sink in sinks {
        match sink.fanout_members() {
            Some(members) => flat.extend(members.iter().cloned()),
            None => flat.push(sink),
        }
    }

    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }
    Arc::new(Fanout { sinks: flat })
}

impl Fanout {
    pub fn sinks(&self) -> &[SinkRef] {
        &self.sinks
    }
}

impl Sink for Fanout {
    fn name(&self) -> &str {
        "fanout"
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sinks.iter().any(|s| s.enabled(ctx, level))
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        let mut errors = Vec::new();
        for sink in &self.sinks {
            if !sink.enabled(ctx, record.level) {
                continue;
            }
            if let Err(e) = try_handle(sink.as_ref(), ctx, record.clone()) {
                warn!(sink = %sink.name(), error = %e, "Fanout child failed");
                errors.push(e);
            }
        }
        SinkError::join(errors)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        fanout(
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
        fanout(
            self.sinks
                .iter()
                .map(|s| s.clone().with_group(name))
                .collect(),
        )
    }

    fn fanout_members(&self) -> Option<&[SinkRef]> {
        Some(&self.sinks)
    }
}
