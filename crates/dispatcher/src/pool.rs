//! Pool - spread records across children
//!
//! Each call picks a uniformly random rotation start and then walks the
//! children in failover order from there. Over many calls the load spreads
//! evenly; a failing child just hands its record to the next one.

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};
use rand::Rng;

use crate::failover::first_success;

/// Load-balancing composite
pub struct Pool {
    sinks: Vec<SinkRef>,
}

impl Pool {
    pub fn new(sinks: Vec<SinkRef>) -> Self {
        Self { sinks }
    }

    pub fn sinks(&self) -> &[SinkRef] {
        &self.sinks
    }
}

/// Build a pool composite
pub fn pool(sinks: Vec<SinkRef>) -> SinkRef {
    Arc::new(Pool::new(sinks))
}

impl Sink for Pool {
    fn name(&self) -> &str {
        "pool"
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sinks.iter().any(|s| s.enabled(ctx, level))
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        if self.sinks.is_empty() {
            return Ok(());
        }
        let start = rand::thread_rng().gen_range(0..self.sinks.len());
        let (head, tail) = self.sinks.split_at(start);
        first_success(tail.iter().chain(head), ctx, &record)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        pool(
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
        pool(self.sinks.iter().map(|s| s.clone().with_group(name)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    #[test]
    fn test_every_record_lands_exactly_once() {
        let members: Vec<MemorySink> = (0..3).map(|i| MemorySink::new(format!("m{i}"))).collect();
        let sink = pool(
            members
                .iter()
                .map(|m| Arc::new(m.clone()) as SinkRef)
                .collect(),
        );

        for _ in 0..30 {
            sink.handle(&Context::background(), Record::now(Level::Info, "x"))
                .unwrap();
        }

        let total: usize = members.iter().map(|m| m.records().len()).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_empty_pool_is_noop() {
        let sink = pool(Vec::new());
        assert!(!sink.enabled(&Context::background(), Level::Info));
        assert!(sink
            .handle(&Context::background(), Record::now(Level::Info, "x"))
            .is_ok());
    }

    #[test]
    fn test_derivation_reaches_every_member() {
        let members: Vec<MemorySink> = (0..3).map(|i| MemorySink::new(format!("m{i}"))).collect();
        let derived = pool(
            members
                .iter()
                .map(|m| Arc::new(m.clone()) as SinkRef)
                .collect(),
        )
        .with_attrs(vec![Attr::new("service", "api")])
        .with_group("req");

        for _ in 0..30 {
            derived
                .handle(
                    &Context::background(),
                    Record::now(Level::Info, "x").with_attr(Attr::new("id", 7i64)),
                )
                .unwrap();
        }

        let expected = [
            Attr::new("service", "api"),
            Attr::group("req", vec![Attr::new("id", 7i64)]),
        ];
        let records: Vec<Record> = members.iter().flat_map(|m| m.records()).collect();
        assert_eq!(records.len(), 30);
        assert!(records.iter().all(|r| r.attrs() == expected));
    }
}
