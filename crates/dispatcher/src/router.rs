//! Router - predicate-based routing builder
//!
//! ```ignore
//! let sink = Router::new()
//!     .add(console, vec![level_is([Level::Info])])
//!     .add(file, vec![level_is([Level::Error])])
//!     .build();
//! ```
//!
//! By default every matching route receives the record (fan-out over the
//! routes). `first_match()` switches to delivering to the first matching
//! route only.

use std::sync::Arc;

use contracts::SinkRef;

use crate::fanout::fanout;
use crate::first_match::FirstMatch;
use crate::predicate::PredicateRef;
use crate::routable::RoutableSink;

/// Builder for routing composites
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<RoutableSink>,
    first_match: bool,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route; the sink receives records for which every
    /// predicate passes (no predicates: every record)
    pub fn add(mut self, sink: SinkRef, predicates: Vec<PredicateRef>) -> Self {
        self.routes.push(RoutableSink::new(sink, predicates));
        self
    }

    /// Deliver to the first matching route only
    pub fn first_match(mut self) -> Self {
        self.first_match = true;
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finalize into a sink
    pub fn build(self) -> SinkRef {
        if self.first_match {
            Arc::new(FirstMatch::new(self.routes))
        } else {
            fanout(
                self.routes
                    .into_iter()
                    .map(|r| Arc::new(r) as SinkRef)
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{attr_kind_is, attr_value_is, level_is};
    use crate::sinks::MemorySink;
    use contracts::{Attr, Context, Level, Record, Value, ValueKind};

    fn messages(sink: &MemorySink) -> Vec<String> {
        sink.records().into_iter().map(|r| r.message).collect()
    }

    #[test]
    fn test_fan_mode_delivers_to_every_match() {
        let info = MemorySink::new("info");
        let errors = MemorySink::new("errors");
        let all = MemorySink::new("all");

        let sink = Router::new()
            .add(Arc::new(info.clone()), vec![level_is([Level::Info])])
            .add(Arc::new(errors.clone()), vec![level_is([Level::Error])])
            .add(Arc::new(all.clone()), vec![])
            .build();

        let ctx = Context::background();
        sink.handle(&ctx, Record::now(Level::Info, "a")).unwrap();
        sink.handle(&ctx, Record::now(Level::Error, "b")).unwrap();

        assert_eq!(messages(&info), vec!["a"]);
        assert_eq!(messages(&errors), vec!["b"]);
        assert_eq!(messages(&all), vec!["a", "b"]);
    }

    #[test]
    fn test_routes_on_bound_attributes() {
        let influx = MemorySink::new("influx");
        let other = MemorySink::new("other");

        let sink = Router::new()
            .add(Arc::new(influx.clone()), vec![attr_value_is([("scope", "influx")])])
            .add(Arc::new(other.clone()), vec![])
            .build();

        let scoped = sink.with_attrs(vec![Attr::new("scope", "influx")]);
        scoped
            .handle(
                &Context::background(),
                Record::now(Level::Info, "write").with_attr(Attr::new("query", "INSERT")),
            )
            .unwrap();

        assert_eq!(messages(&influx), vec!["write"]);
        assert_eq!(messages(&other), vec!["write"]);
    }

    #[test]
    fn test_first_match_uses_kind_predicates() {
        let queries = MemorySink::new("queries").with_min_level(Level::Info);
        let other = MemorySink::new("other").with_min_level(Level::Debug);

        let sink = Router::new()
            .add(
                Arc::new(queries.clone()),
                vec![attr_kind_is([("query", ValueKind::String), ("args", ValueKind::Any)])],
            )
            .add(Arc::new(other.clone()), vec![])
            .first_match()
            .build();

        let ctx = Context::background();
        let db = |level, msg: &str| {
            Record::now(level, msg)
                .with_attr(Attr::new("query", "SELECT * FROM users"))
                .with_attr(Attr::new("args", Value::any(vec![1, 2, 3])))
        };

        sink.handle(&ctx, db(Level::Info, "db log 1")).unwrap();
        // matched the query route, which is disabled at debug: dropped
        sink.handle(&ctx, db(Level::Debug, "db log 2")).unwrap();
        sink.handle(
            &ctx,
            Record::now(Level::Info, "other logs").with_attr(Attr::new("something", "value")),
        )
        .unwrap();

        assert_eq!(messages(&queries), vec!["db log 1"]);
        assert_eq!(messages(&other), vec!["other logs"]);
    }
}
