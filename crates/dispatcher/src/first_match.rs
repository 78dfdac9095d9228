//! FirstMatch - deliver to the first route whose predicates pass
//!
//! Matching and enablement are decided together for the winning route only:
//! if the first matching route is disabled for the record's level the record
//! is dropped; it never falls through to a later route.

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};
use tracing::trace;

use crate::fault::try_handle;
use crate::routable::RoutableSink;

/// Ordered routes, at most one of which receives a record
pub struct FirstMatch {
    routes: Vec<RoutableSink>,
}

impl FirstMatch {
    pub fn new(routes: Vec<RoutableSink>) -> Self {
        Self {
            // matching happens here, the route must not evaluate it again
            routes: routes
                .into_iter()
                .map(RoutableSink::skipping_match_check)
                .collect(),
        }
    }

    pub fn routes(&self) -> &[RoutableSink] {
        &self.routes
    }
}

impl Sink for FirstMatch {
    fn name(&self) -> &str {
        "first_match"
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.routes.iter().any(|r| r.enabled(ctx, level))
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        let Some(route) = self.routes.iter().find(|r| r.is_match(ctx, &record)) else {
            trace!(message = %record.message, "No route matched");
            return Ok(());
        };

        if !route.enabled(ctx, record.level) {
            trace!(sink = %route.name(), level = %record.level, "Matched route disabled, dropping");
            return Ok(());
        }
        try_handle(route, ctx, record)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        Arc::new(FirstMatch::new(
            self.routes
                .iter()
                .map(|r| r.derive_attrs(attrs.clone()))
                .collect(),
        ))
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        Arc::new(FirstMatch::new(
            self.routes.iter().map(|r| r.derive_group(name)).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{attr_value_is, from_fn, Predicate};
    use crate::sinks::{InlineSink, MemorySink};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_derived_routes_see_bound_attrs_and_match_once() {
        let db = MemorySink::new("db");
        let other = MemorySink::new("other");
        let evaluations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&evaluations);
        let scoped = attr_value_is([("scope", "db")]);
        let counting = from_fn(move |ctx, record| {
            counter.fetch_add(1, Ordering::SeqCst);
            scoped.matches(ctx, record)
        });

        let base: SinkRef = Arc::new(FirstMatch::new(vec![
            RoutableSink::new(Arc::new(db.clone()), vec![counting]),
            RoutableSink::new(Arc::new(other.clone()), vec![]),
        ]));
        let derived = base.clone().with_attrs(vec![Attr::new("scope", "db")]);

        let ctx = Context::background();
        derived.handle(&ctx, Record::now(Level::Info, "q1")).unwrap();
        assert_eq!(evaluations.load(Ordering::SeqCst), 1);

        derived
            .with_group("req")
            .handle(&ctx, Record::now(Level::Info, "q2"))
            .unwrap();
        assert_eq!(evaluations.load(Ordering::SeqCst), 2);

        base.handle(&ctx, Record::now(Level::Info, "plain")).unwrap();

        let db_messages: Vec<String> = db.records().into_iter().map(|r| r.message).collect();
        assert_eq!(db_messages, vec!["q1", "q2"]);
        assert_eq!(db.records()[0].attrs(), &[Attr::new("scope", "db")]);
        assert_eq!(other.records().len(), 1);
        assert_eq!(other.records()[0].message, "plain");
    }

    #[test]
    fn test_panicking_route_becomes_error() {
        let boom: SinkRef = Arc::new(InlineSink::new(
            "boom",
            |_, _, _| true,
            |_, _, _| panic!("route exploded"),
        ));
        let sink = FirstMatch::new(vec![RoutableSink::new(boom, vec![])]);

        let err = sink
            .handle(&Context::background(), Record::now(Level::Info, "x"))
            .unwrap_err();

        assert!(matches!(
            err,
            SinkError::Panic { ref sink_name, ref message }
                if sink_name == "boom" && message == "route exploded"
        ));
    }

    #[test]
    fn test_no_match_is_ok_and_empty_group_is_identity() {
        let memory = MemorySink::new("errors");
        let sink: SinkRef = Arc::new(FirstMatch::new(vec![RoutableSink::new(
            Arc::new(memory.clone()),
            vec![attr_value_is([("kind", "error")])],
        )]));

        sink.handle(&Context::background(), Record::now(Level::Info, "x"))
            .unwrap();
        assert!(memory.is_empty());
        assert!(Arc::ptr_eq(&sink, &sink.clone().with_group("")));
    }
}
