//! RoutableSink - one sink guarded by predicates
//!
//! Predicates are evaluated against a record synthesized from the sink's
//! private [`AttrScope`], so attributes bound earlier in the logger chain
//! (`logger.with("scope", "influx")`) are visible to routing even when the
//! triggering call only carries `query`. The wrapped sink always receives the
//! original record.

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};
use tracing::trace;

use crate::predicate::PredicateRef;
use crate::scope::AttrScope;

/// Sink plus routing predicates and accumulated context
#[derive(Clone)]
pub struct RoutableSink {
    sink: SinkRef,
    predicates: Arc<[PredicateRef]>,
    scope: AttrScope,
    skip_match_check: bool,
}

impl RoutableSink {
    pub fn new(sink: SinkRef, predicates: Vec<PredicateRef>) -> Self {
        Self {
            sink,
            predicates: predicates.into(),
            scope: AttrScope::new(),
            skip_match_check: false,
        }
    }

    /// Mark the match as already checked by the caller. `handle` then
    /// delegates unconditionally.
    pub(crate) fn skipping_match_check(mut self) -> Self {
        self.skip_match_check = true;
        self
    }

    pub fn scope(&self) -> &AttrScope {
        &self.scope
    }

    pub fn target(&self) -> &SinkRef {
        &self.sink
    }

    /// All predicates pass on the synthesized view of `record`
    pub fn is_match(&self, ctx: &Context, record: &Record) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        let view = self.scope.synthesize(record);
        self.predicates.iter().all(|p| p.matches(ctx, &view))
    }

    /// Derive with more bound attributes
    pub fn derive_attrs(&self, attrs: Vec<Attr>) -> Self {
        Self {
            sink: self.sink.clone().with_attrs(attrs.clone()),
            predicates: Arc::clone(&self.predicates),
            scope: self.scope.with_attrs(attrs),
            skip_match_check: self.skip_match_check,
        }
    }

    /// Derive with one more open group; an empty name yields a plain copy
    pub fn derive_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        Self {
            sink: self.sink.clone().with_group(name),
            predicates: Arc::clone(&self.predicates),
            scope: self.scope.with_group(name),
            skip_match_check: self.skip_match_check,
        }
    }
}

impl Sink for RoutableSink {
    fn name(&self) -> &str {
        self.sink.name()
    }

    // predicates are not consulted here; `handle` is the authoritative gate
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.sink.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        if self.skip_match_check || self.is_match(ctx, &record) {
            return self.sink.handle(ctx, record);
        }
        trace!(sink = %self.sink.name(), message = %record.message, "Record did not match route");
        Ok(())
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        Arc::new(self.derive_attrs(attrs))
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        Arc::new(self.derive_group(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{attr_value_is, level_is};
    use crate::sinks::MemorySink;

    #[test]
    fn test_bound_context_is_visible_to_predicates() {
        let memory = MemorySink::new("mem");
        let routable = RoutableSink::new(
            Arc::new(memory.clone()),
            vec![attr_value_is([("user.id", "u1")])],
        );

        let derived = routable
            .derive_group("user")
            .derive_attrs(vec![Attr::new("id", "u1")])
            .derive_group("req")
            .derive_attrs(vec![Attr::new("path", "/x")]);

        let record = Record::now(Level::Info, "hit");
        assert!(!routable.is_match(&Context::background(), &record));
        assert!(derived.is_match(&Context::background(), &record));
    }

    #[test]
    fn test_unmatched_record_is_dropped_without_error() {
        let memory = MemorySink::new("mem");
        let routable: SinkRef = Arc::new(RoutableSink::new(
            Arc::new(memory.clone()),
            vec![level_is([Level::Error])],
        ));

        let ctx = Context::background();
        routable.handle(&ctx, Record::now(Level::Info, "skip")).unwrap();
        routable.handle(&ctx, Record::now(Level::Error, "keep")).unwrap();

        let messages: Vec<_> = memory.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["keep"]);
    }

    #[test]
    fn test_leaf_receives_original_record() {
        let memory = MemorySink::new("mem");
        let routable: SinkRef = Arc::new(RoutableSink::new(Arc::new(memory.clone()), vec![]));
        let routable = routable.with_attrs(vec![Attr::new("bound", true)]);

        let record = Record::now(Level::Info, "x").with_attr(Attr::new("own", 1i64));
        routable.handle(&Context::background(), record).unwrap();

        // the leaf renders its own scope; the routable view never leaks in twice
        let stored = memory.records();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].attrs(),
            &[Attr::new("bound", true), Attr::new("own", 1i64)]
        );
    }

    #[test]
    fn test_empty_group_returns_same_instance() {
        let routable: SinkRef = Arc::new(RoutableSink::new(Arc::new(MemorySink::new("m")), vec![]));
        let same = routable.clone().with_group("");
        assert!(Arc::ptr_eq(&routable, &same));
    }
}
