//! Routing predicates
//!
//! A predicate is a pure test over the *synthesized* record a routable sink
//! builds (bound attributes included). Builders return small immutable
//! structs behind `PredicateRef`.
//!
//! ```ignore
//! let sink = Router::new()
//!     .add(console, vec![level_is([Level::Info])])
//!     .add(database, vec![attr_kind_is([("query", ValueKind::String)])])
//!     .build();
//! ```

use std::sync::Arc;

use contracts::{Context, Key, Level, Record, Value, ValueKind};

use crate::scope::walk_attrs;

/// Boolean test over a record
pub trait Predicate: Send + Sync {
    fn matches(&self, ctx: &Context, record: &Record) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Context, &Record) -> bool + Send + Sync,
{
    fn matches(&self, ctx: &Context, record: &Record) -> bool {
        self(ctx, record)
    }
}

/// Shared predicate handle
pub type PredicateRef = Arc<dyn Predicate>;

/// Level is one of a set
#[derive(Debug, Clone)]
pub struct LevelIs {
    levels: Vec<Level>,
    negate: bool,
}

impl Predicate for LevelIs {
    fn matches(&self, _ctx: &Context, record: &Record) -> bool {
        self.levels.contains(&record.level) != self.negate
    }
}

#[derive(Debug, Clone)]
enum MessageTest {
    Equals(String),
    Contains(String),
}

/// Message equality or substring test
#[derive(Debug, Clone)]
pub struct MessageMatch {
    test: MessageTest,
    negate: bool,
}

impl Predicate for MessageMatch {
    fn matches(&self, _ctx: &Context, record: &Record) -> bool {
        let hit = match &self.test {
            MessageTest::Equals(msg) => record.message == *msg,
            MessageTest::Contains(part) => record.message.contains(part.as_str()),
        };
        hit != self.negate
    }
}

/// Every `(key, value)` pair is present among the flattened attributes
#[derive(Debug, Clone)]
pub struct AttrValueIs {
    pairs: Vec<(Key, Value)>,
}

impl Predicate for AttrValueIs {
    fn matches(&self, _ctx: &Context, record: &Record) -> bool {
        all_pairs_found(record, &self.pairs, |expected, actual| expected == actual)
    }
}

/// Every `(key, kind)` pair is present among the flattened attributes
#[derive(Debug, Clone)]
pub struct AttrKindIs {
    pairs: Vec<(Key, ValueKind)>,
}

impl Predicate for AttrKindIs {
    fn matches(&self, _ctx: &Context, record: &Record) -> bool {
        all_pairs_found(record, &self.pairs, |expected, actual| {
            *expected == actual.kind()
        })
    }
}

fn all_pairs_found<T>(
    record: &Record,
    pairs: &[(Key, T)],
    eq: impl Fn(&T, &Value) -> bool,
) -> bool {
    if pairs.is_empty() {
        return true;
    }

    let mut found = vec![false; pairs.len()];
    let mut remaining = pairs.len();

    // walk stops as soon as the visitor returns false
    walk_attrs(record.attrs(), &mut |path, value| {
        for (i, (key, expected)) in pairs.iter().enumerate() {
            if !found[i] && key.as_str() == path && eq(expected, value) {
                found[i] = true;
                remaining -= 1;
            }
        }
        remaining > 0
    });

    remaining == 0
}

/// Record level is one of `levels`
pub fn level_is(levels: impl IntoIterator<Item = Level>) -> PredicateRef {
    Arc::new(LevelIs {
        levels: levels.into_iter().collect(),
        negate: false,
    })
}

/// Record level is none of `levels`
pub fn level_is_not(levels: impl IntoIterator<Item = Level>) -> PredicateRef {
    Arc::new(LevelIs {
        levels: levels.into_iter().collect(),
        negate: true,
    })
}

pub fn message_is(message: impl Into<String>) -> PredicateRef {
    Arc::new(MessageMatch {
        test: MessageTest::Equals(message.into()),
        negate: false,
    })
}

pub fn message_is_not(message: impl Into<String>) -> PredicateRef {
    Arc::new(MessageMatch {
        test: MessageTest::Equals(message.into()),
        negate: true,
    })
}

pub fn message_contains(part: impl Into<String>) -> PredicateRef {
    Arc::new(MessageMatch {
        test: MessageTest::Contains(part.into()),
        negate: false,
    })
}

pub fn message_not_contains(part: impl Into<String>) -> PredicateRef {
    Arc::new(MessageMatch {
        test: MessageTest::Contains(part.into()),
        negate: true,
    })
}

/// Attributes at the given dotted paths carry the given values
pub fn attr_value_is<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PredicateRef
where
    K: Into<Key>,
    V: Into<Value>,
{
    Arc::new(AttrValueIs {
        pairs: pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    })
}

/// Attributes at the given dotted paths are of the given kinds
pub fn attr_kind_is<K>(pairs: impl IntoIterator<Item = (K, ValueKind)>) -> PredicateRef
where
    K: Into<Key>,
{
    Arc::new(AttrKindIs {
        pairs: pairs.into_iter().map(|(k, kind)| (k.into(), kind)).collect(),
    })
}

/// Custom predicate from a closure
pub fn from_fn<F>(f: F) -> PredicateRef
where
    F: Fn(&Context, &Record) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}
