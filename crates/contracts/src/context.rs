//! Context - caller-scoped values passed alongside every record

use std::sync::Arc;

use crate::{Attr, Key, Value};

/// Immutable bag of call-scoped values.
///
/// Handed to `Sink::enabled`, `Sink::handle`, predicates and recovery
/// callbacks. Cloning is an `Arc` bump; `with_value` returns a new context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Arc<Vec<Attr>>,
}

impl Context {
    /// Empty context
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying one more value. Later values shadow earlier ones.
    pub fn with_value(&self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        let mut values = Vec::with_capacity(self.values.len() + 1);
        values.extend(self.values.iter().cloned());
        values.push(Attr::new(key, value));
        Self {
            values: Arc::new(values),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values
            .iter()
            .rev()
            .find(|attr| attr.key == key)
            .map(|attr| &attr.value)
    }
}
