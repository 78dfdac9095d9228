//! MemorySink - captures rendered records in memory

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef};

use crate::scope::AttrScope;

/// Sink that keeps every handled record
///
/// Clones and derived sinks share one buffer, so a test can keep a handle
/// to the original and inspect what any derivation received. Stored records
/// carry the effective attribute set (bound attributes first).
#[derive(Debug, Clone)]
pub struct MemorySink {
    name: Arc<str>,
    min_level: Level,
    scope: AttrScope,
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            min_level: Level::Trace,
            scope: AttrScope::new(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drop records below `level`
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn scope(&self) -> &AttrScope {
        &self.scope
    }

    /// Copy of everything captured so far. Records stored before a
    /// writer panicked are still returned.
    pub fn records(&self) -> Vec<Record> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.read().clear();
    }

    fn read(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Record>>, SinkError> {
        self.records
            .lock()
            .map_err(|_| SinkError::write(self.name.as_ref(), "record buffer poisoned"))
    }

    fn derive(&self, scope: AttrScope) -> SinkRef {
        Arc::new(Self {
            name: Arc::clone(&self.name),
            min_level: self.min_level,
            scope,
            records: Arc::clone(&self.records),
        })
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.min_level
    }

    fn handle(&self, _ctx: &Context, record: Record) -> Result<(), SinkError> {
        let mut rendered = record.derive();
        rendered.add_attrs(self.scope.merged_attrs(&record));
        self.lock()?.push(rendered);
        Ok(())
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        self.derive(self.scope.with_attrs(attrs))
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        self.derive(self.scope.with_group(name))
    }
}
