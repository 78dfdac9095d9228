//! Logger - caller-facing front end over a sink tree
//!
//! ```ignore
//! let logger = Logger::new(root)
//!     .with(vec![Attr::new("service", "api")])
//!     .with_group("req");
//! logger.info("request served", vec![Attr::new("status", 200)])?;
//! ```

use contracts::{Attr, Context, Level, Record, SinkError, SinkRef};

/// Builds records and hands them to a sink
#[derive(Clone)]
pub struct Logger {
    sink: SinkRef,
    ctx: Context,
}

impl Logger {
    pub fn new(sink: SinkRef) -> Self {
        Self {
            sink,
            ctx: Context::background(),
        }
    }

    /// Logger using `ctx` for every call
    pub fn with_context(&self, ctx: Context) -> Self {
        Self {
            sink: self.sink.clone(),
            ctx,
        }
    }

    /// Logger whose records carry `attrs`
    pub fn with(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        Self {
            sink: self.sink.clone().with_attrs(attrs),
            ctx: self.ctx.clone(),
        }
    }

    /// Logger whose further attributes are qualified by `name`
    pub fn with_group(&self, name: &str) -> Self {
        Self {
            sink: self.sink.clone().with_group(name),
            ctx: self.ctx.clone(),
        }
    }

    pub fn sink(&self) -> &SinkRef {
        &self.sink
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(&self.ctx, level)
    }

    /// Emit one record. Disabled levels return `Ok` without building it.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, attrs: Vec<Attr>) -> Result<(), SinkError> {
        if !self.sink.enabled(&self.ctx, level) {
            return Ok(());
        }
        let mut record = Record::now(level, message);
        record.add_attrs(attrs);
        self.sink.handle(&self.ctx, record)
    }

    #[track_caller]
    pub fn trace(&self, message: &str, attrs: Vec<Attr>) -> Result<(), SinkError> {
        self.log(Level::Trace, message, attrs)
    }

    #[track_caller]
    pub fn debug(&self, message: &str, attrs: Vec<Attr>) -> Result<(), SinkError> {
        self.log(Level::Debug, message, attrs)
    }

    #[track_caller]
    pub fn info(&self, message: &str, attrs: Vec<Attr>) -> Result<(), SinkError> {
        self.log(Level::Info, message, attrs)
    }

    #[track_caller]
    pub fn warn(&self, message: &str, attrs: Vec<Attr>) -> Result<(), SinkError> {
        self.log(Level::Warn, message, attrs)
    }

    #[track_caller]
    pub fn error(&self, message: &str, attrs: Vec<Attr>) -> Result<(), SinkError> {
        self.log(Level::Error, message, attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use std::sync::Arc;

    #[test]
    fn test_logger_binds_attrs_and_groups() {
        let memory = MemorySink::new("m").with_min_level(Level::Info);
        let logger = Logger::new(Arc::new(memory.clone()))
            .with(vec![Attr::new("service", "api")])
            .with_group("req");

        logger.debug("skipped", vec![]).unwrap();
        logger
            .info("served", vec![Attr::new("status", 200i64)])
            .unwrap();

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(
            records[0].attrs(),
            &[
                Attr::new("service", "api"),
                Attr::group("req", vec![Attr::new("status", 200i64)]),
            ]
        );
    }

    #[test]
    fn test_record_location_is_the_call_site() {
        let memory = MemorySink::new("m");
        let logger = Logger::new(Arc::new(memory.clone()));
        logger.warn("here", vec![]).unwrap();

        let location = memory.records()[0].location.unwrap();
        assert!(location.file().ends_with("logger.rs"));
    }
}
