//! Record - one structured log event

use chrono::{DateTime, Utc};
use std::panic::Location;

use crate::{Attr, Level};

/// Structured log record
///
/// Cloning copies the attribute list, so a clone handed to one sink is
/// independent of the clones handed to its siblings.
#[derive(Debug, Clone)]
pub struct Record {
    /// Event time
    pub time: DateTime<Utc>,
    /// Severity
    pub level: Level,
    /// Log message
    pub message: String,
    /// Call site that created the record
    pub location: Option<&'static Location<'static>>,
    attrs: Vec<Attr>,
}

impl Record {
    /// Create a record, capturing the caller's location
    #[track_caller]
    pub fn new(time: DateTime<Utc>, level: Level, message: impl Into<String>) -> Self {
        Self {
            time,
            level,
            message: message.into(),
            location: Some(Location::caller()),
            attrs: Vec::new(),
        }
    }

    /// Create a record stamped with the current time
    #[track_caller]
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Self::new(Utc::now(), level, message)
    }

    /// Fresh record with the same time, level, message and location but no attributes
    pub fn derive(&self) -> Self {
        Self {
            time: self.time,
            level: self.level,
            message: self.message.clone(),
            location: self.location,
            attrs: Vec::new(),
        }
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    /// Builder-style attribute append
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Take ownership of the attribute list
    pub fn into_attrs(self) -> Vec<Attr> {
        self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_independent() {
        let original = Record::now(Level::Info, "hello").with_attr(Attr::new("a", 1i64));
        let mut copy = original.clone();
        copy.add_attrs([Attr::new("b", 2i64)]);

        assert_eq!(original.num_attrs(), 1);
        assert_eq!(copy.num_attrs(), 2);
    }

    #[test]
    fn test_derive_drops_attrs() {
        let record = Record::now(Level::Warn, "x").with_attr(Attr::new("a", true));
        let derived = record.derive();
        assert_eq!(derived.num_attrs(), 0);
        assert_eq!(derived.time, record.time);
        assert_eq!(derived.level, Level::Warn);
        assert_eq!(derived.location, record.location);
    }
}
