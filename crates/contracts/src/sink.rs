//! Sink trait - the capability contract shared by leaf and composite sinks

use std::sync::Arc;

use crate::{Attr, Context, Level, Record, SinkError};

/// Shared, immutable handle to any sink
pub type SinkRef = Arc<dyn Sink>;

/// Structured-log destination.
///
/// Leaf destinations and every composite in this workspace implement this
/// trait, so they nest arbitrarily.
///
/// `with_attrs` and `with_group` are persistent: they return a new sink and
/// never mutate the receiver, which is commonly shared by several derived
/// loggers at once. `with_group("")` must return the receiver itself.
pub trait Sink: Send + Sync {
    /// Sink name (used for logging/errors)
    fn name(&self) -> &str;

    /// Cheap severity check, asked before `handle`
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Process one record
    ///
    /// # Errors
    /// Returns the failure of this sink (or an aggregate for composites)
    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError>;

    /// Derive a sink with additional bound attributes
    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef;

    /// Derive a sink whose subsequent attributes nest under `name`
    fn with_group(self: Arc<Self>, name: &str) -> SinkRef;

    /// Children of a fan-out composite, used to flatten nested fan-outs
    fn fanout_members(&self) -> Option<&[SinkRef]> {
        None
    }
}
