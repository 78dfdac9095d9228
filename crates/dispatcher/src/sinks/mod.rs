//! Leaf sink implementations
//!
//! Contains InlineSink, LogSink, and MemorySink.

mod inline;
mod log;
mod memory;

pub use self::inline::InlineSink;
pub use self::log::LogSink;
pub use self::memory::MemorySink;
